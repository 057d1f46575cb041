//! Database module: models, schema and the actor that owns the pool.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `create.rs`: insert/mutation payloads accepted by the actor
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `identity.rs`, `membership.rs`, `ledger.rs`, `commit_authors.rs`,
//!   `collaboration.rs`: per-component SQL, executed by the actor

pub mod actor;
pub mod create;
pub mod models;
pub mod schema;

mod collaboration;
mod commit_authors;
mod identity;
mod ledger;
mod membership;

pub use actor::{DbActorHandle, spawn};
pub use create::{
    CollaboratorAction, CollaboratorBatch, ContributorCreate, CorporateSignatureCreate,
    IndividualSignatureCreate, PersonCreate,
};
pub use ledger::AgreementStatus;
pub use models::{
    DbAccount, DbCommitAuthor, DbContributor, DbCorporateSignature, DbGroup,
    DbIndividualSignature, DbOrganization, DbPerson,
};
pub use schema::SQLITE_INIT;
