//! Domain types shared by the storage layer and the component services.

mod resource;

pub use resource::{Collaborator, Resource, ResourceCreate, ResourceKind};

pub type PersonId = i64;
pub type AccountId = i64;
pub type GroupId = i64;
pub type ResourceId = i64;
pub type CollaboratorId = i64;
pub type OrganizationId = i64;
