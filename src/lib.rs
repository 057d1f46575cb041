pub mod bootstrap;
pub mod collaboration;
pub mod commit_authors;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod membership;
pub mod notify;
pub mod search;
pub mod types;
pub mod utils;

pub use bootstrap::Larder;
pub use error::LarderError;
