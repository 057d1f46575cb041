pub mod policy;

mod manager;

pub use manager::CollaborationManager;
