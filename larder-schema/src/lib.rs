pub mod collaborator;
pub mod identity;
pub mod notification;
pub mod resource;

pub use collaborator::{CandidateQuery, CollaboratorRequest};
pub use identity::ExternalIdentity;
pub use notification::CollaboratorAssigned;
pub use resource::ResourceRef;
