mod larder;

pub use larder::{ApiErrorBody, ApiErrorObject, LarderError};
