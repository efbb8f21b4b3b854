pub mod error;
pub mod patients;
pub mod providers;

pub use error::ApiError;
