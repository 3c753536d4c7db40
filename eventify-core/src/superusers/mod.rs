//! Super user business rules layered over the repository port.

pub mod service;
pub mod validation;

pub use service::{ServiceResult, SuperUserService, SuperUserServiceError};
pub use validation::ValidationError;
