//! Service layer for business rules and orchestration.
//!
//! Services sit between the HTTP handlers and the repository contract.
//! They enforce the rules storage does not: uniqueness of email and
//! nickname, the author-only mutation rule, required-field validation,
//! and the ordered cascade when an account is deleted. Every function
//! takes the repository as `&dyn BoardRepository` and receives the caller
//! identity as an explicit parameter; there is no ambient request state.

pub mod accounts;
pub mod comments;
pub mod error;
pub mod posts;

pub use error::{ServiceError, ServiceResult};
pub use posts::PostUpdate;
