//! Activity request repository.
//!
//! Handles submission, listing by status, review and deletion.

pub mod models;
pub mod queries;

pub use models::{ActivityRequest, NewActivityRequest, RequestStatus};
pub use queries::RequestRepository;
