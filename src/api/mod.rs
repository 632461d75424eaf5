//! Response envelopes, pagination and request extractors shared by all routes.

pub mod extract;
pub mod pagination;
pub mod response;

pub use extract::{ApiPath, ApiQuery, ValidatedJson};
pub use pagination::{Page, Paginated, PaginationParams};
pub use response::{Created, DataResponse, NoContent};
