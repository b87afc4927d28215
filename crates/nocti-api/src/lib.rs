//! REST client for the NoctiVision validation service.
//!
//! Covers the public result surface (bulk pulls, export, upload), the
//! authenticated admin/stats surface (`X-Admin-Token` header), and the
//! assistant query service. All requests carry a fixed 10-second timeout;
//! non-2xx responses become typed failures.

pub mod assistant;
pub mod client;
pub mod error;
pub mod query;
pub mod token;

pub use assistant::AssistantClient;
pub use client::{ApiClient, ControlAction, ExportFormat, DEFAULT_TIMEOUT};
pub use error::{ApiError, ApiResult};
pub use query::QueryParams;
pub use token::AdminToken;
