//! Render backend contract and HTTP client.
//!
//! This crate provides:
//! - The [`RenderBackend`] trait the queue schedules against
//! - Status/progress payloads reported by the backend
//! - [`HttpRenderBackend`], the JSON-over-HTTP implementation

pub mod backend;
pub mod error;
pub mod http;

pub use backend::{RenderBackend, RenderState, RenderStatus};
pub use error::{RenderError, RenderResult};
pub use http::{HttpBackendConfig, HttpRenderBackend};
