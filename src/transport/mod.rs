// src/transport/mod.rs

use crate::errors::Result;
use crate::models::{ExecuteResponse, ExecutionRequest};

pub mod http;

pub use http::HttpTransport;

/// Carries one execution request to the template service.
///
/// Implementations report non-2xx answers as `TesterError::ApiError` so the
/// controller can inspect the failure body. The controller enforces no
/// timeout of its own; whatever the transport signals is final.
pub trait ExecuteTransport: Send + Sync {
    /// Sends `request` and returns the decoded success body.
    fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> impl std::future::Future<Output = Result<ExecuteResponse>> + Send;
}
