//! The seam between [`DataClient`](crate::DataClient) and the network.

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{ApiError, ApiRequest};

/// Executes one API request and returns the decoded JSON body.
///
/// Implementations classify HTTP statuses into [`ApiError`] variants and
/// perform no retries or caching; [`DataClient`](crate::DataClient) layers
/// those on top.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &ApiRequest) -> Result<Value, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        (**self).get(request).await
    }
}
