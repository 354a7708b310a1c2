//! Client code for drugbit.
//!
//! This crate provides the remote drug API client, the cached and retrying
//! [`DataClient`] on top of it, and the helpers shared by the server and CLI.

pub mod api;
pub mod cancel;
pub mod data;
pub mod debounce;
pub mod retry;
pub mod sitemap;
pub mod transport;

pub use api::{ApiConfig, ApiError, ApiRequest, DrugApi};
pub use cancel::CancelToken;
pub use data::{DataClient, DataClientConfig, FailureKind, FetchFailure, FetchOutcome, SearchOptions};
pub use debounce::Debouncer;
pub use retry::RetryPolicy;
pub use sitemap::{SitemapBuilder, SitemapEntry};
pub use transport::Transport;
