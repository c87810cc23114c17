//! Authenticated HTTP plumbing shared by every endpoint wrapper.

mod client;

pub use client::{ApiClient, ApiResponse, QueryParams};
pub use reqwest::Method;
