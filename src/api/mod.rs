//! Typed wrappers over the backend REST surface.
//! Each wrapper is a single `ApiClient::send` call; the session controller owns the
//! stateful side of the auth routes.

mod alumni;
mod auth;
mod events;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const ME_PATH: &str = "/auth/me";
pub const ALUMNI_PATH: &str = "/alumni";
pub const ALUMNI_GROUPED_PATH: &str = "/alumni/grouped";
pub const EVENTS_PATH: &str = "/events";
pub const BATCH_YEARS_PATH: &str = "/batch-years";

fn to_body<T: Serialize>(payload: &T) -> ClientResult<Value> {
    serde_json::to_value(payload).map_err(|e| ClientError::Decode(format!("failed to encode request body: {}", e)))
}

/// Percent-encode one path segment so ids cannot escape their route.
fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
