//! Wire types exchanged with the backend.
//! Alumni and event payloads are backend-defined and passed through as JSON; only the
//! auth exchange and the write payloads this client builds itself are typed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type AlumniRecord = Value;
pub type EventRecord = Value;
pub type BatchYear = Value;

/// Alumni keyed by graduation-year label, as served by `/alumni/grouped`.
pub type GroupedAlumni = BTreeMap<String, Vec<AlumniRecord>>;

/// Snapshot of the signed-in user. Unknown backend fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Best label for display: username, then email, then id.
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.email.clone())
            .or_else(|| self.id.as_ref().map(|v| match v { Value::String(s) => s.clone(), other => other.to_string() }))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Body of a successful `/auth/login` or `/auth/register`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    #[serde(default)]
    pub data: UserRecord,
}

/// `/auth/login` request. `login` accepts a username or an email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// `/auth/register` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Who an event is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Audience {
    #[default]
    Alumnae,
    Batch(String),
    Group(String),
}

impl Audience {
    pub fn kind(&self) -> &'static str {
        match self {
            Audience::Alumnae => "alumnae",
            Audience::Batch(_) => "batch",
            Audience::Group(_) => "group",
        }
    }

    pub fn label(&self) -> String {
        match self {
            Audience::Alumnae => "All Alumni".to_string(),
            Audience::Batch(year) => format!("Batch {}", year),
            Audience::Group(name) if !name.trim().is_empty() => name.clone(),
            Audience::Group(_) => "Group Event".to_string(),
        }
    }
}

/// `/events` create payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:mm`
    pub time: String,
    pub location: String,
    pub organizer_name: String,
    pub organizer_email: String,
    pub audience: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}

/// Single-field edit of an alumni profile, sent as `{ field: value }`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlumniUpdate {
    pub field: String,
    pub value: Value,
}

impl AlumniUpdate {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { field: field.into(), value: value.into() }
    }

    pub fn to_body(&self) -> Value {
        let mut m = Map::new();
        m.insert(self.field.clone(), self.value.clone());
        Value::Object(m)
    }
}
