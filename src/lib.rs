pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod forms;
pub mod http;
pub mod models;
pub mod session;
pub mod storage;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{ApiClient, ApiResponse, Method, QueryParams};
pub use session::{Session, SessionContext, SessionController, SessionPhase, SessionState};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, TokenStore};
