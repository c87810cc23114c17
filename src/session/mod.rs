//! Who is signed in, for the lifetime of the process.
//! `SessionController` drives restore/login/register/logout; `SessionContext` is the
//! shared in-memory state it owns and that front ends observe.

mod controller;
mod state;

pub use controller::{SessionController, LOGIN_FAILED, REGISTRATION_FAILED};
pub use state::{Session, SessionContext, SessionPhase, SessionState};
