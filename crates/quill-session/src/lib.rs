//! # quill-session
//!
//! The session lifecycle manager for the Quill blog client.
//!
//! ## Modules
//!
//! - `session` — [`SessionManager`] (initialize, login, logout, extend,
//!   cache re-sync), the observable [`SessionSnapshot`], the periodic
//!   extension timer, and the local identity cache

pub mod session;

pub use session::{SessionCache, SessionManager, SessionPhase, SessionSnapshot};
