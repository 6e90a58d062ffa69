//! Client-side session lifecycle.

pub(crate) mod extension;
pub mod manager;
pub mod state;
pub mod store;

pub use manager::SessionManager;
pub use state::{SessionPhase, SessionSnapshot};
pub use store::SessionCache;
