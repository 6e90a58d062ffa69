//! Events exchanged between the transport, the session manager and
//! the application.
//!
//! Both kinds travel over `tokio::sync::broadcast` channels; a lagging
//! or absent receiver never blocks the publisher.

pub mod session;
pub mod transport;

pub use session::{EndReason, SessionEvent};
pub use transport::TransportEvent;
