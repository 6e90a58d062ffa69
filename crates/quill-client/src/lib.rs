//! # quill-client
//!
//! HTTP plumbing and REST clients for the blog backend services.
//!
//! ## Modules
//!
//! - `transport` — reqwest transport with a shared cookie jar, and the
//!   session transport that performs the one-shot credential refresh
//! - `api` — thin clients for the auth, user, post, comment, taxonomy,
//!   search and chat services
//! - `dto` — request and response bodies
//! - `services` — wiring of every client over one transport

pub mod api;
pub mod dto;
pub mod services;
pub mod transport;

pub use services::ServiceClients;
pub use transport::{PersistentCookies, RequestPolicy, ReqwestTransport, SessionTransport};
