//! Request execution layers.
//!
//! [`ReqwestTransport`] talks to the network; [`SessionTransport`] sits in
//! front of any [`HttpTransport`](quill_core::traits::HttpTransport) and
//! applies the credential refresh policy.

pub mod cookies;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod session;

pub use cookies::PersistentCookies;
pub use http::ReqwestTransport;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockReply, MockTransport};
pub use session::{RequestPolicy, SessionTransport};
