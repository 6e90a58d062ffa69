//! Integration tests: whole-client flows over a scripted backend and an
//! on-disk store.

mod helpers;

mod content_test;
mod session_flow_test;
mod shared_store_test;
