//! Store integration tests.
//!
//! The HTTP backends run against in-process axum fakes of the GitHub
//! Contents API and the proxy; the session tests use the memory store.

mod github;
mod proxy;
mod session;
mod support;
