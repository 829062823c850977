//! # waymark-test
//!
//! Testing utilities for waymark routers: an in-process test client and a
//! live server bound to a random port.
//!
//! ## Modules
//!
//! - [`client`] - `TestClient` and `TestResponse`
//! - [`live_server`] - `LiveServer`

pub mod client;
pub mod live_server;

pub use client::{TestClient, TestResponse};
pub use live_server::LiveServer;
