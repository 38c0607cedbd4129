#![allow(dead_code)]

//! Integration test common infrastructure.
//!
//! Provides utilities for spawning the registry binary and talking to it
//! over HTTP.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::{Submission, TestClient, id_of};
#[allow(unused_imports)]
pub use server::TestServer;
