//! REST API access

mod client;

pub use client::*;
