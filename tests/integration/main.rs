//! Integration tests for the full HTTP surface.
//!
//! `fake_source` drives the router with a scripted price feed and a manual
//! clock; `upstream` points the real Gold-API client at a local server.

mod api;
mod upstream;
