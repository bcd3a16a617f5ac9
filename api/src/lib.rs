//! HTTP surface of the Monthly Coffee token service
//!
//! Exposes the reissue, logout and current-member endpoints on top of
//! `mc_core`, with JWT middleware and CORS configuration.

pub mod app;
pub mod config;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
