//! HTTP and WebSocket route handlers

pub mod scenarios;
pub mod status;
pub mod ws;
