//! linkcore - URL shortener core
//!
//! Maps long URLs to short tokens and resolves them back, with optional
//! per-entry expiration.
//!
//! # Architecture
//! - `codec`: Base62 token encoding and custom token validation
//! - `storage`: Durable entry table (SeaORM)
//! - `cache`: Best-effort read-through cache backends
//! - `services`: Shortener engine and expiration sweeper
//! - `api`: HTTP adapter (actix-web)
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle
//! - `system`: Logging

pub mod api;
pub mod cache;
pub mod cli;
pub mod codec;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
