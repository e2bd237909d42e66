//! HTTP adapter
//!
//! Thin actix-web layer over [`crate::services::ShortenerEngine`].

pub mod services;

pub use services::{app_routes, generate_routes, redirect_routes};
