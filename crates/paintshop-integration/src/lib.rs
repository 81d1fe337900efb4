//! Paintshop Integration - model-storage server API client
//!
//! Session authentication, model record CRUD, and the payload shapes the
//! paint engine persists through. The server tracks users with a session
//! cookie and stores one record per painted model.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod types;

pub use client::{IntegrationClient, PendingRequest};
pub use config::ServerConfig;
pub use error::IntegrationError;
pub use types::*;
