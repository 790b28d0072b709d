//! Wholesale Signup API Library
//!
//! Accepts the storefront's wholesale signup form and creates a tagged
//! customer for it through the Shopify Admin API.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Form, Shopify payload and response models.
//! - `note`: Review note attached to the customer.
//! - `routes`: Router and middleware.
//! - `shopify_client`: Shopify Admin API client.

pub mod api;
pub mod core;

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod note;
pub mod routes;
pub mod shopify_client;
