//! Waveshop - Subscription shop backend.
//!
//! Sells time-limited subscriptions paid through independent payment
//! providers, and reconciles every confirmed payment into exactly one
//! subscription extension.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
