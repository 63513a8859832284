//! # steamwire-core
//!
//! Core types, traits, configuration, rate limiting, and error handling
//! shared by the Steamwire bot.

pub mod config;
pub mod error;
pub mod language;
pub mod message;
pub mod news;
pub mod ratelimit;
pub mod traits;
