//! # steamwire-channels
//!
//! Chat platform integrations for Steamwire.

pub mod telegram;
mod utils;
