//! # steamwire-upstream
//!
//! Clients for the two third-party services the bot depends on: the Steam
//! catalog (store search, app list, news feed) and the translation endpoint.
//! Both reach the network through an injected [`transport::HttpTransport`].

pub mod catalog;
pub mod chunk;
pub mod html;
pub mod translation;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
