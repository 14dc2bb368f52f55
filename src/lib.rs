//! Admin dashboard for the Lumina storefront: per-screen resource
//! descriptors, a screen state machine, realtime event fan-out and an
//! optional mock backend.

pub mod config;
pub mod controller;
pub mod descriptor;
pub mod errors;
pub mod format;
pub mod logging;
pub mod metrics;
pub mod realtime;
pub mod router;
pub mod screen;
pub mod screens;
pub mod services;
pub mod session;
pub mod shell;
pub mod status;

#[cfg(feature = "server")]
pub mod auth;
#[cfg(feature = "server")]
pub mod server;
