//! Request authorization for the clinic scheduling API.
//!
//! Bearer tokens are verified against one process-wide secret and turned into
//! an allow/deny decision by route guards composed at registration time:
//! anonymous → authenticated → doctor tier → admin tier.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
