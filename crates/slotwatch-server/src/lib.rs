//! Slotwatch Server - HTTP surface over the snapshot engine
//!
//! Routes:
//! - `/api/capture`: take today's snapshot (bearer-protected when a secret is set)
//! - `/api/history`: one snapshot by date, or a range of summaries
//! - `/api/compare`: period-over-period comparison
//! - `/api/data`: live data through a short-lived cache
//! - `/healthz`

pub mod config;
pub mod http;
pub mod state;

pub use config::ServerConfig;
pub use http::build_router;
pub use state::{AppState, LiveData};
