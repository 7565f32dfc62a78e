//! Postplan - post lifecycle and scheduling engine
//!
//! This library is the core behind a social-media scheduling product: the
//! draft/scheduled/published/failed state machine, the validation gating
//! each transition, the per-owner post store, and the deterministic
//! calendar projection used by month views.

pub mod calendar;
pub mod clock;
pub mod config;
pub mod connections;
pub mod db;
pub mod error;
pub mod logging;
pub mod platform;
pub mod scheduling;
pub mod service;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use connections::{ConnectionGate, ConnectionsProvider, StaticConnections};
pub use db::Database;
pub use error::{PostplanError, Result, ValidationError};
pub use platform::{PlatformRegistry, PlatformSpec};
pub use service::PostplanService;
pub use types::{Connection, Post, PostStatus};
