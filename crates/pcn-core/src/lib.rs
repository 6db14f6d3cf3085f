//! PCN Core
//!
//! Shared value types for the payment-channel network:
//! - [`UserId`] and [`Amount`] primitives
//! - [`ChannelKey`], the canonical unordered user pair that identifies a channel
//! - [`Path`] and [`Hop`], validated routes for multi-hop transfers
//! - [`PcnConfig`], the TOML configuration shared by the node and the CLI

pub mod config;
pub mod error;
pub mod path;
pub mod types;

pub use config::{DriverConfig, EngineConfig, LoggingConfig, PcnConfig};
pub use error::CoreError;
pub use path::{Hop, Path};
pub use types::{Amount, ChannelKey, UserId};
