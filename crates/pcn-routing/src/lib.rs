//! PCN Routing: path discovery for the transfer driver.
//!
//! This crate provides:
//! - [`ChannelGraph`]: the read-only view of the network a path search needs.
//! - [`PathFinder`]: breadth-first shortest paths with deterministic tie-breaking.
//!
//! Settlement never calls into this crate; it only consumes the paths found here.

pub mod error;
pub mod graph;
pub mod pathfinder;

pub use error::RoutingError;
pub use graph::ChannelGraph;
pub use pathfinder::{PathFinder, PathFinderConfig};
