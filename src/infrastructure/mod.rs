//! # Infrastructure Layer
//!
//! Adapters to the outside world.
//!
//! - [`persistence`]: the listing store and its file-backed adapters
//! - [`remote`]: the remote origin and its fallback chain

pub mod persistence;
pub mod remote;
