//! # Application Layer
//!
//! Use cases that combine the domain with the store and the remote origin.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
