//! Custom cocktail recipes: member-authored variants of catalog cocktails.
//!
//! The crate follows a ports and adapters layout. [`commands::DomainLogic`] implements one
//! [`tower::Service`] per operation on top of the [`ports`], and [`adapters`] provides in-memory
//! implementations of every port.

pub mod adapters;
pub mod commands;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
