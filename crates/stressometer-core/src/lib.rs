//! # Stressometer Core
//!
//! Runtime-free logic for Stressometer: data models, tag extraction,
//! history filtering, the store abstraction, and default-context resolution.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or other
//! native-only dependencies. Storage backends live behind the
//! [`store::Store`] trait; an in-memory implementation ships here for tests.

pub mod context;
pub mod filter;
pub mod models;
pub mod store;
pub mod tags;
