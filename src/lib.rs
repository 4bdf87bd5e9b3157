//! # Stressometer
//!
//! **A local-first stress level journal.**
//!
//! Each entry records a level from 0 to 100, an optional note, and the
//! `#tags`/`@tags` found in that note. Entries live in SQLite under a single
//! implicit user and meter that are created on first use.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐
//! │   CLI    │   │   HTTP   │
//! │ (stress) │   │  (axum)  │
//! └────┬─────┘   └────┬─────┘
//!      └──────┬───────┘
//!             ▼
//!      ┌─────────────┐   ┌──────────────┐
//!      │  StressLog  │──▶│ Store trait  │──▶ SQLite / in-memory
//!      │  (service)  │   │ (core crate) │
//!      └─────────────┘   └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Database schema migrations (idempotent) |
//! | [`sqlite_store`] | SQLite implementation of the core `Store` trait |
//! | [`service`] | `StressLog`: save, history, delete under the default meter |
//! | [`view`] | Terminal rendering: list, recent panel, chart, level colours |
//! | [`log_cmd`] | `stress log` |
//! | [`history`] | `stress history`, `recent`, `tags`, `chart` |
//! | [`delete`] | `stress delete` with confirmation |
//! | [`server`] | JSON HTTP API (Axum) with CORS |
//!
//! Domain logic that needs no runtime (tag extraction, filtering, the
//! default-context resolver) lives in the `stressometer-core` crate.

pub mod config;
pub mod db;
pub mod delete;
pub mod history;
pub mod log_cmd;
pub mod migrate;
pub mod server;
pub mod service;
pub mod sqlite_store;
pub mod view;

pub use service::StressLog;
