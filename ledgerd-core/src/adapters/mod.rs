//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the repository, outbox, and user-directory ports
//!
//! Notifier adapters live with their consumers (the CLI ships a console
//! notifier; tests bring recording fakes).

pub mod duckdb;
