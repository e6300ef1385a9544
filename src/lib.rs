//! # Car Garage
//!
//! Inventory management for a car dealership: a REST API over a single
//! SQLite table, plus an embedded browser client for staff.
//!
//! ## Core Components
//!
//! - **Garage-Store** (`db`, `schema`): SQLite connection, table setup and sample data
//! - **Query Builder** (`query`): allow-listed sorting, bound search/status filters
//! - **Payloads** (`payload`): create validation and update merge rules
//! - **Car Service** (`service`): list/get/create/update/delete
//! - **Garage API** (`api`): Axum routes and status-code mapping
//! - **Web Client** (`client`): static UI served from the binary

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod payload;
pub mod query;
pub mod schema;
pub mod service;

pub use error::{GarageError, GarageResult};
