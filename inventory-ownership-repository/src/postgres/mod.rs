//! PostgreSQL implementation of the ownership repository.
//!
//! Provides a PostgreSQL backend for the `OwnershipRepository` trait with
//! connection pooling and explicit transactions.
//!
//! ## Database Tables
//!
//! ```sql
//! CREATE TABLE users (
//!     user_id   BIGSERIAL PRIMARY KEY,
//!     user_abbr TEXT      NOT NULL,
//!     comp_id   BIGINT    NOT NULL,
//!     UNIQUE (user_abbr, comp_id)
//! );
//!
//! CREATE TABLE asset_mgmt (
//!     asset_id   BIGSERIAL PRIMARY KEY,
//!     user_cr_id BIGINT    NOT NULL REFERENCES users (user_id),
//!     comp_id    BIGINT    NOT NULL
//! );
//! CREATE INDEX asset_mgmt_comp_id_idx ON asset_mgmt (comp_id);
//! ```
mod ownership_repository;

pub use ownership_repository::{PostgresOwnershipRepository, PostgresOwnershipTransaction};
