//! Type definitions for the asset inventory.

pub mod aggregation;
pub mod asset;
pub mod enums;
pub mod ids;
