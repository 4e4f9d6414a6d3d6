//! Core types for Maoyang.
//!
//! Type-safe wrappers for IDs, prices, statuses and emails.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use status::OrderStatus;
