//! Core types for Warung.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod role;
pub mod username;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError, Stock, StockError};
pub use role::{Role, UnknownRole};
pub use username::{Username, UsernameError};
