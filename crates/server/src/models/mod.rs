//! Domain types for the server.
//!
//! These are validated domain objects; raw database rows live next to the
//! repositories and are converted via `TryFrom`.

pub mod cart;
pub mod product;
pub mod user;

pub use cart::CartLine;
pub use product::Product;
pub use user::User;
