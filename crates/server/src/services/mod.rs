//! Business logic services.

pub mod auth;
pub mod images;
pub mod token;

pub use auth::{AuthError, AuthService, ProfileUpdate};
pub use images::{ImageError, ImageStore};
pub use token::{Claims, TokenError, TokenService};
