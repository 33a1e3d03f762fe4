//! Authentication and authorization
//!
//! - [`jwt`] - access tokens and [`CurrentUser`]
//! - [`middleware`] - `require_auth` / `require_role`
//! - [`rate_limit`] - per-IP throttling of login, OTP and sign-up routes
//! - [`otp`] - one-time code delivery
//! - [`password`] - argon2 hashing

mod extractor;
pub mod jwt;
pub mod middleware;
pub mod otp;
pub mod password;
pub mod rate_limit;

pub use jwt::{Claims, CurrentUser, JwtError, JwtService, TokenSubject};
pub use middleware::{require_auth, require_role};
