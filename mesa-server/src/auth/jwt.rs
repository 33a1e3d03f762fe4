//! Access token service
//!
//! HS256 tokens whose `jti` is the server-side session id.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::models::Role;
use thiserror::Error;

const ISSUER: &str = "mesa";

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Restaurant (tenant) ID
    pub rid: i64,
    pub email: String,
    pub role: Role,
    /// Session ID
    pub jti: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: i64,
    /// Issued at (Unix timestamp seconds)
    pub iat: i64,
    pub iss: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// Identity embedded in a new token
pub struct TokenSubject<'a> {
    pub user_id: i64,
    pub restaurant_id: i64,
    pub email: &'a str,
    pub role: Role,
    pub session_id: &'a str,
    /// Expiry in epoch milliseconds (same as the session)
    pub expires_at: i64,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn generate_token(&self, subject: TokenSubject<'_>) -> Result<String, JwtError> {
        let claims = Claims {
            sub: subject.user_id.to_string(),
            rid: subject.restaurant_id,
            email: subject.email.to_string(),
            role: subject.role,
            jti: subject.session_id.to_string(),
            exp: subject.expires_at / 1000,
            iat: Utc::now().timestamp(),
            iss: ISSUER.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["sub", "exp", "iss"]);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Extract token from `Authorization: Bearer <token>`
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// Authenticated caller, inserted into request extensions by the auth middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: i64,
    pub restaurant_id: i64,
    pub email: String,
    pub role: Role,
    pub session_id: String,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = claims
            .sub
            .parse()
            .map_err(|_| JwtError::InvalidToken(format!("Non-numeric subject: {}", claims.sub)))?;
        Ok(Self {
            user_id,
            restaurant_id: claims.rid,
            email: claims.email,
            role: claims.role,
            session_id: claims.jti,
        })
    }
}

impl CurrentUser {
    pub fn has_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
