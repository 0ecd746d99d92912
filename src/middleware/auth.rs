use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{dto::auth::Claims, error::AppError, state::AppState};

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_CANTEEN: &str = "canteen";

/// Caller identity decoded from a bearer token. For students `subject` is the
/// student id; the canteen counter shares a single subject.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub subject: String,
    pub role: String,
}

impl AuthUser {
    pub fn student(student_id: impl Into<String>) -> Self {
        Self {
            subject: student_id.into(),
            role: ROLE_STUDENT.into(),
        }
    }

    pub fn canteen() -> Self {
        Self {
            subject: ROLE_CANTEEN.into(),
            role: ROLE_CANTEEN.into(),
        }
    }
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_canteen(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, ROLE_CANTEEN)
}

/// Students may only act on their own orders and reviews.
pub fn ensure_student(user: &AuthUser, student_id: &str) -> Result<(), AppError> {
    ensure_role(user, ROLE_STUDENT)?;
    if user.subject != student_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::bad_request("Invalid or expired token"))?;

    Ok(AuthUser {
        subject: decoded.claims.sub,
        role: decoded.claims.role,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::bad_request("Missing Authorization header"))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::bad_request("Invalid Authorization header"))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::bad_request("Invalid Authorization scheme"))?
            .trim();

        decode_token(token, &state.config.jwt_secret)
    }
}
