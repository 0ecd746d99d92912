use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    Set, SqlErr,
};
use subtle::ConstantTimeEq;

use crate::{
    audit,
    dto::auth::{
        CanteenLoginRequest, CanteenLoginResponse, Claims, SignupRequest, StudentLoginRequest,
        StudentLoginResponse,
    },
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    middleware::auth::{ROLE_CANTEEN, ROLE_STUDENT},
    models::Student,
    response::{ApiResponse, Meta},
    state::AppState,
};

const DUPLICATE_STUDENT: &str = "Student ID is already registered";

pub async fn signup(state: &AppState, payload: SignupRequest) -> AppResult<ApiResponse<Student>> {
    let SignupRequest {
        student_id,
        password,
    } = payload;
    let student_id = student_id.trim().to_string();
    if student_id.is_empty() {
        return Err(AppError::bad_request("studentId must not be blank"));
    }
    if password.is_empty() {
        return Err(AppError::bad_request("password must not be empty"));
    }

    let exist = Users::find()
        .filter(UserCol::StudentId.eq(student_id.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::bad_request(DUPLICATE_STUDENT));
    }

    let password_hash = hash_password(&password)?;

    let user = UserActive {
        id: NotSet,
        student_id: Set(student_id),
        password_hash: Set(password_hash),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|err| match err.sql_err() {
        // A concurrent signup won the unique index after our check.
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::bad_request(DUPLICATE_STUDENT),
        _ => AppError::from(err),
    })?;

    tracing::info!(student_id = %user.student_id, "student registered");
    audit::record(
        &state.pool,
        Some(user.student_id.as_str()),
        "student_signup",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success("User created", Student::from(user), None))
}

pub async fn login_student(
    state: &AppState,
    payload: StudentLoginRequest,
) -> AppResult<ApiResponse<StudentLoginResponse>> {
    let StudentLoginRequest {
        student_id,
        password,
    } = payload;
    let user = find_student(&state.orm, student_id.trim()).await?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::bad_request("Incorrect password"));
    }

    let token = issue_token(state, &user.student_id, ROLE_STUDENT)?;

    Ok(ApiResponse::success(
        "Logged in",
        StudentLoginResponse {
            token,
            student: Student::from(user),
        },
        Some(Meta::empty()),
    ))
}

pub async fn login_canteen(
    state: &AppState,
    payload: CanteenLoginRequest,
) -> AppResult<ApiResponse<CanteenLoginResponse>> {
    if !secrets_match(&payload.password, &state.config.canteen_password) {
        tracing::warn!("canteen login rejected");
        return Err(AppError::bad_request("Incorrect password"));
    }

    let token = issue_token(state, ROLE_CANTEEN, ROLE_CANTEEN)?;

    Ok(ApiResponse::success(
        "Logged in",
        CanteenLoginResponse { token },
        Some(Meta::empty()),
    ))
}

/// Resolves a student id to its user row.
pub async fn find_student<C: ConnectionTrait>(conn: &C, student_id: &str) -> AppResult<UserModel> {
    let user = Users::find()
        .filter(UserCol::StudentId.eq(student_id))
        .one(conn)
        .await?;
    match user {
        Some(u) => Ok(u),
        None => Err(AppError::not_found("Student not registered")),
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Constant-time comparison; only the length difference is observable.
pub fn secrets_match(given: &str, expected: &str) -> bool {
    given.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn issue_token(state: &AppState, subject: &str, role: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(state.config.token_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: subject.to_string(),
        role: role.to_string(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    Ok(format!("Bearer {}", token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies_and_is_not_plain_text() {
        let hash = hash_password("samosa-lover").expect("hash");
        assert_ne!(hash, "samosa-lover");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("samosa-lover", &hash).expect("verify"));
        assert!(!verify_password("wrong", &hash).expect("verify"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("pw").expect("hash");
        let b = hash_password("pw").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_internal_error() {
        assert!(matches!(
            verify_password("pw", "plain-text"),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn secret_comparison() {
        assert!(secrets_match("ECECanteen123", "ECECanteen123"));
        assert!(!secrets_match("ECECanteen124", "ECECanteen123"));
        assert!(!secrets_match("ECECanteen", "ECECanteen123"));
        assert!(!secrets_match("", "ECECanteen123"));
    }
}
