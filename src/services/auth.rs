//! Authentication service: password hashing, JWT, login, and account management.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::user::{CreateUser, User, UserRole};

/// Maximum failed login attempts before account lockout.
const MAX_FAILED_ATTEMPTS: i32 = 3;

/// Lockout duration in minutes after exceeding max failed attempts.
const LOCKOUT_DURATION_MINUTES: i64 = 30;

/// JWT claims embedded in access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub user_id: String,
    pub role: String,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token pair returned on successful login.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Hash a plaintext password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn claims_for(user: &User, token_type: &str, expiry_secs: i64) -> Claims {
    let now = Utc::now();
    Claims {
        sub: user.email.clone(),
        user_id: user.id.to_string(),
        role: user.role.as_str().to_string(),
        token_type: token_type.to_string(),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    }
}

/// Generate a JWT token pair (access + refresh).
pub fn generate_tokens(
    user: &User,
    jwt_secret: &str,
    access_expiry_secs: i64,
    refresh_expiry_secs: i64,
) -> Result<TokenPair, AppError> {
    let encoding_key = EncodingKey::from_secret(jwt_secret.as_bytes());

    let encode = |claims: &Claims| {
        jsonwebtoken::encode(&Header::default(), claims, &encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))
    };

    Ok(TokenPair {
        access_token: encode(&claims_for(user, "access", access_expiry_secs))?,
        refresh_token: encode(&claims_for(user, "refresh", refresh_expiry_secs))?,
        token_type: "Bearer".to_string(),
        expires_in: access_expiry_secs,
    })
}

/// Validate a JWT and return the claims.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    jsonwebtoken::decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
}

fn map_unique_violation(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Email already exists".to_string())
        }
        _ => AppError::Database(e),
    }
}

/// Insert a user row inside an existing transaction.
///
/// Profile rows (doctor, staff, patient) share the user's id, so callers
/// create both in the same transaction.
pub async fn insert_user(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    name: &str,
    password: &str,
    role: UserRole,
) -> Result<User, AppError> {
    let password_hash = hash_password(password)?;

    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, name, password_hash, role)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(email.trim().to_lowercase())
    .bind(name)
    .bind(&password_hash)
    .bind(role)
    .fetch_one(&mut **tx)
    .await
    .map_err(map_unique_violation)
}

/// Create a standalone user account.
pub async fn create_user(pool: &PgPool, input: &CreateUser) -> Result<User, AppError> {
    let mut tx = pool.begin().await?;
    let user = insert_user(&mut tx, &input.email, &input.name, &input.password, input.role).await?;
    tx.commit().await?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User created");
    Ok(user)
}

/// Authenticate a user by email and password, returning a token pair.
pub async fn login(
    pool: &PgPool,
    config: &AppConfig,
    email: &str,
    password: &str,
) -> Result<TokenPair, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if user.locked_until.is_some_and(|until| until > Utc::now()) {
        tracing::warn!(user_id = %user.id, "Login attempt on locked account");
        return Err(AppError::Unauthorized);
    }

    if !user.is_active {
        return Err(AppError::Unauthorized);
    }

    if !verify_password(password, &user.password_hash)? {
        let new_attempts = user.failed_login_attempts + 1;
        let lock_until = (new_attempts >= MAX_FAILED_ATTEMPTS)
            .then(|| Utc::now() + Duration::minutes(LOCKOUT_DURATION_MINUTES));

        sqlx::query(
            "UPDATE users SET failed_login_attempts = $1, locked_until = COALESCE($2, locked_until) WHERE id = $3",
        )
        .bind(new_attempts)
        .bind(lock_until)
        .bind(user.id)
        .execute(pool)
        .await?;

        if lock_until.is_some() {
            tracing::warn!(user_id = %user.id, "Account locked after failed logins");
        }
        return Err(AppError::Unauthorized);
    }

    sqlx::query(
        "UPDATE users SET failed_login_attempts = 0, locked_until = NULL, last_login = NOW() WHERE id = $1",
    )
    .bind(user.id)
    .execute(pool)
    .await?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User logged in");

    generate_tokens(
        &user,
        &config.jwt_secret,
        config.jwt_access_token_expiry_secs,
        config.jwt_refresh_token_expiry_secs,
    )
}

/// Issue a new token pair from a valid refresh token.
pub async fn refresh_token(
    pool: &PgPool,
    config: &AppConfig,
    refresh_token_str: &str,
) -> Result<TokenPair, AppError> {
    let claims = validate_token(refresh_token_str, &config.jwt_secret)?;

    if claims.token_type != "refresh" {
        return Err(AppError::Unauthorized);
    }

    let user_id: Uuid = claims
        .user_id
        .parse()
        .map_err(|_| AppError::Unauthorized)?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND is_active = true")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::Unauthorized)?;

    generate_tokens(
        &user,
        &config.jwt_secret,
        config.jwt_access_token_expiry_secs,
        config.jwt_refresh_token_expiry_secs,
    )
}

/// Find a user by ID.
pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Random `#rrggbb` color used to tint avatars in the UI.
pub fn generate_color_code() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    format!("#{}", hex::encode(&bytes[..3]))
}
