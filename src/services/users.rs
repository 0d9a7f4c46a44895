use chrono::{Duration, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::DbConn;
use crate::{
    config::{SessionConfig, VerificationConfig},
    error::{Error, Result},
    models::users::{
        ChangePassword, LoginResult, LoginUser, NewUser, RegisterUser, ResendVerification, UpdateProfile,
        User, UserProfile, UserSummary, VerifyEmail,
    },
    queries::users,
    services::{email::Mailer, sessions},
    validation::{normalize_email, validate_email, validate_name, validate_password, validate_username},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Generates a six digit email verification code.
pub fn generate_verification_code() -> String {
    rand::rng().random_range(100_000..=999_999).to_string()
}

/// Registers a new, unverified user and mails the verification code
pub async fn register_user(
    conn: &mut DbConn,
    mailer: &dyn Mailer,
    config: &VerificationConfig,
    register_user: RegisterUser,
) -> Result<User> {
    let name = register_user.name.trim().to_string();
    let username = register_user.username.trim().to_string();
    let email = normalize_email(&register_user.email);

    if name.is_empty() || username.is_empty() || email.is_empty() || register_user.password.is_empty() {
        return Err(Error::validation(
            "form",
            "All fields (name, username, email, password) are required",
        ));
    }

    validate_name(&name)?;
    validate_username(&username)?;
    validate_email(&email)?;
    validate_password(&register_user.password, "password")?;

    if users::get_user_by_email(conn, &email).await?.is_some() {
        return Err(Error::Conflict("Email already registered".to_string()));
    }
    if users::get_user_by_username(conn, &username).await?.is_some() {
        return Err(Error::Conflict("Username already taken".to_string()));
    }

    let password_hash = hash_password(&register_user.password)?;
    let code = generate_verification_code();

    let new_user = NewUser {
        name,
        username,
        email,
        password_hash,
        verification_code: code.clone(),
        verification_code_expires_at: Utc::now() + Duration::minutes(config.code_ttl_minutes),
    };

    let user = users::create_user(conn, new_user).await?;
    mailer.send_verification_code(&user.email, &code).await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(user)
}

/// Marks the account verified when the code matches and is still valid
pub async fn verify_email(conn: &mut DbConn, request: VerifyEmail) -> Result<()> {
    let email = normalize_email(&request.email);
    let code = request.code.trim();

    if email.is_empty() || code.is_empty() {
        return Err(Error::validation("form", "Email and verification code are required"));
    }

    if !users::verify_user(conn, &email, code).await? {
        return Err(Error::validation("code", "Invalid or expired verification code"));
    }

    Ok(())
}

/// Issues a fresh code to an account that is still unverified
pub async fn resend_verification(
    conn: &mut DbConn,
    mailer: &dyn Mailer,
    config: &VerificationConfig,
    request: ResendVerification,
) -> Result<()> {
    let email = normalize_email(&request.email);
    if email.is_empty() {
        return Err(Error::validation("email", "Email is required"));
    }

    let user = users::get_user_by_email(conn, &email)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    if user.is_verified {
        return Err(Error::validation("email", "User already verified"));
    }

    let code = generate_verification_code();
    let expires_at = Utc::now() + Duration::minutes(config.code_ttl_minutes);
    users::update_verification_code(conn, user.id, &code, expires_at).await?;
    mailer.send_verification_code(&user.email, &code).await?;

    Ok(())
}

/// Checks credentials and opens a session
pub async fn login_user(conn: &mut DbConn, config: &SessionConfig, login_user: LoginUser) -> Result<LoginResult> {
    let email = normalize_email(&login_user.email);
    if email.is_empty() || login_user.password.is_empty() {
        return Err(Error::validation("form", "Email and password are required"));
    }

    let invalid = || Error::Authentication("Invalid email or password".to_string());

    let user = users::get_user_by_email(conn, &email).await?.ok_or_else(invalid)?;

    if !verify_password(&login_user.password, &user.password_hash)? {
        return Err(invalid());
    }

    if !user.is_verified {
        return Err(Error::Forbidden(
            "Please verify your email address before logging in".to_string(),
        ));
    }

    let (session_token, session) = sessions::start_session(conn, user.id, config).await?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(LoginResult {
        user: UserSummary::from(&user),
        session_token,
        expires_at: session.expires_at,
    })
}

/// Ends the session for the presented token, if there is one
pub async fn logout_user(conn: &mut DbConn, session_token: Option<&str>) -> Result<()> {
    if let Some(token) = session_token {
        sessions::revoke_session_by_token(conn, token).await?;
    }
    Ok(())
}

pub async fn get_profile(conn: &mut DbConn, user_id: Uuid) -> Result<UserProfile> {
    let user = users::get_user_by_id(conn, user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    Ok(UserProfile::from(&user))
}

pub async fn update_profile(conn: &mut DbConn, user_id: Uuid, request: UpdateProfile) -> Result<UserProfile> {
    let name = request.name.trim().to_string();
    let email = normalize_email(&request.email);

    if name.is_empty() || email.is_empty() {
        return Err(Error::validation("form", "Name and email are required"));
    }
    validate_name(&name)?;
    validate_email(&email)?;

    if let Some(existing) = users::get_user_by_email(conn, &email).await? {
        if existing.id != user_id {
            return Err(Error::Conflict("Email already in use".to_string()));
        }
    }

    let user = users::update_profile(conn, user_id, &name, &email).await?;
    Ok(UserProfile::from(&user))
}

/// Replaces the password and signs out every other session
pub async fn change_password(
    conn: &mut DbConn,
    user_id: Uuid,
    current_session_token: &str,
    request: ChangePassword,
) -> Result<()> {
    if request.current_password.is_empty() || request.new_password.is_empty() {
        return Err(Error::validation("form", "Current and new password are required"));
    }

    let user = users::get_user_by_id(conn, user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    if !verify_password(&request.current_password, &user.password_hash)? {
        return Err(Error::Authentication("Current password is incorrect".to_string()));
    }

    validate_password(&request.new_password, "new_password")?;

    let password_hash = hash_password(&request.new_password)?;
    users::update_user_password(conn, user_id, &password_hash).await?;
    sessions::revoke_other_sessions(conn, user_id, current_session_token).await?;

    tracing::info!(user_id = %user_id, "Password changed");
    Ok(())
}

/// Hashes a password using Argon2
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();

    Ok(password_hash)
}

/// Verifies a password against a password hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| Error::Internal(format!("Invalid password hash: {}", e)))?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::Internal(format!("Password verification failed: {}", e))),
    }
}
