// src/handlers/account.rs

use crate::{
    auth::{AuthUser, generate_token},
    errors::{AppError, AppJson, AppResult},
    models::{
        AuthResponse, LoginRequest, NewUser, SignupRequest, UpdateProfileRequest, User, UserPublic,
        clean_optional_text,
    },
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode};
use bcrypt::{hash, verify};
use tracing::info;

const MIN_PASSWORD_LEN: usize = 6;

fn issue(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let token = generate_token(
        user.id,
        &user.username,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;
    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

/// Create an account
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing fields or password too short"),
        (status = 409, description = "Username already exists"),
    ),
    tag = "Accounts"
)]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(body): AppJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let full_name = body.full_name.trim();
    let username = body.username.trim();
    if full_name.is_empty() || username.is_empty() || body.password.is_empty() {
        return Err(AppError::validation(
            "Full name, username, and password cannot be empty",
        ));
    }
    if body.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    if let Some(age) = body.age {
        if age < 0 {
            return Err(AppError::validation("age cannot be negative"));
        }
    }

    let password_hash = hash(&body.password, state.config.bcrypt_cost)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = state
        .stores
        .users
        .create(NewUser {
            full_name: full_name.to_string(),
            username: username.to_string(),
            password_hash,
            age: body.age,
            occupation: clean_optional_text(body.occupation),
            phone_number: clean_optional_text(body.phone_number),
        })
        .await?;

    info!("👤 User '{}' signed up", user.username);
    Ok((StatusCode::CREATED, Json(issue(&state, user)?)))
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "Accounts"
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::validation("Please provide username and password"));
    }

    let user = state
        .stores
        .users
        .find_by_username(body.username.trim())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = verify(&body.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !valid {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    Ok(Json(issue(&state, user)?))
}

/// Get the signed-in user's profile
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Profile", body = UserPublic),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn get_profile(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<UserPublic>> {
    let user = state.stores.users.get(auth.id).await?;
    Ok(Json(user.into()))
}

/// Update profile fields; `null` clears an optional field
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserPublic),
        (status = 400, description = "Invalid field"),
        (status = 409, description = "Phone number already in use"),
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(body): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<UserPublic>> {
    if body
        .full_name
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(AppError::validation("fullName cannot be empty"));
    }
    if matches!(body.age, Some(Some(age)) if age < 0) {
        return Err(AppError::validation("age cannot be negative"));
    }

    let user = state.stores.users.update_profile(auth.id, body).await?;
    info!("👤 Profile updated for '{}'", auth.username);
    Ok(Json(user.into()))
}
