//! Authentication and permission handlers.

use axum::{extract::State, http::StatusCode, Json};
use std::str::FromStr;
use std::sync::Arc;

use crate::auth::{bundle_for_user, PermissionBundle, SessionService};
use crate::db::{NewUser, UserRepository};
use crate::web::dto::{
    ApiResponse, LoginRequest, LoginResponse, LogoutRequest, MeResponse, RefreshRequest,
    RefreshResponse, RegisterRequest, UserInfo, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;
use crate::{Database, Role};

/// Application state shared across handlers.
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Session lifecycle service.
    pub sessions: SessionService,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Database, sessions: SessionService) -> Self {
        Self { db, sessions }
    }
}

/// POST /api/auth/login - User login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let session = state.sessions.login(&req.email, &req.password).await?;

    let response = LoginResponse {
        access_token: session.tokens.access_token,
        refresh_token: session.tokens.refresh_token,
        expires_in: session.tokens.expires_in,
        user: UserInfo::from(session.user),
    };

    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/auth/logout - User logout.
///
/// Always returns success; the response never reveals whether the
/// submitted token string was valid.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if let Some(ref token) = req.refresh_token {
        state.sessions.logout(token).await;
    }

    Ok(Json(ApiResponse::new(())))
}

/// POST /api/auth/refresh - Rotate a refresh token.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<RefreshResponse>>, ApiError> {
    let session = state.sessions.refresh(&req.refresh_token).await?;

    let response = RefreshResponse {
        access_token: session.tokens.access_token,
        refresh_token: session.tokens.refresh_token,
        expires_in: session.tokens.expires_in,
        user: UserInfo::from(session.user),
    };

    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/auth/register - User registration.
///
/// Only client and supplier accounts can be self-registered; the DTO
/// validation rejects anything else before this handler runs.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), ApiError> {
    let role = Role::from_str(&req.role).map_err(ApiError::bad_request)?;

    let password_hash = crate::hash_password(&req.password)
        .map_err(|e| ApiError::unprocessable(format!("Password error: {}", e)))?;

    let repo = UserRepository::new(state.db.pool());
    let mut new_user = NewUser::new(&req.email, password_hash, &req.display_name).with_role(role);
    if let Some(ref company) = req.company {
        new_user = new_user.with_company(company);
    }

    let user = repo.create(&new_user).await.map_err(|e| {
        if e.to_string().contains("UNIQUE") {
            ApiError::conflict("Email already registered")
        } else {
            tracing::error!("User creation failed: {}", e);
            ApiError::internal("Failed to create user")
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(UserInfo::from(user))),
    ))
}

/// GET /api/auth/me - Get current user info.
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .get_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let response = MeResponse {
        id: user.id,
        email: user.email,
        display_name: user.display_name,
        role: user.role.to_string(),
        company: user.company,
        created_at: user.created_at.clone(),
        last_login_at: user.last_login.clone(),
    };

    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/auth/permissions - Get the permission bundle for the session.
///
/// The bundle is rebuilt from the user's current role on every call; the
/// frontend caches it and replaces it wholesale on refresh.
pub async fn permissions(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<PermissionBundle>>, ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .get_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(ApiResponse::new(bundle_for_user(&user))))
}
