use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    AuthResponseDto, LoginRequestDto, MeResponseDto, RefreshTokenRequestDto,
    RefreshTokenResponseDto, RegisterRequestDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::features::auth::services::token_service::TokenService;
use crate::features::users::models::{CreateUser, User};
use crate::features::users::services::UserService;
use std::sync::Arc;

const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Service for authentication operations (register, login, refresh, logout)
pub struct AuthService {
    user_service: Arc<UserService>,
    token_service: Arc<TokenService>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        user_service: Arc<UserService>,
        token_service: Arc<TokenService>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            user_service,
            token_service,
            bcrypt_cost,
        }
    }

    /// Register a new user and sign them in
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<AuthResponseDto> {
        let password_hash = hash_password_blocking(dto.password, self.bcrypt_cost).await?;

        let user = self
            .user_service
            .create(CreateUser {
                username: dto.username,
                email: dto.email,
                password_hash,
                first_name: dto.first_name,
                last_name: dto.last_name,
            })
            .await?;

        self.auth_response(user)
    }

    /// Login with email and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let user = self
            .user_service
            .find_by_email(&dto.email)
            .await?
            .ok_or_else(invalid_credentials)?;

        let password_valid =
            verify_password_blocking(dto.password, user.password_hash.clone()).await?;
        if !password_valid {
            return Err(invalid_credentials());
        }

        ensure_can_sign_in(&user)?;

        tracing::info!("User {} logged in", user.id);
        self.auth_response(user)
    }

    /// Exchange a live refresh token for a new access token
    pub async fn refresh_token(
        &self,
        dto: RefreshTokenRequestDto,
    ) -> Result<RefreshTokenResponseDto> {
        let claims = self
            .token_service
            .verify_refresh_token(&dto.refresh_token)
            .await?;

        let user = self
            .user_service
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Auth("User no longer exists".to_string()))?;
        ensure_can_sign_in(&user)?;

        Ok(RefreshTokenResponseDto {
            access_token: self.token_service.issue_access_token(&user)?,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.token_service.access_token_ttl_secs(),
        })
    }

    /// Revoke the caller's refresh token
    pub async fn logout(&self, user: &AuthenticatedUser, dto: RefreshTokenRequestDto) -> Result<()> {
        let claims = self
            .token_service
            .verify_refresh_token(&dto.refresh_token)
            .await
            .map_err(|e| match e {
                AppError::Auth(msg) => AppError::BadRequest(msg),
                other => other,
            })?;

        if claims.sub != user.user_id {
            return Err(AppError::BadRequest(
                "Refresh token does not belong to the current user".to_string(),
            ));
        }

        self.token_service.blacklist(&claims).await?;
        tracing::info!("User {} logged out", user.user_id);

        Ok(())
    }

    /// Get current user info (for /me endpoint)
    pub async fn get_current_user(&self, user: AuthenticatedUser) -> Result<MeResponseDto> {
        Ok(user.into())
    }

    fn auth_response(&self, user: User) -> Result<AuthResponseDto> {
        let tokens = self.token_service.issue_pair(&user)?;

        Ok(AuthResponseDto {
            access_token: tokens.access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: tokens.expires_in,
            refresh_token: tokens.refresh_token,
            user: user.into(),
        })
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

/// Blocked accounts are refused outright, inactive ones look like bad credentials
fn ensure_can_sign_in(user: &User) -> Result<()> {
    if user.is_blocked {
        return Err(AppError::Forbidden("Account is blocked".to_string()));
    }
    if !user.is_active {
        return Err(AppError::Unauthorized("Account is inactive".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::test_user;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_blocked_user_is_forbidden() {
        let mut user = test_user();
        user.is_blocked = true;

        let response = ensure_can_sign_in(&user).unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_inactive_user_is_unauthorized() {
        let mut user = test_user();
        user.is_active = false;

        let response = ensure_can_sign_in(&user).unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_active_user_can_sign_in() {
        assert!(ensure_can_sign_in(&test_user()).is_ok());
    }
}
