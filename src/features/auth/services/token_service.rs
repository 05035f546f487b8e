use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{Claims, TokenType};
use crate::features::auth::JwtValidator;
use crate::features::users::models::User;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Freshly signed access/refresh pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Issues signed tokens and tracks revoked refresh tokens
pub struct TokenService {
    pool: PgPool,
    validator: Arc<JwtValidator>,
    encoding_key: EncodingKey,
    issuer: String,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl TokenService {
    pub fn new(pool: PgPool, validator: Arc<JwtValidator>, config: &AuthConfig) -> Self {
        Self {
            pool,
            validator,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer.clone(),
            access_token_ttl: config.access_token_ttl,
            refresh_token_ttl: config.refresh_token_ttl,
        }
    }

    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_ttl.as_secs() as i64
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access_token(user)?,
            refresh_token: self.sign(user, TokenType::Refresh, self.refresh_token_ttl)?,
            expires_in: self.access_token_ttl_secs(),
        })
    }

    pub fn issue_access_token(&self, user: &User) -> Result<String> {
        self.sign(user, TokenType::Access, self.access_token_ttl)
    }

    fn sign(&self, user: &User, token_type: TokenType, ttl: Duration) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            jti: Uuid::new_v4(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now + ttl.as_secs() as i64,
            token_type,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            is_staff: user.is_staff,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign {} token: {:?}", token_type, e);
            AppError::Internal("Failed to sign token".to_string())
        })
    }

    /// Decode a refresh token that has not been revoked
    pub async fn verify_refresh_token(&self, token: &str) -> Result<Claims> {
        let claims = self.validator.decode(token, TokenType::Refresh)?;

        if self.is_blacklisted(claims.jti).await? {
            return Err(AppError::Auth("Token is blacklisted".to_string()));
        }

        Ok(claims)
    }

    pub async fn is_blacklisted(&self, jti: Uuid) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM token_blacklist WHERE jti = $1)",
        )
        .bind(jti)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check token blacklist: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Revoke a refresh token; revoking twice is a no-op
    pub async fn blacklist(&self, claims: &Claims) -> Result<()> {
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);

        sqlx::query(
            r#"
            INSERT INTO token_blacklist (jti, user_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(claims.jti)
        .bind(claims.sub)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to blacklist token: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    /// Drop revocation records for tokens that have expired anyway
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM token_blacklist WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to purge token blacklist: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{lazy_pool, test_auth_config, test_user};

    fn service() -> (TokenService, Arc<JwtValidator>) {
        let config = test_auth_config();
        let validator = Arc::new(JwtValidator::new(&config));
        (
            TokenService::new(lazy_pool(), Arc::clone(&validator), &config),
            validator,
        )
    }

    #[tokio::test]
    async fn test_access_token_round_trips_identity() {
        let (service, validator) = service();
        let user = test_user();

        let pair = service.issue_pair(&user).unwrap();
        let caller = validator.validate_access_token(&pair.access_token).unwrap();

        assert_eq!(caller.user_id, user.id);
        assert_eq!(caller.email, user.email);
        assert_eq!(pair.expires_in, 300);
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_an_access_token() {
        let (service, validator) = service();
        let pair = service.issue_pair(&test_user()).unwrap();

        assert!(validator.validate_access_token(&pair.refresh_token).is_err());
        assert!(validator
            .decode(&pair.access_token, TokenType::Refresh)
            .is_err());
        assert!(validator
            .decode(&pair.refresh_token, TokenType::Refresh)
            .is_ok());
    }

    #[tokio::test]
    async fn test_token_from_other_secret_is_rejected() {
        let (service, _) = service();
        let token = service.issue_access_token(&test_user()).unwrap();

        let mut other = test_auth_config();
        other.jwt_secret = "another-secret-that-is-long-enough-to-use".to_string();
        assert!(JwtValidator::new(&other).validate_access_token(&token).is_err());
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let mut config = test_auth_config();
        config.access_token_ttl = Duration::from_secs(0);
        config.jwt_leeway = Duration::from_secs(0);
        let validator = Arc::new(JwtValidator::new(&config));
        let service = TokenService::new(lazy_pool(), Arc::clone(&validator), &config);

        let token = service.issue_access_token(&test_user()).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        assert!(validator.validate_access_token(&token).is_err());
    }
}
