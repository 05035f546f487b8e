use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::{User, UserRole};
use crate::shared::validation::trimmed_opt;

/// Public view of a user account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub is_premium: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            is_premium: user.is_premium,
            is_staff: user.is_staff,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Request DTO for updating the caller's own profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1-150 characters"),
        regex(
            path = "*crate::shared::validation::USERNAME_REGEX",
            message = "Username may only contain letters, digits and @/./+/-/_"
        )
    )]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub email: Option<String>,

    #[validate(length(max = 150, message = "First name must not exceed 150 characters"))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub first_name: Option<String>,

    #[validate(length(max = 150, message = "Last name must not exceed 150 characters"))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub last_name: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[serde(default)]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_profile_allows_empty_body() {
        let dto: UpdateProfileDto = serde_json::from_str("{}").unwrap();
        assert!(dto.validate().is_ok());
        assert!(dto.username.is_none());
    }

    #[test]
    fn test_update_profile_rejects_bad_username_and_short_password() {
        let dto: UpdateProfileDto =
            serde_json::from_str(r#"{"username": "no spaces", "password": "short"}"#).unwrap();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_update_profile_trims_names() {
        let dto: UpdateProfileDto =
            serde_json::from_str(r#"{"first_name": "  Ana ", "email": " ana@example.com "}"#)
                .unwrap();
        assert_eq!(dto.first_name.as_deref(), Some("Ana"));
        assert!(dto.validate().is_ok());
    }
}
