use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::features::categories::models::Category;
use crate::shared::constants::CATEGORY_NAME_MAX_LENGTH;
use crate::shared::validation::{trimmed, trimmed_opt};

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    /// Owning user
    pub user: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            user: c.user_id,
            name: c.name,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Request DTO for creating or replacing a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CategoryRequestDto {
    #[validate(custom(function = "validate_category_name"))]
    #[serde(deserialize_with = "trimmed")]
    pub name: String,
}

/// Request DTO for partially updating a category
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(custom(function = "validate_category_name"))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub name: Option<String>,
}

/// Names arrive trimmed; they must be non-empty and fit the column
fn validate_category_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::new("blank")
            .with_message(Cow::Borrowed("This field may not be blank.")));
    }

    if name.chars().count() as u64 > CATEGORY_NAME_MAX_LENGTH {
        return Err(ValidationError::new("max_length").with_message(Cow::Owned(format!(
            "Ensure this field has no more than {} characters.",
            CATEGORY_NAME_MAX_LENGTH
        ))));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_name_is_blank() {
        let dto: CategoryRequestDto = serde_json::from_str(r#"{"name": "   "}"#).unwrap();
        let errors = dto.validate().unwrap_err();

        assert_eq!(errors.field_errors()["name"][0].code, "blank");
    }

    #[test]
    fn test_name_is_trimmed() {
        let dto: CategoryRequestDto = serde_json::from_str(r#"{"name": "  Rent "}"#).unwrap();

        assert!(dto.validate().is_ok());
        assert_eq!(dto.name, "Rent");
    }

    #[test]
    fn test_name_length_limit() {
        let ok = CategoryRequestDto {
            name: "a".repeat(100),
        };
        let too_long = CategoryRequestDto {
            name: "a".repeat(101),
        };

        assert!(ok.validate().is_ok());
        assert_eq!(
            too_long.validate().unwrap_err().field_errors()["name"][0].code,
            "max_length"
        );
    }

    #[test]
    fn test_partial_update_without_name_is_valid() {
        let dto: UpdateCategoryDto = serde_json::from_str("{}").unwrap();
        assert!(dto.validate().is_ok());

        let dto: UpdateCategoryDto = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(dto.validate().is_err());
    }
}
