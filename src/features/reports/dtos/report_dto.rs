use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::features::reports::period::ReportPeriod;

fn validate_period(value: &str) -> Result<(), ValidationError> {
    if ReportPeriod::parse(value).is_none() {
        return Err(ValidationError::new("invalid_period")
            .with_message(Cow::Borrowed("Must be \"weekly\" or \"monthly\".")));
    }
    Ok(())
}

/// Request DTO for an on-demand report run
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct DispatchReportsDto {
    /// "weekly" or "monthly"; defaults to the configured period
    #[serde(default)]
    #[validate(custom(function = "validate_period"))]
    #[schema(example = "weekly")]
    pub period: Option<String>,
}

/// Response DTO for an accepted report run
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DispatchReportsResponseDto {
    pub period: String,
    /// Active users a report job was queued for
    pub queued_users: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_is_optional() {
        let dto: DispatchReportsDto = serde_json::from_str("{}").unwrap();
        assert!(dto.period.is_none());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_unknown_period_is_rejected() {
        let dto = DispatchReportsDto {
            period: Some("daily".to_string()),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("period"));
    }

    #[test]
    fn test_period_must_match_exactly() {
        for period in ["Weekly", " monthly "] {
            let dto = DispatchReportsDto {
                period: Some(period.to_string()),
            };
            assert!(dto.validate().is_err(), "{:?} accepted", period);
        }

        let dto = DispatchReportsDto {
            period: Some("monthly".to_string()),
        };
        assert!(dto.validate().is_ok());
    }
}
