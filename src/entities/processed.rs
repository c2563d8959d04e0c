// 🧾 Processed Lead - one agency lead bundled with its match + validation outcome

use crate::entities::Lead;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// MATCH RESULT
// ============================================================================

/// Which identity field produced the CRM match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Email,
    Dni,
    Phone,
    None,
}

/// Outcome of cross-referencing one agency lead against the CRM set.
///
/// `match_type` is `None` exactly when `is_present` is false; the optional
/// fields are only populated for present leads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub is_present: bool,
    pub match_type: MatchType,
    pub status: Option<String>,
    pub classification: Option<String>,
    pub crm_created_date: Option<DateTime<Utc>>,
}

impl MatchResult {
    /// The lead was not found under any identity field.
    pub fn absent() -> Self {
        MatchResult {
            is_present: false,
            match_type: MatchType::None,
            status: None,
            classification: None,
            crm_created_date: None,
        }
    }
}

// ============================================================================
// PROFILE VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileValidationResult {
    pub meets_profile: bool,
    pub reason: Option<String>,
}

impl ProfileValidationResult {
    pub fn eligible() -> Self {
        ProfileValidationResult {
            meets_profile: true,
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        ProfileValidationResult {
            meets_profile: false,
            reason: Some(reason.into()),
        }
    }
}

// ============================================================================
// PROCESSED LEAD
// ============================================================================

/// Immutable composition of one lead with its match and validation results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedLead {
    pub lead: Lead,
    pub match_result: MatchResult,
    pub profile_validation: ProfileValidationResult,
}

impl ProcessedLead {
    pub fn new(
        lead: Lead,
        match_result: MatchResult,
        profile_validation: ProfileValidationResult,
    ) -> Self {
        ProcessedLead {
            lead,
            match_result,
            profile_validation,
        }
    }

    pub fn is_present_in_crm(&self) -> bool {
        self.match_result.is_present
    }

    pub fn meets_profile(&self) -> bool {
        self.profile_validation.meets_profile
    }

    /// A lead the agency should have received credit for but the CRM never
    /// recorded: absent from the CRM while meeting the profile.
    pub fn is_missing_lead(&self) -> bool {
        !self.is_present_in_crm() && self.meets_profile()
    }

    pub fn status(&self) -> &str {
        self.match_result
            .status
            .as_deref()
            .unwrap_or("No presente en el CRM")
    }

    pub fn classification(&self) -> &str {
        self.match_result
            .classification
            .as_deref()
            .unwrap_or("Sin clasificación")
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::LeadData;
    use chrono::TimeZone;

    fn create_test_lead() -> Lead {
        Lead::new(
            "lead-1",
            LeadData {
                dni: "12345678".to_string(),
                email: "ana@x.com".to_string(),
                phone: "987654321".to_string(),
                full_name: "Ana Torres".to_string(),
                created_time: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
                experience: None,
                education_level: None,
                sunedu_registered: None,
                program: None,
                ad_name: None,
                adset_name: None,
                campaign_id: None,
                campaign_name: None,
                form_id: None,
                form_name: None,
                ad_id: None,
                adset_id: None,
                is_organic: None,
                platform: None,
                lead_status: None,
                utm_campaign_medium: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_missing_lead_requires_absent_and_eligible() {
        let missing = ProcessedLead::new(
            create_test_lead(),
            MatchResult::absent(),
            ProfileValidationResult::eligible(),
        );
        assert!(missing.is_missing_lead());

        let present = ProcessedLead::new(
            create_test_lead(),
            MatchResult {
                is_present: true,
                match_type: MatchType::Email,
                status: Some("Nuevo".to_string()),
                classification: Some("Frío".to_string()),
                crm_created_date: None,
            },
            ProfileValidationResult::eligible(),
        );
        assert!(!present.is_missing_lead());

        let ineligible = ProcessedLead::new(
            create_test_lead(),
            MatchResult::absent(),
            ProfileValidationResult::rejected("No registrado en SUNEDU"),
        );
        assert!(!ineligible.is_missing_lead());
    }

    #[test]
    fn test_status_and_classification_fallbacks() {
        let processed = ProcessedLead::new(
            create_test_lead(),
            MatchResult::absent(),
            ProfileValidationResult::eligible(),
        );

        assert_eq!(processed.status(), "No presente en el CRM");
        assert_eq!(processed.classification(), "Sin clasificación");
    }

    #[test]
    fn test_match_type_serializes_lowercase() {
        let json = serde_json::to_string(&MatchType::Email).unwrap();
        assert_eq!(json, "\"email\"");
        let json = serde_json::to_string(&MatchType::None).unwrap();
        assert_eq!(json, "\"none\"");
    }
}
