// 👤 Agency Lead - one row of the agency export
// Identity fields are normalized at construction and never mutated afterwards

use crate::identity::{Dni, Email, Experience, PhoneNumber};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// RAW FIELD VALUES
// ============================================================================

/// Raw field values for one agency row, before normalization.
///
/// Produced by the ingestion layer (column mapping already applied).
#[derive(Debug, Clone, Deserialize)]
pub struct LeadData {
    pub dni: String,
    pub email: String,
    pub phone: String,
    pub full_name: String,
    pub created_time: DateTime<Utc>,
    pub experience: Option<f64>,
    pub education_level: Option<String>,
    pub sunedu_registered: Option<bool>,
    pub program: Option<String>,
    // Marketing attribution passthrough
    pub ad_name: Option<String>,
    pub adset_name: Option<String>,
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    pub form_id: Option<String>,
    pub form_name: Option<String>,
    pub ad_id: Option<String>,
    pub adset_id: Option<String>,
    pub is_organic: Option<bool>,
    pub platform: Option<String>,
    pub lead_status: Option<String>,
    pub utm_campaign_medium: Option<String>,
}

// ============================================================================
// LEAD ENTITY
// ============================================================================

/// A prospective-customer record submitted by the agency.
///
/// Constructed once per parsed row; the identity triple (dni, email, phone)
/// is the matching and grouping key everywhere downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub dni: Dni,
    pub email: Email,
    pub phone: PhoneNumber,
    pub full_name: String,
    pub created_time: DateTime<Utc>,
    pub experience: Option<Experience>,
    pub education_level: Option<String>,
    pub sunedu_registered: Option<bool>,
    pub program: Option<String>,
    pub ad_name: Option<String>,
    pub adset_name: Option<String>,
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    pub form_id: Option<String>,
    pub form_name: Option<String>,
    pub ad_id: Option<String>,
    pub adset_id: Option<String>,
    pub is_organic: Option<bool>,
    pub platform: Option<String>,
    pub lead_status: Option<String>,
    pub utm_campaign_medium: Option<String>,
}

impl Lead {
    /// Build a lead from raw row values.
    ///
    /// The identifier is assigned by the caller: ingestion hands out fresh
    /// UUIDs, tests pass stable strings. Fails only on a negative experience
    /// value; the caller skips that row and keeps going.
    pub fn new(id: impl Into<String>, data: LeadData) -> Result<Self> {
        let experience = match data.experience {
            Some(years) => Some(Experience::new(years)?),
            None => None,
        };

        Ok(Lead {
            id: id.into(),
            dni: Dni::new(&data.dni),
            email: Email::new(&data.email),
            phone: PhoneNumber::new(&data.phone),
            full_name: data.full_name,
            created_time: data.created_time,
            experience,
            education_level: data.education_level,
            sunedu_registered: data.sunedu_registered,
            program: data.program,
            ad_name: data.ad_name,
            adset_name: data.adset_name,
            campaign_id: data.campaign_id,
            campaign_name: data.campaign_name,
            form_id: data.form_id,
            form_name: data.form_name,
            ad_id: data.ad_id,
            adset_id: data.adset_id,
            is_organic: data.is_organic,
            platform: data.platform,
            lead_status: data.lead_status,
            utm_campaign_medium: data.utm_campaign_medium,
        })
    }

    /// Program used to scope CRM matching; empty strings count as absent.
    pub fn matching_program(&self) -> Option<&str> {
        self.program.as_deref().filter(|p| !p.is_empty())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_data() -> LeadData {
        LeadData {
            dni: " 12345678 ".to_string(),
            email: "ana@x.com".to_string(),
            phone: "51987654321".to_string(),
            full_name: "Ana Torres".to_string(),
            created_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            experience: Some(2.5),
            education_level: Some("Bachiller".to_string()),
            sunedu_registered: Some(true),
            program: Some("MBA".to_string()),
            ad_name: None,
            adset_name: None,
            campaign_id: None,
            campaign_name: None,
            form_id: None,
            form_name: Some("Form Marzo".to_string()),
            ad_id: None,
            adset_id: None,
            is_organic: Some(false),
            platform: Some("fb".to_string()),
            lead_status: None,
            utm_campaign_medium: None,
        }
    }

    #[test]
    fn test_lead_normalizes_identity_fields() {
        let lead = Lead::new("lead-1", create_test_data()).unwrap();

        assert_eq!(lead.id, "lead-1");
        assert_eq!(lead.dni.value(), "12345678");
        assert_eq!(lead.phone.value(), "987654321");
        assert_eq!(lead.experience.unwrap().years(), 2);
    }

    #[test]
    fn test_lead_rejects_negative_experience() {
        let mut data = create_test_data();
        data.experience = Some(-3.0);

        assert!(Lead::new("lead-1", data).is_err());
    }

    #[test]
    fn test_matching_program_ignores_empty_string() {
        let mut data = create_test_data();
        data.program = Some(String::new());
        let lead = Lead::new("lead-1", data).unwrap();
        assert_eq!(lead.matching_program(), None);

        let lead = Lead::new("lead-2", create_test_data()).unwrap();
        assert_eq!(lead.matching_program(), Some("MBA"));
    }
}
