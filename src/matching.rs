// 🔎 Lead Matching Engine - cross-reference agency leads against the CRM
// Containment matching over three identity fields with email > dni > phone priority

use crate::entities::{CrmLead, Lead, MatchResult, MatchType};
use chrono::{DateTime, Utc};

/// Fallback when no matching CRM record carries a status.
pub const FALLBACK_STATUS: &str = "Sin estado";

/// Fallback when no matching CRM record carries a classification.
pub const FALLBACK_CLASSIFICATION: &str = "Sin clasificación";

// ============================================================================
// MATCH FIELD
// ============================================================================

/// Identity field used as matching key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchField {
    Email,
    Dni,
    Phone,
}

impl MatchField {
    fn value_of<'a>(&self, crm: &'a CrmLead) -> &'a str {
        match self {
            MatchField::Email => crm.email.value(),
            MatchField::Dni => crm.dni.value(),
            MatchField::Phone => crm.phone.value(),
        }
    }
}

// ============================================================================
// MATCHING ENGINE
// ============================================================================

/// Decides whether one agency lead is already represented in the CRM and,
/// if so, which status/classification/date to attribute to it.
///
/// Matching is containment-based: a CRM field matches when it contains the
/// lead's normalized field value as a substring, which tolerates leading
/// zeros, country-code prefixes and similar data-entry noise. Leads carrying
/// a program are only compared against CRM records of the same program.
///
/// Never fails: absent data degrades to "not present" or missing optional
/// fields.
pub struct LeadMatchingEngine;

impl LeadMatchingEngine {
    pub fn new() -> Self {
        LeadMatchingEngine
    }

    /// Match one agency lead against the full CRM collection.
    pub fn match_lead(&self, lead: &Lead, crm_leads: &[CrmLead]) -> MatchResult {
        let program = lead.matching_program();
        let email = lead.email.value();
        let dni = lead.dni.value();
        let phone = lead.phone.value();

        let email_matches = self.count_matches(crm_leads, program, MatchField::Email, email);
        let dni_matches = self.count_matches(crm_leads, program, MatchField::Dni, dni);
        let phone_matches = self.count_matches(crm_leads, program, MatchField::Phone, phone);

        if email_matches + dni_matches + phone_matches == 0 {
            return MatchResult::absent();
        }

        // Priority email > dni > phone: email addresses are the most reliable
        // key, phone numbers the most likely to be shared or mistyped
        let match_type = if email_matches > 0 {
            MatchType::Email
        } else if dni_matches > 0 {
            MatchType::Dni
        } else {
            MatchType::Phone
        };

        let status = self
            .latest_value(crm_leads, program, MatchField::Email, email, |c| &c.status)
            .or_else(|| self.latest_value(crm_leads, program, MatchField::Dni, dni, |c| &c.status))
            .or_else(|| {
                self.latest_value(crm_leads, program, MatchField::Phone, phone, |c| &c.status)
            })
            .unwrap_or_else(|| FALLBACK_STATUS.to_string());

        let classification = self
            .latest_value(crm_leads, program, MatchField::Email, email, |c| {
                &c.classification
            })
            .or_else(|| {
                self.latest_value(crm_leads, program, MatchField::Dni, dni, |c| &c.classification)
            })
            .or_else(|| {
                self.latest_value(crm_leads, program, MatchField::Phone, phone, |c| {
                    &c.classification
                })
            })
            .unwrap_or_else(|| FALLBACK_CLASSIFICATION.to_string());

        let crm_created_date = self
            .earliest_date(crm_leads, program, MatchField::Email, email)
            .or_else(|| self.earliest_date(crm_leads, program, MatchField::Dni, dni))
            .or_else(|| self.earliest_date(crm_leads, program, MatchField::Phone, phone));

        MatchResult {
            is_present: true,
            match_type,
            status: Some(status),
            classification: Some(classification),
            crm_created_date,
        }
    }

    /// CRM candidates whose `field` value contains `key` as a substring,
    /// restricted to the lead's program when one is set.
    fn candidates<'a>(
        &self,
        crm_leads: &'a [CrmLead],
        program: Option<&str>,
        field: MatchField,
        key: &str,
    ) -> Vec<&'a CrmLead> {
        if key.is_empty() {
            return Vec::new();
        }
        crm_leads
            .iter()
            .filter(|crm| program.map_or(true, |p| crm.program == p))
            .filter(|crm| {
                let value = field.value_of(crm);
                !value.is_empty() && value.contains(key)
            })
            .collect()
    }

    fn count_matches(
        &self,
        crm_leads: &[CrmLead],
        program: Option<&str>,
        field: MatchField,
        key: &str,
    ) -> usize {
        self.candidates(crm_leads, program, field, key).len()
    }

    /// Attribute value on the most recently created matching candidate.
    ///
    /// A later candidate only wins when its date is strictly greater, so ties
    /// keep the first one encountered. Empty attribute values count as absent.
    fn latest_value<F>(
        &self,
        crm_leads: &[CrmLead],
        program: Option<&str>,
        field: MatchField,
        key: &str,
        attribute: F,
    ) -> Option<String>
    where
        F: Fn(&CrmLead) -> &str,
    {
        let matches = self.candidates(crm_leads, program, field, key);
        let mut latest = *matches.first()?;
        for &crm in matches.iter().skip(1) {
            if crm.created_date > latest.created_date {
                latest = crm;
            }
        }

        let value = attribute(latest);
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// Earliest creation date among matching candidates.
    fn earliest_date(
        &self,
        crm_leads: &[CrmLead],
        program: Option<&str>,
        field: MatchField,
        key: &str,
    ) -> Option<DateTime<Utc>> {
        let matches = self.candidates(crm_leads, program, field, key);
        let mut earliest = matches.first()?.created_date;
        for &crm in matches.iter().skip(1) {
            if crm.created_date < earliest {
                earliest = crm.created_date;
            }
        }
        Some(earliest)
    }
}

impl Default for LeadMatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CrmLeadData, LeadData};
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn create_test_lead(dni: &str, email: &str, phone: &str, program: Option<&str>) -> Lead {
        Lead::new(
            "lead-1",
            LeadData {
                dni: dni.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
                full_name: "Ana Torres".to_string(),
                created_time: date(2024, 3, 1),
                experience: None,
                education_level: None,
                sunedu_registered: None,
                program: program.map(str::to_string),
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

    fn create_crm_lead(
        id: &str,
        dni: &str,
        email: &str,
        phone: &str,
        program: &str,
        status: &str,
        created: DateTime<Utc>,
    ) -> CrmLead {
        CrmLead::new(
            id,
            CrmLeadData {
                dni: dni.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
                full_name: "Luis Paredes".to_string(),
                status: status.to_string(),
                classification: format!("Clasif {}", status),
                program: program.to_string(),
                created_date: created,
                utm_campaign_medium: None,
            },
        )
    }

    #[test]
    fn test_no_match_returns_absent() {
        let engine = LeadMatchingEngine::new();
        let lead = create_test_lead("11111111", "nadie@x.com", "987000111", None);
        let crm = vec![create_crm_lead(
            "c1",
            "22222222",
            "otro@y.com",
            "988222333",
            "MBA",
            "Nuevo",
            date(2024, 1, 1),
        )];

        let result = engine.match_lead(&lead, &crm);

        assert!(!result.is_present);
        assert_eq!(result.match_type, MatchType::None);
        assert!(result.status.is_none());
        assert!(result.classification.is_none());
        assert!(result.crm_created_date.is_none());
    }

    #[test]
    fn test_substring_match_consolidates_latest_status_and_earliest_date() {
        // Two MBA candidates both contain "ana@x.com": the later one wins the
        // status, the earlier one wins the date
        let engine = LeadMatchingEngine::new();
        let lead = create_test_lead("11111111", "ana@x.com", "", Some("MBA"));
        let crm = vec![
            create_crm_lead(
                "c1",
                "",
                "ana@x.com.pe",
                "",
                "MBA",
                "Nuevo",
                date(2024, 1, 10),
            ),
            create_crm_lead(
                "c2",
                "",
                "xana@x.com",
                "",
                "MBA",
                "Ganado",
                date(2024, 2, 1),
            ),
        ];

        let result = engine.match_lead(&lead, &crm);

        assert!(result.is_present);
        assert_eq!(result.match_type, MatchType::Email);
        assert_eq!(result.status.as_deref(), Some("Ganado"));
        assert_eq!(result.crm_created_date, Some(date(2024, 1, 10)));
    }

    #[test]
    fn test_program_scoping_excludes_other_programs() {
        let engine = LeadMatchingEngine::new();
        let lead = create_test_lead("11111111", "ana@x.com", "", Some("MBA"));
        let crm = vec![create_crm_lead(
            "c1",
            "",
            "ana@x.com",
            "",
            "Marketing",
            "Nuevo",
            date(2024, 1, 1),
        )];

        let result = engine.match_lead(&lead, &crm);
        assert!(!result.is_present);
    }

    #[test]
    fn test_lead_without_program_searches_full_pool() {
        let engine = LeadMatchingEngine::new();
        let lead = create_test_lead("11111111", "ana@x.com", "", None);
        let crm = vec![create_crm_lead(
            "c1",
            "",
            "ana@x.com",
            "",
            "Marketing",
            "Nuevo",
            date(2024, 1, 1),
        )];

        let result = engine.match_lead(&lead, &crm);
        assert!(result.is_present);
    }

    #[test]
    fn test_email_priority_beats_dni_and_phone() {
        let engine = LeadMatchingEngine::new();
        let lead = create_test_lead("11111111", "ana@x.com", "987654321", None);
        let crm = vec![
            // dni + phone match
            create_crm_lead(
                "c1",
                "11111111",
                "",
                "987654321",
                "MBA",
                "Perdido",
                date(2024, 1, 5),
            ),
            // email match
            create_crm_lead("c2", "", "ana@x.com", "", "MBA", "Nuevo", date(2024, 1, 1)),
        ];

        let result = engine.match_lead(&lead, &crm);
        assert_eq!(result.match_type, MatchType::Email);
    }

    #[test]
    fn test_dni_priority_beats_phone() {
        let engine = LeadMatchingEngine::new();
        let lead = create_test_lead("11111111", "nadie@z.com", "987654321", None);
        let crm = vec![create_crm_lead(
            "c1",
            "11111111",
            "",
            "987654321",
            "MBA",
            "Nuevo",
            date(2024, 1, 5),
        )];

        let result = engine.match_lead(&lead, &crm);
        assert_eq!(result.match_type, MatchType::Dni);
    }

    #[test]
    fn test_status_consolidation_falls_back_per_field() {
        // Email only matches a record with empty status, dni matches one with
        // a real status: consolidation skips the empty value
        let engine = LeadMatchingEngine::new();
        let lead = create_test_lead("11111111", "ana@x.com", "", None);
        let crm = vec![
            create_crm_lead("c1", "", "ana@x.com", "", "MBA", "", date(2024, 2, 1)),
            create_crm_lead(
                "c2",
                "11111111",
                "",
                "",
                "MBA",
                "Contactado",
                date(2024, 1, 1),
            ),
        ];

        let result = engine.match_lead(&lead, &crm);
        assert_eq!(result.match_type, MatchType::Email);
        assert_eq!(result.status.as_deref(), Some("Contactado"));
    }

    #[test]
    fn test_fallback_status_and_classification() {
        // Phone-only match against a record with empty status/classification
        let engine = LeadMatchingEngine::new();
        let lead = create_test_lead("", "", "987654321", None);
        let mut crm_lead =
            create_crm_lead("c1", "", "", "987654321", "MBA", "", date(2024, 1, 1));
        crm_lead.classification = String::new();

        let result = engine.match_lead(&lead, &[crm_lead]);

        assert!(result.is_present);
        assert_eq!(result.match_type, MatchType::Phone);
        assert_eq!(result.status.as_deref(), Some(FALLBACK_STATUS));
        assert_eq!(
            result.classification.as_deref(),
            Some(FALLBACK_CLASSIFICATION)
        );
        assert_eq!(result.crm_created_date, Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_latest_value_tie_keeps_first_encountered() {
        let engine = LeadMatchingEngine::new();
        let lead = create_test_lead("", "ana@x.com", "", None);
        let same_day = date(2024, 1, 15);
        let crm = vec![
            create_crm_lead("c1", "", "ana@x.com", "", "MBA", "Primero", same_day),
            create_crm_lead("c2", "", "ana@x.com", "", "MBA", "Segundo", same_day),
        ];

        let result = engine.match_lead(&lead, &crm);
        assert_eq!(result.status.as_deref(), Some("Primero"));
    }

    #[test]
    fn test_empty_identity_fields_never_match() {
        let engine = LeadMatchingEngine::new();
        let lead = create_test_lead("", "", "123", None);
        let crm = vec![create_crm_lead(
            "c1",
            "",
            "",
            "",
            "MBA",
            "Nuevo",
            date(2024, 1, 1),
        )];

        let result = engine.match_lead(&lead, &crm);
        assert!(!result.is_present);
        assert_eq!(result.match_type, MatchType::None);
    }
}
