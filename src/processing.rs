// 🔄 Lead Processing Engine - one pass over the agency set, then aggregation
// Output order mirrors agency input order; per-lead work is independent

use crate::deduplication::DuplicateDetectionEngine;
use crate::entities::{CrmLead, Lead, ProcessedLead};
use crate::matching::LeadMatchingEngine;
use crate::validation::{ProfileValidationEngine, ValidationConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

// ============================================================================
// SUMMARY
// ============================================================================

/// Duplicate counters as reported to the export layer.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateStats {
    #[serde(rename = "byDni")]
    pub by_dni: usize,
    #[serde(rename = "byEmail")]
    pub by_email: usize,
    #[serde(rename = "byDniAndEmail")]
    pub by_dni_and_email: usize,
    #[serde(rename = "totalDuplicates")]
    pub total_duplicates: usize,
}

/// CRM-side counters.
#[derive(Debug, Clone, Serialize)]
pub struct CrmStats {
    #[serde(rename = "totalCRMLeads")]
    pub total_crm_leads: usize,
    #[serde(rename = "crmLeadsWithUTM")]
    pub crm_leads_with_utm: usize,
}

/// Aggregated reporting record over the full processed set.
///
/// The serialized field names are an interop contract with the downstream
/// reporting layer; do not rename them.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    #[serde(rename = "totalLeads")]
    pub total_leads: usize,
    #[serde(rename = "presentInCRM")]
    pub present_in_crm: usize,
    #[serde(rename = "missingLeads")]
    pub missing_leads: usize,
    #[serde(rename = "meetsProfile")]
    pub meets_profile: usize,
    pub duplicates: DuplicateStats,
    #[serde(rename = "crmStats")]
    pub crm_stats: CrmStats,
    #[serde(rename = "statusDistribution")]
    pub status_distribution: BTreeMap<String, usize>,
    #[serde(rename = "formDistribution")]
    pub form_distribution: BTreeMap<String, usize>,
}

/// Full engine output: the processed sequence plus its summary.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    #[serde(rename = "processedLeads")]
    pub processed_leads: Vec<ProcessedLead>,
    pub summary: Summary,
}

// ============================================================================
// PROCESSING ENGINE
// ============================================================================

/// Wires matcher, validator and duplicate detector into a single run.
pub struct LeadProcessingEngine {
    matching: LeadMatchingEngine,
    validation: ProfileValidationEngine,
    duplicates: DuplicateDetectionEngine,
}

impl LeadProcessingEngine {
    pub fn new() -> Self {
        LeadProcessingEngine {
            matching: LeadMatchingEngine::new(),
            validation: ProfileValidationEngine::new(),
            duplicates: DuplicateDetectionEngine::new(),
        }
    }

    /// Process every agency lead against the CRM set.
    ///
    /// Synchronous and side-effect free; each lead only reads the shared CRM
    /// collection, so the processed sequence always mirrors the input order.
    pub fn process(
        &self,
        agency_leads: &[Lead],
        crm_leads: &[CrmLead],
        config: &ValidationConfig,
    ) -> ProcessingResult {
        info!(
            agency_leads = agency_leads.len(),
            crm_leads = crm_leads.len(),
            "processing agency leads against CRM"
        );

        let mut processed_leads = Vec::with_capacity(agency_leads.len());
        for lead in agency_leads {
            let match_result = self.matching.match_lead(lead, crm_leads);
            let profile_validation = self.validation.validate(lead, config);
            processed_leads.push(ProcessedLead::new(
                lead.clone(),
                match_result,
                profile_validation,
            ));
        }

        let summary = self.summarize(agency_leads, &processed_leads, crm_leads);
        debug!(
            present = summary.present_in_crm,
            missing = summary.missing_leads,
            duplicates = summary.duplicates.total_duplicates,
            "run summary ready"
        );

        ProcessingResult {
            processed_leads,
            summary,
        }
    }

    fn summarize(
        &self,
        agency_leads: &[Lead],
        processed_leads: &[ProcessedLead],
        crm_leads: &[CrmLead],
    ) -> Summary {
        let total_leads = processed_leads.len();
        let present_in_crm = processed_leads
            .iter()
            .filter(|p| p.is_present_in_crm())
            .count();
        let missing_leads = processed_leads
            .iter()
            .filter(|p| p.is_missing_lead())
            .count();
        let meets_profile = processed_leads.iter().filter(|p| p.meets_profile()).count();

        let duplicate_info = self.duplicates.detect(agency_leads);

        let mut status_distribution: BTreeMap<String, usize> = BTreeMap::new();
        for processed in processed_leads {
            *status_distribution
                .entry(processed.status().to_string())
                .or_default() += 1;
        }

        let mut form_distribution: BTreeMap<String, usize> = BTreeMap::new();
        for processed in processed_leads {
            if let Some(form) = processed
                .lead
                .form_name
                .as_deref()
                .filter(|f| !f.is_empty())
            {
                *form_distribution.entry(form.to_string()).or_default() += 1;
            }
        }

        Summary {
            total_leads,
            present_in_crm,
            missing_leads,
            meets_profile,
            duplicates: DuplicateStats {
                by_dni: duplicate_info.by_dni,
                by_email: duplicate_info.by_email,
                by_dni_and_email: duplicate_info.by_dni_and_email,
                total_duplicates: duplicate_info.total_duplicates,
            },
            crm_stats: CrmStats {
                total_crm_leads: crm_leads.len(),
                crm_leads_with_utm: crm_leads.iter().filter(|c| c.has_utm_tracking()).count(),
            },
            status_distribution,
            form_distribution,
        }
    }
}

impl Default for LeadProcessingEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
