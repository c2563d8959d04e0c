// 🔁 Duplicate Detection Engine - group agency leads by identity keys
// Counts duplicated groups per key and enumerates the offending leads once

use crate::entities::Lead;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Separator for the combined DNI+Email key; not expected in either field.
const PAIR_KEY_SEPARATOR: char = '|';

// ============================================================================
// DUPLICATE INFO
// ============================================================================

/// Duplicate statistics over the full agency set.
///
/// The three counters count duplicated *groups*, not the leads inside them,
/// and `total_duplicates = by_dni + by_email - by_dni_and_email` so a group
/// duplicated on both keys is only counted once.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateInfo {
    pub by_dni: usize,
    pub by_email: usize,
    pub by_dni_and_email: usize,
    pub total_duplicates: usize,
    /// Every lead in a duplicated DNI or Email group, deduplicated by the
    /// DNI+Email pair, in input order.
    pub duplicate_leads: Vec<Lead>,
}

// ============================================================================
// DUPLICATE DETECTION ENGINE
// ============================================================================

/// Single pass over the agency collection; the CRM set plays no part here.
///
/// A lead with an empty DNI groups with every other empty-DNI lead. That is
/// a known data-quality edge case of the source exports, not special-cased.
pub struct DuplicateDetectionEngine;

impl DuplicateDetectionEngine {
    pub fn new() -> Self {
        DuplicateDetectionEngine
    }

    pub fn detect(&self, leads: &[Lead]) -> DuplicateInfo {
        let mut dni_groups: HashMap<&str, usize> = HashMap::new();
        let mut email_groups: HashMap<&str, usize> = HashMap::new();
        let mut pair_groups: HashMap<String, usize> = HashMap::new();

        for lead in leads {
            *dni_groups.entry(lead.dni.value()).or_default() += 1;
            *email_groups.entry(lead.email.value()).or_default() += 1;
            *pair_groups.entry(Self::pair_key(lead)).or_default() += 1;
        }

        let by_dni = dni_groups.values().filter(|&&n| n > 1).count();
        let by_email = email_groups.values().filter(|&&n| n > 1).count();
        let by_dni_and_email = pair_groups.values().filter(|&&n| n > 1).count();

        let duplicated_dnis: HashSet<&str> = dni_groups
            .iter()
            .filter(|(_, &n)| n > 1)
            .map(|(&k, _)| k)
            .collect();
        let duplicated_emails: HashSet<&str> = email_groups
            .iter()
            .filter(|(_, &n)| n > 1)
            .map(|(&k, _)| k)
            .collect();

        let mut seen_pairs: HashSet<String> = HashSet::new();
        let mut duplicate_leads = Vec::new();
        for lead in leads {
            let offending = duplicated_dnis.contains(lead.dni.value())
                || duplicated_emails.contains(lead.email.value());
            if offending && seen_pairs.insert(Self::pair_key(lead)) {
                duplicate_leads.push(lead.clone());
            }
        }

        DuplicateInfo {
            by_dni,
            by_email,
            by_dni_and_email,
            total_duplicates: by_dni + by_email - by_dni_and_email,
            duplicate_leads,
        }
    }

    fn pair_key(lead: &Lead) -> String {
        format!(
            "{}{}{}",
            lead.dni.value(),
            PAIR_KEY_SEPARATOR,
            lead.email.value()
        )
    }
}

impl Default for DuplicateDetectionEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
