// 🧩 Profile Validation - configurable eligibility rule sets
// One rule variant is selected per run; unknown variants keep every lead eligible

use crate::entities::{Lead, ProfileValidationResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// VALIDATION CONFIG
// ============================================================================

fn default_minimum_experience() -> u32 {
    1
}

fn default_invalid_education_levels() -> Vec<String> {
    [
        "egresado",
        "tecnico",
        "técnico",
        "estudiante",
        "3ero de secundaria",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Eligibility rule set, selected by the `type` tag of the config JSON.
///
/// Each variant carries only the fields its rule needs. An unrecognized tag
/// deserializes to `Unknown`, which accepts every lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationConfig {
    /// Every lead is eligible.
    None,

    /// Reject invalid education levels, then insufficient experience.
    EducationExperience {
        #[serde(
            rename = "minimumExperience",
            default = "default_minimum_experience"
        )]
        minimum_experience: u32,
        #[serde(
            rename = "invalidEducationLevels",
            default = "default_invalid_education_levels"
        )]
        invalid_education_levels: Vec<String>,
    },

    /// Require a positive SUNEDU registration flag.
    SuneduRegistration,

    /// Catch-all for unrecognized rule sets.
    #[serde(other)]
    Unknown,
}

impl ValidationConfig {
    /// Load a validation config from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read validation config: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse validation config JSON")
    }

    /// Education/experience rule with the default thresholds.
    pub fn education_experience() -> Self {
        ValidationConfig::EducationExperience {
            minimum_experience: default_minimum_experience(),
            invalid_education_levels: default_invalid_education_levels(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig::None
    }
}

// ============================================================================
// VALIDATION ENGINE
// ============================================================================

/// Applies the configured rule set to a single lead.
pub struct ProfileValidationEngine;

impl ProfileValidationEngine {
    pub fn new() -> Self {
        ProfileValidationEngine
    }

    pub fn validate(&self, lead: &Lead, config: &ValidationConfig) -> ProfileValidationResult {
        match config {
            ValidationConfig::None | ValidationConfig::Unknown => {
                ProfileValidationResult::eligible()
            }
            ValidationConfig::EducationExperience {
                minimum_experience,
                invalid_education_levels,
            } => self.validate_education_and_experience(
                lead,
                *minimum_experience,
                invalid_education_levels,
            ),
            ValidationConfig::SuneduRegistration => self.validate_sunedu_registration(lead),
        }
    }

    fn validate_education_and_experience(
        &self,
        lead: &Lead,
        minimum_experience: u32,
        invalid_education_levels: &[String],
    ) -> ProfileValidationResult {
        // The experience cutoff only applies when an education level came in;
        // rows without one stay eligible
        if let Some(level) = lead.education_level.as_deref().filter(|l| !l.is_empty()) {
            // Accent-insensitive: the exports mix "tecnico" and "técnico"
            let level_folded = fold_for_match(level);
            let invalid = invalid_education_levels
                .iter()
                .any(|inv| level_folded.contains(&fold_for_match(inv)));
            if invalid {
                return ProfileValidationResult::rejected(format!(
                    "Nivel educativo no válido: {}",
                    level
                ));
            }

            if let Some(experience) = &lead.experience {
                if experience.years() <= minimum_experience {
                    return ProfileValidationResult::rejected(format!(
                        "Experiencia insuficiente: {} años (mínimo: {})",
                        experience.years(),
                        minimum_experience
                    ));
                }
            }
        }

        ProfileValidationResult::eligible()
    }

    fn validate_sunedu_registration(&self, lead: &Lead) -> ProfileValidationResult {
        match lead.sunedu_registered {
            None => ProfileValidationResult::rejected(
                "Información de registro SUNEDU no disponible",
            ),
            Some(false) => ProfileValidationResult::rejected("No registrado en SUNEDU"),
            Some(true) => ProfileValidationResult::eligible(),
        }
    }
}

impl Default for ProfileValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase + strip Spanish accents for substring comparison.
fn fold_for_match(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            _ => c,
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
