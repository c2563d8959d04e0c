// Lead Reconciliation System - Core Library
// Exposes all modules for use in the CLI and tests

pub mod identity;       // Identity value objects (DNI, email, phone, experience)
pub mod entities;       // Lead, CrmLead, ProcessedLead
pub mod matching;       // Cross-dataset lead matcher
pub mod deduplication;  // Duplicate groups over the agency set
pub mod validation;     // Profile eligibility rule sets
pub mod processing;     // Full run: match + validate + summarize
pub mod parser;         // CSV ingestion with column mapping
pub mod export;         // Flat report rows (CSV/JSON)

// Re-export commonly used types
pub use identity::{Dni, Email, Experience, PhoneNumber};
pub use entities::{
    CrmLead, CrmLeadData, Lead, LeadData,
    MatchResult, MatchType, ProcessedLead, ProfileValidationResult,
};
pub use matching::{LeadMatchingEngine, FALLBACK_CLASSIFICATION, FALLBACK_STATUS};
pub use deduplication::{DuplicateDetectionEngine, DuplicateInfo};
pub use validation::{ProfileValidationEngine, ValidationConfig};
pub use processing::{
    CrmStats, DuplicateStats, LeadProcessingEngine, ProcessingResult, Summary,
};
pub use parser::{parse_agency_csv, parse_crm_csv, ColumnMapping, ParseOutcome};
pub use export::{build_export_rows, write_export_csv, write_export_json, ExportRow};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
