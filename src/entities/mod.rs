// Entity Models - the records flowing through the reconciliation engine
//
// Each entity is constructed once from raw row values (identity normalization
// happens inside construction) and is never mutated afterwards.

pub mod crm_lead;
pub mod lead;
pub mod processed;

pub use crm_lead::{CrmLead, CrmLeadData};
pub use lead::{Lead, LeadData};
pub use processed::{MatchResult, MatchType, ProcessedLead, ProfileValidationResult};
