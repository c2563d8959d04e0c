// 🗂️ CRM Lead - one row of the CRM ("Tubería") export

use crate::identity::{Dni, Email, PhoneNumber};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw field values for one CRM row, before normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct CrmLeadData {
    pub dni: String,
    pub email: String,
    pub phone: String,
    pub full_name: String,
    pub status: String,
    pub classification: String,
    pub program: String,
    pub created_date: DateTime<Utc>,
    pub utm_campaign_medium: Option<String>,
}

/// A record already present in the internal sales pipeline.
///
/// Same immutability discipline as [`crate::entities::Lead`]; construction
/// never fails because CRM identity fields only degrade to empty values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmLead {
    pub id: String,
    pub dni: Dni,
    pub email: Email,
    pub phone: PhoneNumber,
    pub full_name: String,
    pub status: String,
    pub classification: String,
    pub program: String,
    pub created_date: DateTime<Utc>,
    pub utm_campaign_medium: Option<String>,
}

impl CrmLead {
    pub fn new(id: impl Into<String>, data: CrmLeadData) -> Self {
        CrmLead {
            id: id.into(),
            dni: Dni::new(&data.dni),
            email: Email::new(&data.email),
            phone: PhoneNumber::new(&data.phone),
            full_name: data.full_name,
            status: data.status,
            classification: data.classification,
            program: data.program,
            created_date: data.created_date,
            utm_campaign_medium: data.utm_campaign_medium,
        }
    }

    /// Whether this record carries UTM attribution.
    pub fn has_utm_tracking(&self) -> bool {
        self.utm_campaign_medium
            .as_deref()
            .is_some_and(|m| !m.is_empty())
    }
}
