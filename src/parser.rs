// 📥 CSV Ingestion - column mapping + per-row skip semantics
// A bad row is recorded and skipped; the run never aborts on one record

use crate::entities::{CrmLead, CrmLeadData, Lead, LeadData};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;
use uuid::Uuid;

// ============================================================================
// COLUMN MAPPING
// ============================================================================

/// Maps the logical agency fields onto the export's header names.
///
/// The agency files change header names between campaigns, so the mapping
/// ships alongside the validation config instead of being hardcoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub dni: String,
    pub email: String,
    pub phone: String,
    pub full_name: String,
    pub created_time: String,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub education_level: Option<String>,
    #[serde(default)]
    pub sunedu_registered: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
}

impl ColumnMapping {
    /// Load a column mapping from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read column mapping: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse column mapping JSON")
    }
}

// ============================================================================
// PARSE OUTCOME
// ============================================================================

/// Parsed records plus the headers seen and the rows that were skipped.
#[derive(Debug)]
pub struct ParseOutcome<T> {
    pub records: Vec<T>,
    pub headers: Vec<String>,
    pub errors: Vec<String>,
}

// ============================================================================
// AGENCY FILE
// ============================================================================

/// Parse the agency export.
///
/// Each parsed row gets a fresh UUID. Rows missing a required field, with an
/// unparseable date or a negative experience are reported in
/// `ParseOutcome::errors` and skipped.
pub fn parse_agency_csv(path: &Path, mapping: &ColumnMapping) -> Result<ParseOutcome<Lead>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open agency file: {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read agency headers")?
        .iter()
        .map(str::to_string)
        .collect();
    let index = build_header_index(&headers);

    let mut records = Vec::new();
    let mut errors = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(row, error = %e, "skipping malformed agency row");
                errors.push(format!("row {}: {}", row, e));
                continue;
            }
        };

        let outcome = map_agency_row(&record, &index, mapping)
            .and_then(|data| Lead::new(Uuid::new_v4().to_string(), data));
        match outcome {
            Ok(lead) => records.push(lead),
            Err(e) => {
                warn!(row, error = %e, "skipping agency row");
                errors.push(format!("row {}: {}", row, e));
            }
        }
    }

    Ok(ParseOutcome {
        records,
        headers,
        errors,
    })
}

fn map_agency_row(
    record: &StringRecord,
    index: &HashMap<String, usize>,
    mapping: &ColumnMapping,
) -> Result<LeadData> {
    let get = |column: &str| cell(record, index, column);
    let get_mapped = |column: &Option<String>| column.as_deref().map(&get).unwrap_or_default();
    let get_any = |columns: &[&str]| {
        columns
            .iter()
            .map(|c| get(c))
            .find(|v| !v.is_empty())
            .unwrap_or_default()
    };

    let dni = get(&mapping.dni);
    let email = get(&mapping.email);
    let phone = get(&mapping.phone);
    let full_name = get(&mapping.full_name);
    let created_raw = get(&mapping.created_time);

    if dni.is_empty() || email.is_empty() || full_name.is_empty() || created_raw.is_empty() {
        bail!("missing required fields: dni, email, full name or created time");
    }

    let created_time = parse_datetime(&created_raw)
        .ok_or_else(|| anyhow::anyhow!("unrecognized created time: {:?}", created_raw))?;

    // Blank or unparseable experience cells count as "not provided"; negative
    // values surface as a construction error when the Lead is built
    let experience = match mapping.experience.as_deref() {
        Some(column) => {
            let raw = get(column);
            let years = raw.parse::<f64>().unwrap_or(0.0);
            (years != 0.0).then_some(years)
        }
        None => None,
    };

    let sunedu_registered = mapping
        .sunedu_registered
        .as_deref()
        .map(|column| get(column) == "1");

    Ok(LeadData {
        dni,
        email,
        phone,
        full_name,
        created_time,
        experience,
        education_level: non_empty(get_mapped(&mapping.education_level)),
        sunedu_registered,
        program: non_empty(get_mapped(&mapping.program)),
        // Attribution columns keep their exported names across campaigns
        ad_name: non_empty(get_any(&["ad_name", "adName"])),
        adset_name: non_empty(get_any(&["adset_name", "adsetName"])),
        campaign_id: non_empty(get_any(&["campaign_id", "campaignId"])),
        campaign_name: non_empty(get_any(&["campaign_name", "campaignName"])),
        form_id: non_empty(get_any(&["form_id", "formId"])),
        form_name: non_empty(get_any(&["form_name", "formName"])),
        ad_id: non_empty(get_any(&["ad_id", "adId"])),
        adset_id: non_empty(get_any(&["adset_id", "adsetId"])),
        is_organic: {
            let raw = get_any(&["is_organic", "isOrganic"]);
            (!raw.is_empty()).then(|| raw == "true")
        },
        platform: non_empty(get("platform")),
        lead_status: non_empty(get_any(&["lead_status", "leadStatus"])),
        utm_campaign_medium: non_empty(get_any(&["utm_campaign_medium", "utmCampaignMedium"])),
    })
}

// ============================================================================
// CRM FILE
// ============================================================================

/// Header aliases for the CRM export, which arrives with Spanish or English
/// headers depending on which system produced it.
const CRM_DNI_COLUMNS: [&str; 4] = ["N° de documento", "DNI", "dni", "numero_documento"];
const CRM_EMAIL_COLUMNS: [&str; 4] = ["Correo electrónico", "email", "Email", "correo"];
const CRM_PHONE_COLUMNS: [&str; 4] = ["Teléfono", "telefono", "Telefono", "phone"];
const CRM_NAME_COLUMNS: [&str; 4] = ["Nombre completo", "Nombre", "full_name", "name"];
const CRM_STATUS_COLUMNS: [&str; 4] = ["Estado", "estado", "Status", "status"];
const CRM_CLASSIFICATION_COLUMNS: [&str; 4] = [
    "Nombre de clasificación",
    "clasificacion",
    "Classification",
    "classification",
];
const CRM_PROGRAM_COLUMNS: [&str; 5] = [
    "Abreviatura",
    "abreviatura",
    "Programa",
    "programa",
    "program",
];
const CRM_CREATED_COLUMNS: [&str; 4] = [
    "Fecha de creación de oportunidad potencial",
    "fecha_creacion",
    "created_date",
    "Created Date",
];
const CRM_UTM_COLUMNS: [&str; 4] = ["UTM Campaign Medium", "utm_campaign_medium", "utm", "UTM"];

/// Parse the CRM export. No mapping needed: headers are matched against the
/// known alias lists per field.
pub fn parse_crm_csv(path: &Path) -> Result<ParseOutcome<CrmLead>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CRM file: {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CRM headers")?
        .iter()
        .map(str::to_string)
        .collect();
    let index = build_header_index(&headers);

    let mut records = Vec::new();
    let mut errors = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(row, error = %e, "skipping malformed CRM row");
                errors.push(format!("row {}: {}", row, e));
                continue;
            }
        };

        match map_crm_row(&record, &index) {
            Ok(data) => records.push(CrmLead::new(Uuid::new_v4().to_string(), data)),
            Err(e) => {
                warn!(row, error = %e, "skipping CRM row");
                errors.push(format!("row {}: {}", row, e));
            }
        }
    }

    Ok(ParseOutcome {
        records,
        headers,
        errors,
    })
}

fn map_crm_row(record: &StringRecord, index: &HashMap<String, usize>) -> Result<CrmLeadData> {
    let get_any = |columns: &[&str]| {
        columns
            .iter()
            .map(|c| cell(record, index, c))
            .find(|v| !v.is_empty())
            .unwrap_or_default()
    };

    let dni = get_any(&CRM_DNI_COLUMNS);
    let email = get_any(&CRM_EMAIL_COLUMNS);
    if dni.is_empty() || email.is_empty() {
        bail!("missing required CRM fields: dni or email");
    }

    let created_raw = get_any(&CRM_CREATED_COLUMNS);
    let created_date = parse_datetime(&created_raw)
        .ok_or_else(|| anyhow::anyhow!("unrecognized created date: {:?}", created_raw))?;

    let status = get_any(&CRM_STATUS_COLUMNS);
    let classification = get_any(&CRM_CLASSIFICATION_COLUMNS);
    let program = get_any(&CRM_PROGRAM_COLUMNS);
    let full_name = get_any(&CRM_NAME_COLUMNS);

    Ok(CrmLeadData {
        dni,
        email,
        phone: get_any(&CRM_PHONE_COLUMNS),
        full_name: if full_name.is_empty() {
            "Sin nombre".to_string()
        } else {
            full_name
        },
        status: if status.is_empty() {
            "Sin estado".to_string()
        } else {
            status
        },
        classification: if classification.is_empty() {
            "Sin clasificación".to_string()
        } else {
            classification
        },
        program: if program.is_empty() {
            "Sin programa".to_string()
        } else {
            program
        },
        created_date,
        utm_campaign_medium: non_empty(get_any(&CRM_UTM_COLUMNS)),
    })
}

// ============================================================================
// HELPERS
// ============================================================================

fn build_header_index(headers: &[String]) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_string(), i))
        .collect()
}

fn cell(record: &StringRecord, index: &HashMap<String, usize>, column: &str) -> String {
    index
        .get(column)
        .and_then(|&i| record.get(i))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Parse spreadsheet dates; day-first formats take precedence over US ones,
/// matching the locale of the source exports.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
        }
    }

    None
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn mapping() -> ColumnMapping {
        ColumnMapping {
            dni: "documento".to_string(),
            email: "correo".to_string(),
            phone: "celular".to_string(),
            full_name: "nombre".to_string(),
            created_time: "fecha".to_string(),
            experience: Some("experiencia".to_string()),
            education_level: Some("nivel".to_string()),
            sunedu_registered: Some("sunedu".to_string()),
            program: Some("programa".to_string()),
        }
    }

    fn write_temp_csv(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("lead-recon-test-{}", name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_agency_csv_maps_and_normalizes() {
        let path = write_temp_csv(
            "agency-ok.csv",
            "documento,correo,celular,nombre,fecha,experiencia,nivel,sunedu,programa,form_name\n\
             12345678,ana@x.com,051987654321,Ana Torres,2024-03-01 10:30:00,3,Bachiller,1,MBA,Form Marzo\n",
        );

        let outcome = parse_agency_csv(&path, &mapping()).unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.errors.is_empty());
        let lead = &outcome.records[0];
        assert_eq!(lead.dni.value(), "12345678");
        assert_eq!(lead.phone.value(), "987654321");
        assert_eq!(lead.experience.unwrap().years(), 3);
        assert_eq!(lead.sunedu_registered, Some(true));
        assert_eq!(lead.form_name.as_deref(), Some("Form Marzo"));
        assert!(!lead.id.is_empty());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_agency_csv_skips_bad_rows_and_continues() {
        let path = write_temp_csv(
            "agency-bad.csv",
            "documento,correo,celular,nombre,fecha,experiencia\n\
             ,ana@x.com,987654321,Ana,2024-03-01,2\n\
             22222222,luis@x.com,987111222,Luis,not-a-date,2\n\
             33333333,rosa@x.com,987333444,Rosa,2024-03-02,-1\n\
             44444444,juan@x.com,987555666,Juan,2024-03-03,4\n",
        );

        let outcome = parse_agency_csv(&path, &mapping()).unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].full_name, "Juan");
        assert_eq!(outcome.errors.len(), 3);
        assert!(outcome.errors[0].starts_with("row 1:"));
        assert!(outcome.errors[1].contains("unrecognized created time"));
        assert!(outcome.errors[2].contains("negative"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_agency_empty_experience_is_absent() {
        let path = write_temp_csv(
            "agency-exp.csv",
            "documento,correo,celular,nombre,fecha,experiencia\n\
             12345678,ana@x.com,987654321,Ana,2024-03-01,\n",
        );

        let outcome = parse_agency_csv(&path, &mapping()).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.records[0].experience.is_none());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_crm_csv_resolves_spanish_headers_and_defaults() {
        let path = write_temp_csv(
            "crm-ok.csv",
            "N° de documento,Correo electrónico,Teléfono,Estado,Abreviatura,Fecha de creación de oportunidad potencial\n\
             87654321,luis@x.com,051987111222,Nuevo,MBA,10/01/2024\n",
        );

        let outcome = parse_crm_csv(&path).unwrap();

        assert_eq!(outcome.records.len(), 1);
        let crm = &outcome.records[0];
        assert_eq!(crm.dni.value(), "87654321");
        assert_eq!(crm.phone.value(), "987111222");
        assert_eq!(crm.status, "Nuevo");
        assert_eq!(crm.program, "MBA");
        // Unmapped fields fall back to their Spanish defaults
        assert_eq!(crm.full_name, "Sin nombre");
        assert_eq!(crm.classification, "Sin clasificación");
        assert!(crm.utm_campaign_medium.is_none());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_crm_csv_requires_dni_and_email() {
        let path = write_temp_csv(
            "crm-bad.csv",
            "dni,email,created_date\n\
             ,luis@x.com,2024-01-10\n\
             87654321,,2024-01-10\n",
        );

        let outcome = parse_crm_csv(&path).unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.errors.len(), 2);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert!(parse_datetime("2024-03-01 10:30:00").is_some());
        assert!(parse_datetime("2024-03-01T10:30:00+00:00").is_some());
        assert!(parse_datetime("2024-03-01").is_some());
        assert!(parse_datetime("01/03/2024").is_some());
        assert!(parse_datetime("garbage").is_none());

        // Day-first parsing wins for ambiguous dates
        let parsed = parse_datetime("05/03/2024").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
    }
}
