// 📤 Flat Export - one report row per processed lead
// Mirrors the layout the reporting side already consumes (CSV or JSON)

use crate::entities::ProcessedLead;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::path::Path;

// ============================================================================
// EXPORT ROW
// ============================================================================

/// One flattened report row. Column names are the ones the reporting side
/// expects, normalized identity values override the raw ones.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
    pub dni: String,
    pub email: String,
    pub telefono: String,
    #[serde(rename = "Nombre_Completo")]
    pub nombre_completo: String,
    #[serde(rename = "Programa")]
    pub programa: Option<String>,
    #[serde(rename = "Formulario")]
    pub formulario: Option<String>,
    #[serde(rename = "Presente en el CRM")]
    pub presente_en_crm: String,
    #[serde(rename = "No_Cumple_perfil")]
    pub no_cumple_perfil: String,
    #[serde(rename = "Motivo_No_Perfil")]
    pub motivo_no_perfil: Option<String>,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Clasificacion")]
    pub clasificacion: String,
    #[serde(rename = "Fecha_Agencia")]
    pub fecha_agencia: String,
    #[serde(rename = "Fecha_Tuberia")]
    pub fecha_tuberia: Option<String>,
    #[serde(rename = "Dias_Diferencia")]
    pub dias_diferencia: Option<i64>,
}

/// Flatten the processed sequence, preserving its order.
pub fn build_export_rows(processed_leads: &[ProcessedLead]) -> Vec<ExportRow> {
    processed_leads.iter().map(build_row).collect()
}

fn build_row(processed: &ProcessedLead) -> ExportRow {
    let lead = &processed.lead;
    let fecha_agencia = lead.created_time;
    let fecha_tuberia = processed.match_result.crm_created_date;

    ExportRow {
        dni: lead.dni.value().to_string(),
        email: lead.email.value().to_string(),
        telefono: lead.phone.value().to_string(),
        nombre_completo: lead.full_name.clone(),
        programa: lead.program.clone(),
        formulario: lead.form_name.clone(),
        presente_en_crm: if processed.is_present_in_crm() {
            "Presente en el CRM".to_string()
        } else {
            "No presente en el CRM".to_string()
        },
        no_cumple_perfil: if processed.meets_profile() {
            "Cumple perfil".to_string()
        } else {
            "No cumple perfil".to_string()
        },
        motivo_no_perfil: processed.profile_validation.reason.clone(),
        status: processed.status().to_string(),
        clasificacion: processed.classification().to_string(),
        fecha_agencia: format_date(fecha_agencia),
        fecha_tuberia: fecha_tuberia.map(format_date),
        dias_diferencia: fecha_tuberia.map(|crm| day_difference(fecha_agencia, crm)),
    }
}

fn format_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Rounded difference in days between the agency date and the CRM date.
fn day_difference(agency: DateTime<Utc>, crm: DateTime<Utc>) -> i64 {
    let seconds = (agency - crm).num_seconds() as f64;
    (seconds / 86_400.0).round() as i64
}

// ============================================================================
// WRITERS
// ============================================================================

pub fn write_export_csv(path: &Path, rows: &[ExportRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("Failed to write export row")?;
    }
    writer.flush().context("Failed to flush export file")?;
    Ok(())
}

pub fn write_export_json(path: &Path, rows: &[ExportRow]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    serde_json::to_writer_pretty(file, rows).context("Failed to write export JSON")?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
