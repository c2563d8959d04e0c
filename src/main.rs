use anyhow::Result;
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use lead_reconciliation::{
    build_export_rows, parse_agency_csv, parse_crm_csv, write_export_csv, ColumnMapping,
    LeadProcessingEngine, ValidationConfig,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 4 {
        eprintln!(
            "Usage: {} <agency.csv> <crm.csv> <mapping.json> [validation.json] [export.csv]",
            args.first().map(String::as_str).unwrap_or("lead-reconciliation")
        );
        std::process::exit(1);
    }

    run(
        Path::new(&args[1]),
        Path::new(&args[2]),
        Path::new(&args[3]),
        args.get(4).map(Path::new),
        args.get(5).map(Path::new),
    )
}

fn run(
    agency_path: &Path,
    crm_path: &Path,
    mapping_path: &Path,
    validation_path: Option<&Path>,
    export_path: Option<&Path>,
) -> Result<()> {
    println!("📋 Lead Reconciliation - Agencia vs CRM");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mapping = ColumnMapping::from_file(mapping_path)?;
    let validation = match validation_path {
        Some(path) => ValidationConfig::from_file(path)?,
        None => ValidationConfig::default(),
    };

    // 1. Load both datasets
    println!("\n📂 Loading agency leads...");
    let agency = parse_agency_csv(agency_path, &mapping)?;
    println!(
        "✓ Loaded {} agency leads ({} rows skipped)",
        agency.records.len(),
        agency.errors.len()
    );
    for error in &agency.errors {
        eprintln!("  ⚠ {}", error);
    }

    println!("\n📂 Loading CRM leads...");
    let crm = parse_crm_csv(crm_path)?;
    println!(
        "✓ Loaded {} CRM leads ({} rows skipped)",
        crm.records.len(),
        crm.errors.len()
    );
    for error in &crm.errors {
        eprintln!("  ⚠ {}", error);
    }

    // 2. Reconcile
    println!("\n🔎 Reconciling...");
    let engine = LeadProcessingEngine::new();
    let result = engine.process(&agency.records, &crm.records, &validation);
    let summary = &result.summary;

    // 3. Report
    println!("\n📊 Resumen");
    println!("  Leads agencia:        {}", summary.total_leads);
    println!("  Presentes en CRM:     {}", summary.present_in_crm);
    println!("  Leads faltantes:      {}", summary.missing_leads);
    println!("  Cumplen perfil:       {}", summary.meets_profile);
    println!(
        "  Duplicados:           {} (DNI: {}, Email: {}, ambos: {})",
        summary.duplicates.total_duplicates,
        summary.duplicates.by_dni,
        summary.duplicates.by_email,
        summary.duplicates.by_dni_and_email
    );
    println!(
        "  CRM:                  {} leads, {} con UTM",
        summary.crm_stats.total_crm_leads, summary.crm_stats.crm_leads_with_utm
    );

    println!("\n  Distribución de estados:");
    for (status, count) in &summary.status_distribution {
        println!("    {:<30} {}", status, count);
    }

    if !summary.form_distribution.is_empty() {
        println!("\n  Distribución por formulario:");
        for (form, count) in &summary.form_distribution {
            println!("    {:<30} {}", form, count);
        }
    }

    // 4. Export
    if let Some(path) = export_path {
        let rows = build_export_rows(&result.processed_leads);
        write_export_csv(path, &rows)?;
        println!("\n💾 Export written to {}", path.display());
    }

    Ok(())
}
