use crate::client::{SubmissionClient, SubmissionResponse};
use crate::config::RosterConfig;
use crate::core::{
    check_layout_drift, extract_rows, partition_by_group, resolve_anchor, AnchorTier,
};
use crate::error::{RosterError, RosterResult};
use crate::excel::{
    attach_caller_context, export_file_name, import_workbook, read_workbook, TemplateComposer,
};
use crate::types::{DomainRecord, FIELD_GROUP};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Caller-owned identity attached to every batch.
pub struct CallerContext {
    pub institution_id: i64,
    pub institution_name: String,
    pub period: String,
}

fn load_config(path: Option<&Path>) -> RosterResult<RosterConfig> {
    match path {
        Some(p) => RosterConfig::load(p),
        None => Ok(RosterConfig::default()),
    }
}

/// Execute the import command: workbook → coerced records → one batch call.
pub fn import(
    file: PathBuf,
    endpoint: String,
    token: String,
    caller: CallerContext,
    config_path: Option<PathBuf>,
    dry_run: bool,
) -> RosterResult<()> {
    println!("{}", "📥 Rosterbook - Importing workbook".bold().green());
    println!("   File: {}", file.display());
    println!("   Period: {}", caller.period);
    println!();

    if dry_run {
        println!("{}", "📋 DRY RUN MODE - Nothing will be submitted\n".yellow());
    }

    let config = load_config(config_path.as_deref())?;
    let mut report = import_workbook(&file, &config)?;

    for diagnostic in &report.diagnostics {
        println!("   {} {}", "⚠".yellow(), diagnostic);
    }
    println!(
        "   Extracted {} record(s) from {} sheet(s), {} row(s) skipped",
        report.records.len().to_string().cyan(),
        report.sheets_read,
        report.skipped_rows
    );

    if report.records.is_empty() {
        println!("{}", "⚠ Nothing to submit".yellow().bold());
        return Ok(());
    }

    attach_caller_context(&mut report.records, caller.institution_id, &caller.period);

    if dry_run {
        println!("{}", "✅ Dry run complete".bold().green());
        return Ok(());
    }

    let client = SubmissionClient::new(endpoint, token);
    match client.submit_batch(&report.records, "create")? {
        SubmissionResponse::Stored(stored) => {
            info!(stored = stored.len(), "batch accepted");
            println!(
                "{}",
                format!("✅ Stored {} record(s)", stored.len()).bold().green()
            );
            Ok(())
        }
        SubmissionResponse::Invalid(errors) => {
            println!("{}", "❌ The store rejected the batch:".bold().red());
            for (field, messages) in &errors {
                for message in messages {
                    println!("   {}: {}", field.red(), message);
                }
            }
            Err(RosterError::RemoteValidation(errors.len()))
        }
    }
}

/// Execute the export command: stored records → partitioned template sheets.
#[allow(clippy::too_many_arguments)]
pub fn export(
    template: PathBuf,
    endpoint: String,
    token: String,
    caller: CallerContext,
    out_dir: PathBuf,
    form_tag: String,
    records_file: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> RosterResult<()> {
    println!("{}", "📤 Rosterbook - Composing export".bold().green());
    println!("   Template: {}", template.display());
    println!();

    let config = load_config(config_path.as_deref())?;

    let records: Vec<DomainRecord> = match records_file {
        Some(path) => {
            let text = fs::read_to_string(&path)?;
            serde_json::from_str(&text)
                .map_err(|e| RosterError::Config(format!("records file: {}", e)))?
        }
        None => {
            let client = SubmissionClient::new(endpoint, token);
            client.fetch_records(caller.institution_id, &caller.period)?
        }
    };
    println!("   {} record(s) to export", records.len().to_string().cyan());

    let buckets = partition_by_group(records, FIELD_GROUP, &config.group_exclusions);
    let composer = TemplateComposer::from_path(&template)?;
    let (bytes, report) = composer.compose(&buckets, &config)?;

    for diagnostic in &report.diagnostics {
        println!("   {} {}", "⚠".yellow(), diagnostic);
    }

    let file_name = export_file_name(
        caller.institution_id,
        &caller.institution_name,
        &form_tag,
        chrono::Local::now().date_naive(),
    );
    let out_path = out_dir.join(file_name);
    fs::write(&out_path, bytes)?;

    println!(
        "{}",
        format!(
            "✅ Wrote {} row(s) across {} sheet(s) to {}",
            report.rows_written,
            report.sheets_written.len(),
            out_path.display()
        )
        .bold()
        .green()
    );
    Ok(())
}

/// Execute the inspect command: show how each sheet would be read.
pub fn inspect(file: PathBuf, config_path: Option<PathBuf>) -> RosterResult<()> {
    println!("{}", "🔍 Rosterbook - Inspecting workbook".bold().green());
    println!("   File: {}", file.display());
    println!();

    let config = load_config(config_path.as_deref())?;
    let layout = config.layout()?;
    let ctx = config.coercion_context();
    let grids = read_workbook(&file)?;

    for grid in &grids {
        println!("   📄 Sheet: {}", grid.name.bright_blue().bold());
        if grid.is_blank() {
            println!("      {}", "empty sheet".yellow());
            continue;
        }
        let anchor = resolve_anchor(grid, &config.anchor);
        println!(
            "      data starts at row {} ({:?})",
            anchor.data_start.to_string().cyan(),
            anchor.tier
        );
        if anchor.tier == AnchorTier::HeaderKeyword {
            if let Some(detail) = check_layout_drift(grid, anchor.data_start, layout) {
                println!("      {} {}", "⚠ layout drift:".yellow(), detail);
            }
        }
        let extraction = extract_rows(grid, anchor.data_start, layout, &ctx);
        println!(
            "      {} record(s), {} row(s) skipped",
            extraction.records.len(),
            extraction.skipped_rows
        );
    }
    Ok(())
}
