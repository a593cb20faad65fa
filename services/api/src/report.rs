//! Offline commands that run against the seeded store and print to stdout.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use kura_workspace::error::AppError;
use kura_workspace::lab::inventory::{
    InventoryQuery, InventoryService, InventoryView, StockStatus,
};
use kura_workspace::lab::patients::{
    ColumnMapping, ImportResult, PatientField, PatientImportService,
};
use kura_workspace::lab::InMemoryLabStore;

use crate::infra::parse_mapping_pair;

#[derive(Args, Debug)]
pub(crate) struct ImportPatientsArgs {
    /// CSV export to import
    #[arg(long)]
    pub(crate) file: PathBuf,
    /// Explicit column mapping as HEADER=FIELD; repeat per column. Without it
    /// the mapping is guessed from the headers.
    #[arg(long, value_parser = parse_mapping_pair)]
    pub(crate) mapping: Vec<(String, PatientField)>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct InventoryArgs {
    /// Only show items whose name, SKU, or category contains this text
    #[arg(long)]
    pub(crate) query: Option<String>,
}

pub(crate) fn run_patient_import(args: ImportPatientsArgs) -> Result<(), AppError> {
    let ImportPatientsArgs { file, mapping } = args;
    let mapping = if mapping.is_empty() {
        None
    } else {
        Some(mapping.into_iter().collect::<ColumnMapping>())
    };

    let service = PatientImportService::new(Arc::new(InMemoryLabStore::seeded()));
    let outcome = service.import_path(&file, mapping)?;
    println!("{}", render_import_result(&file.display().to_string(), &outcome));
    Ok(())
}

pub(crate) fn run_inventory_report(args: InventoryArgs) -> Result<(), AppError> {
    let service = InventoryService::new(Arc::new(InMemoryLabStore::seeded()));
    let items = service.list(&InventoryQuery {
        q: args.query,
        status: None,
    })?;
    println!("{}", render_inventory(&items));
    Ok(())
}

pub(crate) fn render_import_result(source: &str, outcome: &ImportResult) -> String {
    let mut lines = vec![
        format!("Patient import from {source}"),
        format!("  imported: {}", outcome.imported),
        format!("  updated:  {}", outcome.updated),
        format!("  errors:   {}", outcome.errors),
    ];
    if !outcome.details.is_empty() {
        lines.push("Rejected rows".to_string());
        lines.extend(outcome.details.iter().map(|detail| format!("  - {detail}")));
    }
    lines.join("\n")
}

pub(crate) fn render_inventory(items: &[InventoryView]) -> String {
    if items.is_empty() {
        return "No inventory items match.".to_string();
    }

    let name_width = items
        .iter()
        .map(|view| view.item.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Item".len());

    let mut lines = vec![format!(
        "{:<8}  {:<name_width$}  {:>7}  {:>7}  {}",
        "SKU", "Item", "Stock", "Mínimo", "Estado"
    )];
    for view in items {
        let stock = format!("{} {}", view.item.current_stock, view.item.unit);
        lines.push(format!(
            "{:<8}  {:<name_width$}  {:>7}  {:>7}  {}",
            view.item.sku, view.item.name, stock, view.item.min_stock, view.status_label
        ));
    }

    let flagged = items
        .iter()
        .filter(|view| view.status != StockStatus::Ok)
        .count();
    lines.push(format!("{flagged} of {} items need restocking", items.len()));
    lines.join("\n")
}
