use anyhow::{Context, Result};
use comfy_table::Table;
use rates_cli::pipeline::{EnrichRun, EnrichSettings, explain_rate, run_enrich};
use rates_ingest::{crosswalk_version, load_index};
use tracing::info_span;

use crate::cli::{CrosswalkArgs, EnrichArgs, ExplainArgs};
use crate::summary::{apply_table_style, print_explanation};

pub fn run_enrich_command(args: &EnrichArgs) -> Result<EnrichRun> {
    let _span = info_span!("enrich", dir = %args.rates_dir.display()).entered();
    let settings = EnrichSettings {
        rates_dir: args.rates_dir.clone(),
        crosswalk: args.crosswalk.clone(),
        overrides: args.overrides.clone(),
        report: args.report.clone(),
        options: args.matching.options(),
        parallel: args.parallel,
        dry_run: args.dry_run,
        enriched_date: chrono::Local::now().format("%Y-%m-%d").to_string(),
    };
    run_enrich(&settings)
}

pub fn run_crosswalk(args: &CrosswalkArgs) -> Result<()> {
    let index = load_index(&args.crosswalk, args.duplicates.into())
        .with_context(|| format!("load crosswalk {}", args.crosswalk.display()))?;
    let version = crosswalk_version(&args.crosswalk)?;
    println!("Crosswalk: {version}");
    println!("Elements: {}  Groups: {}", index.len(), index.group_count());

    let mut table = Table::new();
    table.set_header(vec!["Group", "Elements", "First description"]);
    apply_table_style(&mut table);
    for (group, entries) in index.groups() {
        let first = entries
            .first()
            .map(|entry| entry.description.as_str())
            .unwrap_or_default();
        table.add_row(vec![
            group.to_string(),
            entries.len().to_string(),
            first.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_explain(args: &ExplainArgs) -> Result<()> {
    let explanation = explain_rate(
        &args.rates_dir,
        &args.crosswalk,
        args.overrides.as_deref(),
        &args.matching.options(),
        &args.code,
    )?;
    print_explanation(&explanation);
    Ok(())
}
