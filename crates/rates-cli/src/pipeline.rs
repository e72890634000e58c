//! Directory-level enrichment runs: load, route, enrich, stamp, save, report.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use rates_ingest::{
    Catalog, OverrideConfig, crosswalk_version, load_catalogs, load_index, load_overrides,
};
use rates_map::{
    CrosswalkIndex, EnrichmentPipeline, EnrichmentStats, MatchOptions, MatchScore, OverrideTarget,
};
use rates_model::{CrosswalkEntry, Rate};
use rates_report::QaReport;
use tracing::{info, info_span};

/// Inputs of one `enrich` run.
#[derive(Debug, Clone)]
pub struct EnrichSettings {
    pub rates_dir: PathBuf,
    pub crosswalk: PathBuf,
    pub overrides: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub options: MatchOptions,
    pub parallel: bool,
    /// Enrich and report without writing catalogs.
    pub dry_run: bool,
    /// Date stamped into catalog meta and the report.
    pub enriched_date: String,
}

#[derive(Debug, Clone)]
pub struct CatalogSummary {
    pub file: String,
    pub stats: EnrichmentStats,
}

/// Outcome of an `enrich` run.
#[derive(Debug, Clone)]
pub struct EnrichRun {
    pub crosswalk_version: String,
    pub catalogs: Vec<CatalogSummary>,
    pub stats: EnrichmentStats,
    /// Rates given a group by a hint route.
    pub routed: usize,
    pub report: Option<PathBuf>,
    pub written: bool,
}

/// Crosswalk, overrides and catalogs loaded for a run.
struct Inputs {
    index: CrosswalkIndex,
    config: OverrideConfig,
    catalogs: Vec<Catalog>,
}

fn load_inputs(
    rates_dir: &Path,
    crosswalk: &Path,
    overrides: Option<&Path>,
    options: &MatchOptions,
) -> Result<Inputs> {
    let index = load_index(crosswalk, options.duplicates)
        .with_context(|| format!("load crosswalk {}", crosswalk.display()))?;
    let config = match overrides {
        Some(path) => load_overrides(path)
            .with_context(|| format!("load overrides {}", path.display()))?,
        None => OverrideConfig::default(),
    };
    let catalogs = load_catalogs(rates_dir)
        .with_context(|| format!("load catalogs from {}", rates_dir.display()))?;
    Ok(Inputs {
        index,
        config,
        catalogs,
    })
}

/// Apply hint routes to every catalog; explicit overrides keep priority.
fn route_hints(config: &mut OverrideConfig, catalogs: &[Catalog]) -> usize {
    catalogs
        .iter()
        .map(|catalog| config.router.route_into(catalog.rates(), &mut config.overrides))
        .sum()
}

pub fn run_enrich(settings: &EnrichSettings) -> Result<EnrichRun> {
    let Inputs {
        index,
        mut config,
        mut catalogs,
    } = load_inputs(
        &settings.rates_dir,
        &settings.crosswalk,
        settings.overrides.as_deref(),
        &settings.options,
    )?;
    let version = crosswalk_version(&settings.crosswalk)
        .with_context(|| format!("fingerprint {}", settings.crosswalk.display()))?;

    let routed = route_hints(&mut config, &catalogs);
    let scorer = settings.options.scorer();
    let pipeline = EnrichmentPipeline::new(&index, &scorer, &config.overrides)
        .context("validate override table")?;
    info!(
        catalogs = catalogs.len(),
        overrides = config.overrides.len(),
        routed,
        similarity = scorer.similarity_name(),
        "starting enrichment"
    );

    let mut summaries = Vec::with_capacity(catalogs.len());
    let mut total = EnrichmentStats::default();
    for catalog in &mut catalogs {
        let file = catalog.file_name();
        let _span = info_span!("catalog", file = file.as_str()).entered();
        let stats = if settings.parallel {
            pipeline.enrich_parallel(catalog.rates_mut())
        } else {
            pipeline.enrich(catalog.rates_mut())
        };
        if !settings.dry_run {
            catalog.stamp(&settings.enriched_date, &version);
            catalog
                .save()
                .with_context(|| format!("write {}", catalog.path.display()))?;
        }
        total = total.merge(stats.clone());
        summaries.push(CatalogSummary { file, stats });
    }

    if let Some(path) = &settings.report {
        let files: Vec<String> = catalogs.iter().map(Catalog::file_name).collect();
        let mut report = QaReport::new(
            settings.enriched_date.clone(),
            version.clone(),
            *scorer.thresholds(),
            &total,
        );
        for (file, catalog) in files.iter().zip(&catalogs) {
            report.add_catalog(file, catalog.rates());
        }
        report.write_to(path)?;
        info!(path = %path.display(), "wrote QA report");
    }

    Ok(EnrichRun {
        crosswalk_version: version,
        catalogs: summaries,
        stats: total,
        routed,
        report: settings.report.clone(),
        written: !settings.dry_run,
    })
}

/// A rate with every candidate scored, best first.
#[derive(Debug, Clone)]
pub struct Explanation {
    pub file: String,
    pub rate: Rate,
    pub override_target: Option<OverrideTarget>,
    pub ranked: Vec<(CrosswalkEntry, MatchScore)>,
}

pub fn explain_rate(
    rates_dir: &Path,
    crosswalk: &Path,
    overrides: Option<&Path>,
    options: &MatchOptions,
    code: &str,
) -> Result<Explanation> {
    let Inputs {
        index,
        mut config,
        catalogs,
    } = load_inputs(rates_dir, crosswalk, overrides, options)?;
    route_hints(&mut config, &catalogs);

    let (file, rate) = catalogs
        .iter()
        .find_map(|catalog| {
            catalog
                .rates()
                .iter()
                .find(|rate| rate.code.trim() == code.trim())
                .map(|rate| (catalog.file_name(), rate.clone()))
        })
        .ok_or_else(|| anyhow!("rate {code} not found in {}", rates_dir.display()))?;

    let scorer = options.scorer();
    let pipeline = EnrichmentPipeline::new(&index, &scorer, &config.overrides)
        .context("validate override table")?;
    let ranked = pipeline
        .resolver()
        .rank(&rate)
        .into_iter()
        .map(|resolution| (resolution.entry.clone(), resolution.score))
        .collect();

    Ok(Explanation {
        file,
        override_target: config.overrides.get(&rate.code).cloned(),
        rate,
        ranked,
    })
}
