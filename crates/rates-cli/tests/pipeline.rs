//! Integration tests for directory-level runs.

use std::path::{Path, PathBuf};

use rates_cli::pipeline::{EnrichSettings, explain_rate, run_enrich};
use rates_map::{ConfidenceThresholds, MatchOptions};

const CROSSWALK: &str = "\
nrm1_l4_code,nrm1_l3_code,nrm1_l2_code,nrm1_description,nrm1_unit,nrm2_primary_ws,nrm2_primary_ws_name,nrm2_primary_items,nrm2_secondary_ws,confidence,matched_keywords,notes
5.4.1.1,5.4.1,5.4,Hot water system installation,nr,WS33,Mechanical services,1-4,,High,\"hot water, heater\",
5.4.1.2,5.4.1,5.4,Cold water distribution including pumps,nr,WS33,Mechanical services,5,,Medium,pump,
";

const GROUP_5: &str = r#"{
  "meta": {"group": 5},
  "rates": [
    {"code": "GRP5-HWS-001", "name": "Hot water heater supply and install", "unit": "nr", "nrm1_code": "5.4"},
    {"code": "GRP5-GAS-003", "name": "Gas meter", "unit": "nr", "nrm1_code": "5.3-5.4"}
  ]
}"#;

fn fixture() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let crosswalk = dir.path().join("crosswalk.csv");
    std::fs::write(&crosswalk, CROSSWALK).unwrap();
    std::fs::create_dir(dir.path().join("rates")).unwrap();
    std::fs::write(dir.path().join("rates").join("group_5_services.json"), GROUP_5).unwrap();
    (dir, crosswalk)
}

fn settings(root: &Path, crosswalk: PathBuf) -> EnrichSettings {
    EnrichSettings {
        rates_dir: root.join("rates"),
        crosswalk,
        overrides: None,
        report: Some(root.join("out").join("qa.md")),
        options: MatchOptions::default(),
        parallel: false,
        dry_run: false,
        enriched_date: "2026-01-03".to_string(),
    }
}

#[test]
fn enrich_writes_catalogs_and_report() {
    let (dir, crosswalk) = fixture();
    let run = run_enrich(&settings(dir.path(), crosswalk)).unwrap();

    assert!(run.written);
    assert_eq!(run.catalogs.len(), 1);
    assert_eq!(run.stats.total_rates(), 2);
    assert_eq!(run.stats.tiers.high, 1);
    assert_eq!(run.stats.tiers.no_match, 1);
    assert!(run.crosswalk_version.starts_with("crosswalk.csv@"));

    let saved =
        std::fs::read_to_string(dir.path().join("rates").join("group_5_services.json")).unwrap();
    assert!(saved.contains("\"nrm1_l4_code\": \"5.4.1.1\""));
    assert!(saved.contains("\"enriched_date\": \"2026-01-03\""));

    let report = std::fs::read_to_string(dir.path().join("out").join("qa.md")).unwrap();
    assert!(report.contains("**Total Files Processed**: 1"));
    assert!(report.contains("| group_5_services.json | GRP5-GAS-003 | Gas meter | nr | 5.3-5.4 |"));
}

#[test]
fn dry_run_leaves_catalogs_untouched() {
    let (dir, crosswalk) = fixture();
    let mut settings = settings(dir.path(), crosswalk);
    settings.dry_run = true;
    settings.report = None;

    let run = run_enrich(&settings).unwrap();
    assert!(!run.written);
    assert_eq!(run.stats.total_rates(), 2);

    let saved =
        std::fs::read_to_string(dir.path().join("rates").join("group_5_services.json")).unwrap();
    assert_eq!(saved, GROUP_5);
}

#[test]
fn parallel_run_matches_sequential() {
    let (first_dir, crosswalk) = fixture();
    let sequential = run_enrich(&settings(first_dir.path(), crosswalk)).unwrap();

    let (second_dir, crosswalk) = fixture();
    let mut parallel = settings(second_dir.path(), crosswalk);
    parallel.parallel = true;
    let parallel = run_enrich(&parallel).unwrap();

    assert_eq!(sequential.stats, parallel.stats);
}

#[test]
fn strict_thresholds_change_tiers_only() {
    let (dir, crosswalk) = fixture();
    let mut settings = settings(dir.path(), crosswalk);
    settings.options = MatchOptions::default().with_thresholds(ConfidenceThresholds {
        high: 0.99,
        medium: 0.98,
    });
    let run = run_enrich(&settings).unwrap();
    assert_eq!(run.stats.tiers.high, 0);
    assert_eq!(run.stats.tiers.low, 1);
    assert_eq!(run.stats.tiers.no_match, 1);
}

#[test]
fn explain_ranks_candidates() {
    let (dir, crosswalk) = fixture();
    let explanation = explain_rate(
        &dir.path().join("rates"),
        &crosswalk,
        None,
        &MatchOptions::default(),
        "GRP5-HWS-001",
    )
    .unwrap();

    assert_eq!(explanation.file, "group_5_services.json");
    assert_eq!(explanation.ranked.len(), 2);
    assert_eq!(explanation.ranked[0].0.level4_code, "5.4.1.1");
    assert!(explanation.ranked[0].1.total_score >= explanation.ranked[1].1.total_score);
    assert!(explanation.override_target.is_none());
}

#[test]
fn explain_reports_unknown_code() {
    let (dir, crosswalk) = fixture();
    let error = explain_rate(
        &dir.path().join("rates"),
        &crosswalk,
        None,
        &MatchOptions::default(),
        "NOPE",
    )
    .unwrap_err();
    assert!(error.to_string().contains("NOPE"));
}
