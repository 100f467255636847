/// Scenario injection seen from the outside: every injected event carries its
/// scenario's correlation id, baseline events never do, and injected events
/// land only inside the scenario's declared windows.
use chrono::{DateTime, NaiveDate, Utc};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

use logforge::config::types::Config;
use logforge::orchestrator::{execute_run, ExecuteError, PlanError};
use logforge::run::{GenerationRun, OutputMode};
use logforge::scenario::{ScenarioError, ScenarioRegistry};

const START: &str = "2026-01-05";

fn start_date() -> NaiveDate {
    START.parse().unwrap()
}

fn config_for(root: &Path) -> Arc<Config> {
    let mut config = Config::default();
    config.output.scratch_dir = root.to_path_buf();
    Arc::new(config)
}

fn run_with(sources: &[&str], scenarios: &[&str]) -> GenerationRun {
    GenerationRun {
        start_date: start_date(),
        days: 7,
        scale: 0.05,
        sources: sources.iter().map(|s| s.to_string()).collect(),
        scenarios: scenarios.iter().map(|s| s.to_string()).collect(),
        output_mode: OutputMode::Scratch,
        workers: 2,
        show_files: false,
    }
}

fn expected_correlation_id(scenario_id: &str) -> String {
    let selected = ScenarioRegistry::builtin()
        .select(&[scenario_id.to_string()], start_date())
        .unwrap();
    selected[0].correlation_id.clone()
}

#[tokio::test]
async fn exfiltration_tags_all_and_only_injected_events() {
    let dir = tempfile::tempdir().unwrap();
    let (_tx, rx) = watch::channel(false);
    let report = execute_run(
        config_for(dir.path()),
        run_with(&["firewall", "auth", "cloud"], &["exfiltration"]),
        rx,
    )
    .await
    .unwrap();
    assert!(report.all_ok(), "{:?}", report.outcomes);

    let corr = expected_correlation_id("exfiltration");

    // Firewall: syslog lines, tagged via a trailing corr_id= token.
    let firewall = std::fs::read_to_string(dir.path().join("firewall/firewall.log")).unwrap();
    let mut tagged_firewall = 0;
    for line in firewall.lines() {
        if let Some(idx) = line.find("corr_id=") {
            assert_eq!(&line[idx + "corr_id=".len()..], corr, "foreign correlation id");
            tagged_firewall += 1;
        }
    }
    assert!(tagged_firewall > 0, "no injected firewall events found");

    // Auth: JSON lines with an explicit correlation_id field. The single
    // injected login lands on day 2 at hour 22.
    let auth = std::fs::read_to_string(dir.path().join("auth/idp.jsonl")).unwrap();
    let mut tagged_auth = 0;
    for line in auth.lines() {
        let record: serde_json::Value = serde_json::from_str(line).unwrap();
        match &record["correlation_id"] {
            serde_json::Value::Null => {}
            serde_json::Value::String(id) => {
                assert_eq!(id, &corr);
                let ts: DateTime<Utc> = record["ts"].as_str().unwrap().parse().unwrap();
                assert_eq!(ts.date_naive(), start_date() + chrono::Duration::days(2));
                assert_eq!(ts.format("%H").to_string(), "22");
                tagged_auth += 1;
            }
            other => panic!("unexpected correlation_id value: {other}"),
        }
    }
    assert!(tagged_auth > 0, "no injected auth events found");

    // Cloud: injected object reads stay inside days 2..=5.
    let cloud = std::fs::read_to_string(dir.path().join("cloud/audit.jsonl")).unwrap();
    let mut tagged_cloud = 0;
    for line in cloud.lines() {
        let record: serde_json::Value = serde_json::from_str(line).unwrap();
        if let Some(id) = record["correlation_id"].as_str() {
            assert_eq!(id, corr);
            let ts: DateTime<Utc> = record["eventTime"].as_str().unwrap().parse().unwrap();
            let day = (ts.date_naive() - start_date()).num_days();
            assert!((2..=5).contains(&day), "cloud event outside window: day {day}");
            tagged_cloud += 1;
        }
    }
    assert!(tagged_cloud > 0, "no injected cloud events found");
}

#[tokio::test]
async fn baseline_run_carries_no_correlation_ids() {
    let dir = tempfile::tempdir().unwrap();
    let (_tx, rx) = watch::channel(false);
    let report = execute_run(
        config_for(dir.path()),
        run_with(&["firewall", "auth"], &[]),
        rx,
    )
    .await
    .unwrap();
    assert!(report.all_ok());

    let firewall = std::fs::read_to_string(dir.path().join("firewall/firewall.log")).unwrap();
    assert!(!firewall.contains("corr_id="));

    let auth = std::fs::read_to_string(dir.path().join("auth/idp.jsonl")).unwrap();
    for line in auth.lines() {
        let record: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(record["correlation_id"].is_null());
    }
}

#[tokio::test]
async fn unknown_scenario_fails_before_any_generation() {
    let dir = tempfile::tempdir().unwrap();
    let (_tx, rx) = watch::channel(false);
    let err = execute_run(
        config_for(dir.path()),
        run_with(&["firewall"], &["ransomware"]),
        rx,
    )
    .await
    .unwrap_err();

    match err {
        ExecuteError::Plan(PlanError::Scenario(ScenarioError::Unknown(id))) => {
            assert_eq!(id, "ransomware");
        }
        other => panic!("expected unknown-scenario error, got {other}"),
    }
    // Nothing was written.
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn scenario_in_inactive_source_set_still_plans() {
    // Exfiltration touches auth/cloud/firewall. Running only against firewall
    // is valid; the other windows simply never materialize.
    let dir = tempfile::tempdir().unwrap();
    let (_tx, rx) = watch::channel(false);
    let report = execute_run(
        config_for(dir.path()),
        run_with(&["firewall"], &["exfiltration"]),
        rx,
    )
    .await
    .unwrap();
    assert!(report.all_ok());

    let corr = expected_correlation_id("exfiltration");
    let firewall = std::fs::read_to_string(dir.path().join("firewall/firewall.log")).unwrap();
    assert!(firewall.contains(&corr));
}
