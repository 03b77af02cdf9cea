/// End-to-end CLI tests: parse real argument vectors, run against CSV and
/// config files in a temporary directory, and inspect the rendered output.
use clap::Parser;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use transport_audit_cli::{run, Cli};

// ── Helpers ──────────────────────────────────────────────────────────────────

const EXPORT: &str = "Uppdrag Starttid,Uppdrag Sluttid,Startplats,Slutplats,Transportmedel,Prioritet,Sekundär Servicepersonal Id
2024-01-15 09:00:00,2024-01-15 09:20:00,Akuten,Röntgen,Säng,Akut,T1
2024-01-15 09:05:00,2024-01-15 09:10:00,Avd 3,Röntgen,Rullstol,Normal,T2
2024-01-15 14:00:00,2024-01-15 14:12:00,Avd 3,Akuten,Säng,Normal,T1
2024-01-15 14:02:00,2024-01-15 14:14:00,Avd 5,Akuten,Säng,Normal,T3
";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn run_args(args: &[&str]) -> anyhow::Result<String> {
    let argv = std::iter::once("transport-audit").chain(args.iter().copied());
    run(&Cli::try_parse_from(argv).unwrap())
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn json_report_has_every_section() {
    let tmp = TempDir::new().unwrap();
    let csv = write(tmp.path(), "export.csv", EXPORT);

    let out = run_args(&[csv.to_str().unwrap(), "--format", "json"]).unwrap();
    let json: Value = serde_json::from_str(&out).unwrap();

    assert_eq!(json["summary"]["row_count"], 4);
    assert_eq!(json["summary"]["delimiter"], ",");
    assert_eq!(json["diagnostics"]["total_rows"], 4);

    let results = json["results"].as_array().unwrap();
    let names: Vec<&str> = results.iter().map(|r| r["analysis"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec![
            "hourly_activity",
            "transport_types",
            "location_frequency",
            "transport_duration",
            "priority_analysis",
            "workload_inequality",
            "transporter_summary",
        ]
    );
    for entry in results {
        assert!(entry["result"].is_object() || entry["result"].is_array());
        assert!(entry["insights"]["findings"].is_array());
    }

    let hourly = &results[0]["result"];
    assert_eq!(hourly["peak_hour"], 9);
    assert_eq!(hourly["labels"].as_array().unwrap().len(), 24);

    let workload = &results[5]["result"];
    assert_eq!(workload["buckets"][0]["bucket_key"], "2024-01-15 09:00");
    assert_eq!(workload["buckets"][0]["workload_details"]["T1"], 80.0);

    assert!(json["combined_insights"]["findings"].as_array().unwrap().len() > 7);
}

#[test]
fn single_analysis_with_limit() {
    let tmp = TempDir::new().unwrap();
    let csv = write(tmp.path(), "export.csv", EXPORT);

    let out = run_args(&[
        csv.to_str().unwrap(),
        "-a",
        "workload_inequality",
        "-f",
        "json",
        "--limit",
        "1",
    ])
    .unwrap();
    let json: Value = serde_json::from_str(&out).unwrap();
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    let periods = &results[0]["result"]["periods"];
    assert_eq!(periods["highest"].as_array().unwrap().len(), 1);
    assert_eq!(periods["highest"][0]["bucket_key"], "2024-01-15 09:00");
}

#[test]
fn text_report_is_readable() {
    let tmp = TempDir::new().unwrap();
    let csv = write(tmp.path(), "export.csv", EXPORT);

    let out = run_args(&[csv.to_str().unwrap()]).unwrap();
    assert!(out.starts_with("TransportAudit report"));
    assert!(out.contains("Hourly activity\n---------------"));
    assert!(out.contains("Workload inequality"));
    assert!(out.contains("Peak hour is 09:00"));
    assert!(out.contains("Summary of recommendations"));
}

#[test]
fn priority_text_includes_hourly_breakdown() {
    let tmp = TempDir::new().unwrap();
    let csv = write(tmp.path(), "export.csv", EXPORT);

    let out = run_args(&[csv.to_str().unwrap(), "-a", "priority_analysis"]).unwrap();
    assert!(out.contains("By hour:"));
    assert!(out.contains("  09:00  Akut 50.0%, Normal 50.0%"));
    assert!(out.contains("  14:00  Normal 100.0%"));
}

#[test]
fn value_filter_restricts_every_analysis() {
    let tmp = TempDir::new().unwrap();
    let csv = write(tmp.path(), "export.csv", EXPORT);

    let out = run_args(&[
        csv.to_str().unwrap(),
        "--filter",
        "transport_type=Säng",
        "-a",
        "transporter_summary",
        "-f",
        "json",
    ])
    .unwrap();
    let json: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["summary"]["row_count"], 3);
    assert_eq!(json["summary"]["value_filters"][0], "transport_type = Säng");
    assert_eq!(json["diagnostics"]["filtered_by_value"], 1);

    let summary = json["results"][0]["result"].as_array().unwrap();
    let ids: Vec<&str> = summary.iter().map(|s| s["transporter_id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["T1", "T3"]);
    assert_eq!(summary[0]["total_transports"], 2);

    let text = run_args(&[csv.to_str().unwrap(), "--filter", "priority=Akut"]).unwrap();
    assert!(text.contains("Filtered to priority = Akut: 3 rows removed"));
}

#[test]
fn distinct_values_listing() {
    let tmp = TempDir::new().unwrap();
    let csv = write(tmp.path(), "export.csv", EXPORT);

    let out = run_args(&[csv.to_str().unwrap(), "--values", "transporter"]).unwrap();
    assert_eq!(out, "T1\nT2\nT3");

    let out = run_args(&[csv.to_str().unwrap(), "--values", "priority", "-f", "json"]).unwrap();
    let json: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json, serde_json::json!(["Akut", "Normal"]));

    let out = run_args(&[
        csv.to_str().unwrap(),
        "--filter",
        "priority=Normal",
        "--values",
        "worker",
    ])
    .unwrap();
    assert_eq!(out, "T2\nT1\nT3");
}

#[test]
fn config_file_and_column_override() {
    let tmp = TempDir::new().unwrap();
    let csv = write(
        tmp.path(),
        "custom.csv",
        "from;to;carrier\n15-01-2024 09:00:00;15-01-2024 09:45:00;A\n15-01-2024 09:10:00;15-01-2024 09:25:00;B\n",
    );
    let config = write(
        tmp.path(),
        "engine.json",
        r#"{ "max_duration_minutes": null, "ranking_metric": "gini" }"#,
    );

    let out = run_args(&[
        csv.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--column",
        "start_time=from",
        "--column",
        "end_time=to",
        "--column",
        "transporter=carrier",
        "--analysis",
        "workload_inequality",
        "--format",
        "json",
    ])
    .unwrap();
    let json: Value = serde_json::from_str(&out).unwrap();
    let result = &json["results"][0]["result"];
    // 45 of 60 minutes vs 15: shares 75 / 25.
    assert_eq!(result["buckets"][0]["workload_details"]["A"], 75.0);
    assert_eq!(result["periods"]["metric"], "gini");
    assert_eq!(json["summary"]["filtered_count"], 0);
}

#[test]
fn missing_input_reports_path() {
    let err = run_args(&["/no/such/dir/export.csv"]).unwrap_err();
    assert!(format!("{err:#}").contains("/no/such/dir/export.csv"));
}

#[test]
fn invalid_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let csv = write(tmp.path(), "export.csv", EXPORT);
    let config = write(tmp.path(), "bad.json", r#"{ "histogram_bin_width": -1 }"#);

    let err = run_args(&[csv.to_str().unwrap(), "-c", config.to_str().unwrap()]).unwrap_err();
    assert!(format!("{err:#}").contains("histogram_bin_width"));
}
