mod common;

use rcountries::{PipelineConfig, pipeline, storage};
use tempfile::tempdir;

fn offline_config(out_dir: &std::path::Path) -> PipelineConfig {
    PipelineConfig {
        input: Some(common::fixture_path()),
        out_dir: out_dir.to_path_buf(),
        skip_charts: true,
        ..PipelineConfig::default()
    }
}

#[test]
fn offline_run_writes_json_and_csv() {
    let dir = tempdir().unwrap();
    let config = offline_config(dir.path());
    let mut out = Vec::new();
    let report = pipeline::run(&config, &mut out).unwrap();

    assert_eq!(report.status, None);
    assert_eq!(report.raw_records, 16);
    assert_eq!(report.clean_rows, 16);
    assert_eq!(report.summary.len(), 4);
    assert_eq!(report.pivot.subregions.len(), 4);
    assert_eq!(
        report.written,
        vec![config.raw_json_path(), config.clean_csv_path()]
    );
    assert!(config.raw_json_path().exists());
    assert_eq!(storage::load_clean_csv(config.clean_csv_path()).unwrap().len(), 16);
    assert!(!config.histogram_path().exists());

    let txt = String::from_utf8(out).unwrap();
    assert!(!txt.contains("Status code"));
    assert!(txt.contains("=== RAW DATA ==="));
    assert!(txt.contains("16 entries"));
    assert!(txt.contains("name.common"));
    assert!(txt.contains("0   Germany"));
    assert!(txt.contains("Northern Europe"));
    assert!(txt.contains("83,240,525"));
    assert!(
        txt.trim_end().ends_with(
            r#"["name", "region", "subregion", "population", "area", "pop_density", "density_bin"]"#
        )
    );
}

#[test]
fn rerunning_on_saved_payload_is_stable() {
    let first = tempdir().unwrap();
    pipeline::run(&offline_config(first.path()), &mut std::io::sink()).unwrap();

    // Feed the saved raw payload back in.
    let second = tempdir().unwrap();
    let config = PipelineConfig {
        input: Some(first.path().join("q1data_raw.json")),
        ..offline_config(second.path())
    };
    pipeline::run(&config, &mut std::io::sink()).unwrap();

    for file in ["q1data_raw.json", "q2data_cleaned.csv"] {
        let a = std::fs::read(first.path().join(file)).unwrap();
        let b = std::fs::read(second.path().join(file)).unwrap();
        assert_eq!(a, b, "{file} differs between runs");
    }
}

#[test]
fn bad_input_fails_without_writing_csv() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.json");
    std::fs::write(&input, r#"{"status":404,"message":"Not Found"}"#).unwrap();
    let config = PipelineConfig {
        input: Some(input),
        ..offline_config(dir.path())
    };
    let err = pipeline::run(&config, &mut std::io::sink()).unwrap_err();
    assert!(format!("{err:#}").contains("Not Found"));
    assert!(!config.clean_csv_path().exists());
}
