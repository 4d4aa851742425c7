//! Integration tests for the acquisition pipeline
//!
//! These tests compose real steps end to end:
//! - Multiple decode input steps merged by a sequential multi-step
//! - CSV file output with pass-through and failure isolation

mod common;

use common::{FixedSource, OfflineSource};
use fieldlog_rs::{
    CsvFileWriter, DecodeInputStep, FileOutputStep, PipelineStep, RawValue, SequentialMultiStep,
    Value, VariableDef, VariableDefaults,
};
use std::collections::HashMap;

fn decode_step(name: &str, fields: &[(&str, u64)]) -> DecodeInputStep {
    let defs: Vec<VariableDef> = fields
        .iter()
        .map(|(field, _)| VariableDef::new(*field, "u16"))
        .collect();
    let payload: Vec<RawValue> = fields.iter().map(|(_, v)| RawValue::UInt(*v)).collect();
    DecodeInputStep::new(
        name,
        Box::new(FixedSource::new(payload)),
        defs,
        &HashMap::new(),
        &HashMap::new(),
        VariableDefaults::default(),
    )
    .unwrap()
}

#[test]
fn test_multi_step_merges_decoded_sensors() {
    let charge = decode_step("charge_controller", &[("adc_vb", 1260), ("adc_ic", 35)]);
    let weather = decode_step("weather", &[("wind_raw", 77)]);
    let mut multi = SequentialMultiStep::new(
        "sensor_sweep",
        vec![Box::new(charge), Box::new(weather)],
    );

    let output = multi.execute(None).unwrap().unwrap();
    let record = output.as_map().unwrap();
    assert_eq!(record.len(), 3);
    let keys: Vec<&str> = record.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["adc_vb", "adc_ic", "wind_raw"]);
}

#[test]
fn test_merged_record_written_as_csv() {
    let dir = tempfile::tempdir().unwrap();

    let charge = decode_step("charge_controller", &[("adc_vb", 1260)]);
    let mut multi = SequentialMultiStep::new("sensor_sweep", vec![Box::new(charge)]);
    let merged = multi.execute(None).unwrap().unwrap();

    let mut output = FileOutputStep::new("csv_output", Box::new(CsvFileWriter::new()), dir.path())
        .with_filename_template("telemetry_{date}")
        .with_extension("csv");

    let passed = output.execute(Some(&merged)).unwrap();
    assert_eq!(passed, Some(merged));

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);
    let contents = std::fs::read_to_string(&entries[0]).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "adc_vb");
    assert_eq!(lines[1], "1260");
}

#[test]
fn test_output_appends_across_executions() {
    let dir = tempfile::tempdir().unwrap();
    let mut output = FileOutputStep::new("csv_output", Box::new(CsvFileWriter::new()), dir.path())
        .with_filename_template("telemetry")
        .with_extension("csv");

    let mut record = fieldlog_rs::Record::new();
    record.insert("v".to_string(), Value::Int(1));
    output.execute(Some(&Value::Map(record.clone()))).unwrap();
    record.insert("v".to_string(), Value::Int(2));
    output.execute(Some(&Value::Map(record))).unwrap();

    let contents = std::fs::read_to_string(dir.path().join("telemetry.csv")).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    // One header, two data rows
    assert_eq!(lines, vec!["v", "1", "2"]);
}

#[test]
fn test_unwritable_target_does_not_abort() {
    let dir = tempfile::tempdir().unwrap();
    // A file where the output directory should be, so create_dir_all fails
    let blocker = dir.path().join("blocked");
    std::fs::write(&blocker, b"").unwrap();

    let mut output =
        FileOutputStep::new("csv_output", Box::new(CsvFileWriter::new()), &blocker)
            .with_filename_template("telemetry")
            .with_extension("csv");

    let mut record = fieldlog_rs::Record::new();
    record.insert("v".to_string(), Value::Int(1));
    let input = Value::Map(record);

    let passed = output.execute(Some(&input)).unwrap();
    assert_eq!(passed, Some(input));
    assert_eq!(output.log_helper().unwrap().entry_count(), 1);
}

#[test]
fn test_failing_input_step_propagates_through_multi_step() {
    let charge = decode_step("charge_controller", &[("adc_vb", 1260)]);
    let offline = DecodeInputStep::new(
        "weather",
        Box::new(OfflineSource),
        vec![VariableDef::new("wind_raw", "u16")],
        &HashMap::new(),
        &HashMap::new(),
        VariableDefaults::default(),
    )
    .unwrap();

    let mut multi = SequentialMultiStep::new(
        "sensor_sweep",
        vec![Box::new(charge), Box::new(offline)],
    );
    let err = multi.execute(None).unwrap_err();
    assert_eq!(err.kind(), "AcquisitionError");
}
