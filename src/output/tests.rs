//! Tests for output module

use super::*;
use crate::streams;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn lines(emitter: Emitter<Vec<u8>>) -> Vec<Value> {
    let bytes = emitter.into_inner();
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_record_message_shape() {
    let record = json!({"returnId": "R1"}).as_object().unwrap().clone();
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
    let message = Message::record_at("returns", record, at);

    assert_eq!(
        serde_json::to_value(&message).unwrap(),
        json!({
            "type": "RECORD",
            "stream": "returns",
            "record": {"returnId": "R1"},
            "time_extracted": "2024-05-01T08:30:00.000000Z"
        })
    );
    assert_eq!(message.stream(), "returns");
}

#[test]
fn test_schema_written_once() {
    let mut emitter = Emitter::new(Vec::new());
    let stream = streams::shipments();
    emitter.write_schema(&stream).unwrap();
    emitter.write_schema(&stream).unwrap();

    let out = lines(emitter);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["type"], "SCHEMA");
    assert_eq!(out[0]["stream"], "shipments");
    assert_eq!(out[0]["key_properties"], json!(["shipmentId"]));
    assert_eq!(out[0]["schema"]["type"], "object");
}

#[test]
fn test_records_are_counted_and_line_delimited() {
    let mut emitter = Emitter::new(Vec::new());
    emitter.write_schema(&streams::returns()).unwrap();
    for id in ["R1", "R2"] {
        let record = json!({"returnId": id}).as_object().unwrap().clone();
        emitter.write_record("returns", record).unwrap();
    }
    emitter.flush().unwrap();
    assert_eq!(emitter.records_written(), 2);

    let out = lines(emitter);
    let types: Vec<_> = out.iter().map(|m| m["type"].clone()).collect();
    assert_eq!(types, vec![json!("SCHEMA"), json!("RECORD"), json!("RECORD")]);
    assert_eq!(out[2]["record"]["returnId"], "R2");
}
