//! Encoding contracts back to the wire.

use chrono::{TimeZone, Utc};
use devops_contracts::{
    contracts::{
        build::{Build, BuildReason, BuildResult, BuildStatus, QueuePriority},
        common::IdentityRef,
        test::{RunCreateModel, ShallowReference},
    },
    format_date, from_value, to_wire, Contract, DecodeErrorKind, EncoderConfig, Encoder,
    EnumEncoding,
};
use serde_json::json;

fn queued_build() -> Build {
    Build {
        id: Some(77),
        status: Some(BuildStatus::NotStarted),
        priority: Some(QueuePriority::High),
        reason: Some(BuildReason::MANUAL | BuildReason::USER_CREATED),
        queue_time: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).single(),
        requested_for: Some(IdentityRef {
            display_name: Some("Jamie Rivera".into()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[test]
fn default_encoding_uses_numbers_and_skips_empty_fields() {
    let wire = to_wire(&queued_build(), EnumEncoding::Numbers).unwrap();
    assert_eq!(
        wire,
        json!({
            "id": 77,
            "priority": 1,
            "queueTime": "2024-06-01T09:00:00Z",
            "reason": 33,
            "requestedFor": {"displayName": "Jamie Rivera"},
            "status": 32
        })
    );
}

#[test]
fn name_encoding_renders_members_and_flag_lists() {
    let wire = to_wire(&queued_build(), EnumEncoding::Names).unwrap();
    assert_eq!(wire["status"], "notStarted");
    assert_eq!(wire["priority"], "high");
    assert_eq!(wire["reason"], "manual, userCreated");
}

#[test]
fn encoded_payloads_decode_back() {
    let build = queued_build();
    for encoding in [EnumEncoding::Numbers, EnumEncoding::Names] {
        let wire = to_wire(&build, encoding).unwrap();
        let back: Build = from_value(&wire).unwrap();
        assert_eq!(back, build);
    }
}

#[test]
fn unknown_values_stay_numeric_under_names() {
    let build = Build {
        status: Some(BuildStatus::Other(64)),
        result: Some(BuildResult::SUCCEEDED | BuildResult::from_bits_retain(1024)),
        ..Default::default()
    };
    let wire = to_wire(&build, EnumEncoding::Names).unwrap();
    assert_eq!(wire, json!({"status": 64, "result": 1026}));
}

#[test]
fn encoder_normalizes_raw_json() {
    let encoder = Encoder::new()
        .with_config(EncoderConfig::default().with_enum_encoding(EnumEncoding::Numbers));
    let wire = encoder
        .encode(
            &json!({
                "status": "completed",
                "result": "succeeded, failed",
                "finishTime": "2024-06-01T09:05:42.5000000",
                "definition": {"name": "CI", "queueStatus": "paused"}
            }),
            Build::TYPE_NAME,
        )
        .unwrap();

    assert_eq!(wire["status"], 2);
    assert_eq!(wire["result"], 10);
    assert_eq!(wire["finishTime"], "2024-06-01T09:05:42.500Z");
    assert_eq!(wire["definition"]["queueStatus"], 1);
}

#[test]
fn encoder_rejects_unparseable_dates() {
    let err = Encoder::new()
        .encode(&json!({"queueTime": "soon"}), Build::TYPE_NAME)
        .unwrap_err();
    assert_eq!(err.path, "$.queueTime");
    assert_eq!(err.kind, DecodeErrorKind::InvalidDate("soon".into()));
}

#[test]
fn request_models_serialize_nested_references() {
    let model = RunCreateModel {
        name: Some("Nightly UI".into()),
        automated: Some(true),
        build: Some(ShallowReference {
            id: Some("1042".into()),
            ..Default::default()
        }),
        started_date: Some(format_date(&Utc.with_ymd_and_hms(2024, 6, 1, 9, 1, 0).unwrap())),
        ..Default::default()
    };
    let wire = to_wire(&model, EnumEncoding::Numbers).unwrap();
    assert_eq!(wire["build"], json!({"id": "1042"}));
    assert_eq!(wire["automated"], true);
    assert_eq!(wire["startedDate"], "2024-06-01T09:01:00Z");
}
