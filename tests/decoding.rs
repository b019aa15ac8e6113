//! Decoding payloads as the services return them, through the public API only.

use devops_contracts::{
    contracts::{
        common::VssJsonCollectionWrapper,
        build::{Build, BuildReason, BuildResult, BuildStatus},
        core::{ProjectState, TeamProject},
        test::{TestOutcome, TestRun},
        work_item_tracking::{WorkItem, WorkItemQueryResult},
    },
    from_str, from_value, list_from_value, parse_date, Contract, DatePolicy, DecodeErrorKind,
    Decoded, Decoder, DecoderConfig, Error, UnknownEnumPolicy,
};
use serde_json::{json, Value};

fn completed_build() -> Value {
    json!({
        "id": 1042,
        "buildNumber": "20240601.3",
        "status": 2,
        "result": 2,
        "reason": 256,
        "queueTime": "2024-06-01T09:00:00.1234567Z",
        "startTime": "2024-06-01T09:00:12Z",
        "finishTime": "2024-06-01T09:05:42Z",
        "sourceBranch": "refs/pull/17/merge",
        "project": {
            "id": "8b0b3e8c-5a8e-4c39-b2c5-0d9f9f1f5a11",
            "name": "Fabrikam",
            "state": "wellFormed",
            "lastUpdateTime": "2024-05-30T10:00:00Z"
        },
        "definition": {"id": 12, "name": "CI"},
        "requestedFor": {"displayName": "Jamie Rivera", "id": "0c9f5c9a"},
        "tags": ["nightly", "arm64"]
    })
}

#[test]
fn build_payload_decodes_dates_and_enums() {
    let build: Build = from_value(&completed_build()).unwrap();

    assert_eq!(build.status, Some(BuildStatus::Completed));
    assert_eq!(build.result, Some(BuildResult::SUCCEEDED));
    assert_eq!(build.reason, Some(BuildReason::PULL_REQUEST));
    assert_eq!(
        build.queue_time,
        parse_date("2024-06-01T09:00:00.1234567Z")
    );
    assert!(build.is_completed());
    assert_eq!(build.duration().map(|d| d.num_seconds()), Some(330));

    let project = build.project.as_ref().unwrap();
    assert_eq!(project.state, Some(ProjectState::WellFormed));
    assert_eq!(project.name.as_deref(), Some("Fabrikam"));
    assert_eq!(build.tags.as_deref(), Some(&["nightly".to_string(), "arm64".to_string()][..]));
}

#[test]
fn names_and_numbers_decode_to_the_same_build() {
    let mut named = completed_build();
    named["status"] = json!("completed");
    named["result"] = json!("succeeded");
    named["reason"] = json!("pullRequest");

    let by_number: Build = from_value(&completed_build()).unwrap();
    let by_name: Build = from_value(&named).unwrap();
    assert_eq!(by_number, by_name);
}

#[test]
fn dynamic_tree_converts_only_described_fields() {
    let decoded = Decoder::new()
        .decode(&completed_build(), Build::TYPE_NAME)
        .unwrap();

    let status = decoded.get("status").and_then(Decoded::as_enum).unwrap();
    assert_eq!(status.value, 2);
    assert_eq!(status.name.as_deref(), Some("completed"));

    assert!(decoded.get("queueTime").and_then(Decoded::as_date).is_some());
    assert!(decoded
        .pointer(["project", "lastUpdateTime"])
        .and_then(Decoded::as_date)
        .is_some());
    // No rule for sourceBranch, so it stays a string.
    assert_eq!(
        decoded.get("sourceBranch").and_then(Decoded::as_str),
        Some("refs/pull/17/merge")
    );
}

#[test]
fn decoding_is_idempotent_through_json() {
    let decoder = Decoder::new();
    let first = decoder.decode(&completed_build(), Build::TYPE_NAME).unwrap();
    let second = decoder.decode(&first.to_json(), Build::TYPE_NAME).unwrap();
    assert_eq!(first, second);
}

#[test]
fn unknown_enum_values_are_kept_by_default() {
    let mut payload = completed_build();
    payload["status"] = json!(64);
    payload["result"] = json!(2 | 1024);

    let decoded = Decoder::new().decode(&payload, Build::TYPE_NAME).unwrap();
    let status = decoded.get("status").and_then(Decoded::as_enum).unwrap();
    assert_eq!((status.value, status.name.as_deref()), (64, None));

    let build: Build = from_value(&payload).unwrap();
    assert_eq!(build.status, Some(BuildStatus::Other(64)));
    assert!(build.result.unwrap().contains(BuildResult::SUCCEEDED));
    assert_eq!(serde_json::to_value(&build).unwrap()["status"], 64);
}

#[test]
fn strict_decoder_reports_the_failing_path() {
    let mut payload = completed_build();
    payload["project"]["state"] = json!(99);

    let err = Decoder::new()
        .with_config(DecoderConfig::strict())
        .decode(&payload, Build::TYPE_NAME)
        .unwrap_err();
    assert_eq!(err.path, "$.project.state");
    assert!(matches!(
        err.kind,
        DecodeErrorKind::UnknownEnumValue { value: 99, .. }
    ));
}

#[test]
fn unknown_names_are_preserved_or_rejected() {
    let payload = json!({"id": 1, "status": "paused"});

    let preserved = Decoder::new().decode(&payload, Build::TYPE_NAME).unwrap();
    assert_eq!(
        preserved.get("status").and_then(Decoded::as_str),
        Some("paused")
    );

    let rejecting = DecoderConfig::default().with_unknown_enums(UnknownEnumPolicy::Reject);
    let err = Decoder::new()
        .with_config(rejecting)
        .decode(&payload, Build::TYPE_NAME)
        .unwrap_err();
    assert_eq!(err.path, "$.status");

    let typed = from_value::<Build>(&payload);
    assert!(matches!(typed, Err(Error::Serialization(_))));
}

#[test]
fn bad_dates_fail_unless_lenient() {
    let payload = json!({"id": 1, "queueTime": "last tuesday"});

    let err = Decoder::new()
        .decode(&payload, Build::TYPE_NAME)
        .unwrap_err();
    assert_eq!(err.path, "$.queueTime");
    assert_eq!(err.kind, DecodeErrorKind::InvalidDate("last tuesday".into()));

    let lenient = Decoder::new()
        .with_config(DecoderConfig::default().with_dates(DatePolicy::Lenient))
        .decode(&payload, Build::TYPE_NAME)
        .unwrap();
    assert_eq!(
        lenient.get("queueTime").and_then(Decoded::as_str),
        Some("last tuesday")
    );
}

#[test]
fn nulls_decode_as_absent_fields() {
    let build: Build = from_value(&json!({"id": 5, "finishTime": null, "status": null})).unwrap();
    assert_eq!(build.id, Some(5));
    assert!(build.finish_time.is_none());
    assert!(build.status.is_none());
}

#[test]
fn collection_envelopes_are_unwrapped() {
    let projects: Vec<TeamProject> = list_from_value(&json!({
        "count": 2,
        "value": [
            {"name": "Fabrikam", "state": 1},
            {"name": "Contoso", "state": "createPending"}
        ]
    }))
    .unwrap();
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[1].state, Some(ProjectState::CreatePending));

    let bare: Vec<TeamProject> = list_from_value(&json!([{"name": "Tailspin"}])).unwrap();
    assert_eq!(bare[0].name.as_deref(), Some("Tailspin"));
}

#[test]
fn envelopes_can_be_kept() {
    let decoder =
        Decoder::new().with_config(DecoderConfig::default().with_unwrap_collections(false));
    let err = decoder
        .decode_list::<TeamProject>(&json!({"count": 0, "value": []}))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Decode(ref e) if matches!(e.kind, DecodeErrorKind::TypeMismatch { expected: "array", .. })
    ));
}

#[test]
fn from_str_reads_raw_payloads() {
    let run: TestRun = from_str(
        r#"{"id": 88, "state": "Completed", "totalTests": 10, "passedTests": 9,
            "startedDate": "2024-06-01T09:01:00Z", "completedDate": "2024-06-01T09:04:00Z"}"#,
    )
    .unwrap();
    assert_eq!(run.id, Some(88));
    assert!(run.completed_date > run.started_date);
    assert_eq!(run.pass_rate(), Some(90.0));

    assert!(matches!(
        from_str::<TestRun>("{not json"),
        Err(Error::Serialization(_))
    ));
}

#[test]
fn cross_area_payloads_decode() {
    let item: WorkItem = from_value(&json!({
        "id": 12,
        "fields": {"System.Title": "Flaky login test", "System.State": "Active"},
        "relations": [{"rel": "System.LinkTypes.Hierarchy-Reverse", "url": "https://example.test/_apis/wit/workItems/3"}]
    }))
    .unwrap();
    assert_eq!(item.parent_id(), Some(3));

    let result: WorkItemQueryResult = from_value(&json!({
        "queryType": "flat",
        "asOf": "2024-06-01T00:00:00Z",
        "workItems": [{"id": 12}]
    }))
    .unwrap();
    assert_eq!(result.ids(), vec![12]);

    assert_eq!(TestOutcome::from_name("notExecuted"), Some(TestOutcome::NotExecuted));
}

#[test]
fn single_records_reject_arrays() {
    let err = from_value::<Build>(&json!([{"id": 5, "buildNumber": "20240601.1"}])).unwrap_err();
    assert!(matches!(
        err,
        Error::Decode(ref e) if e.path == "$"
            && e.kind == DecodeErrorKind::TypeMismatch { expected: "object", found: "array" }
    ));

    let err = from_str::<TeamProject>(r#"[{"name": "Fabrikam"}]"#).unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[test]
fn single_records_are_never_unwrapped() {
    let wrapper: VssJsonCollectionWrapper = from_value(&json!({
        "count": 1,
        "value": [{"id": 1042}]
    }))
    .unwrap();
    assert_eq!(wrapper.count, Some(1));
    assert_eq!(wrapper.value.as_ref().map(Vec::len), Some(1));

    let build: Build = from_value(&json!({"count": 1, "value": [completed_build()]})).unwrap();
    assert_eq!(build, Build::default());
}
