//! Branch and repository policies.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::{common::IdentityRef, Contract, PropertyBag};
use crate::{enums::ContractEnum, schema::SchemaRegistry};

contract_enum! {
    /// Status of a policy running against an artifact.
    PolicyEvaluationStatus("policy.PolicyEvaluationStatus") {
        Queued = 0 => "queued",
        Running = 1 => "running",
        Approved = 2 => "approved",
        Rejected = 3 => "rejected",
        /// Policy does not apply to this artifact.
        NotApplicable = 4 => "notApplicable",
        /// Policy evaluation failed unexpectedly.
        Broken = 5 => "broken",
    }
}

contract! {
    PolicyTypeRef("policy.PolicyTypeRef") {
        display_name: String,
        id: Uuid,
        url: String,
    }
}

contract! {
    PolicyType("policy.PolicyType") {
        display_name: String,
        id: Uuid,
        url: String,
        #[serde(rename = "_links")]
        links: PropertyBag,
        description: String,
    }
}

contract! {
    PolicyConfigurationRef("policy.PolicyConfigurationRef") {
        id: i32,
        r#type: PolicyTypeRef,
        url: String,
    }
}

contract! {
    PolicyConfiguration("policy.PolicyConfiguration") {
        id: i32,
        r#type: PolicyTypeRef,
        url: String,
        revision: i32,
        #[serde(rename = "_links")]
        links: PropertyBag,
        created_by: IdentityRef,
        created_date: DateTime<Utc>,
        is_blocking: bool,
        is_deleted: bool,
        is_enabled: bool,
        is_enterprise_managed: bool,
        /// Policy-type specific settings, including `scope`.
        settings: Value,
    }
}

impl PolicyConfiguration {
    /// Whether the policy blocks completion when it is enabled.
    pub fn is_enforced(&self) -> bool {
        self.is_enabled == Some(true)
            && self.is_blocking == Some(true)
            && self.is_deleted != Some(true)
    }
}

contract! {
    PolicyEvaluationRecord("policy.PolicyEvaluationRecord") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        /// `vstfs:///CodeReview/CodeReviewId/{projectId}/{pullRequestId}`.
        artifact_id: String,
        completed_date: DateTime<Utc>,
        configuration: PolicyConfiguration,
        context: Value,
        evaluation_id: Uuid,
        started_date: DateTime<Utc>,
        status: PolicyEvaluationStatus,
    }
}

pub(crate) fn register(registry: &mut SchemaRegistry) {
    registry
        .enumeration::<PolicyEvaluationStatus>()
        .plain::<PolicyTypeRef>()
        .plain::<PolicyType>()
        .plain::<PolicyConfigurationRef>()
        .contract::<PolicyConfiguration, _>(|t| t.date("createdDate"))
        .contract::<PolicyEvaluationRecord, _>(|t| {
            t.date("completedDate")
                .object("configuration", PolicyConfiguration::TYPE_NAME)
                .date("startedDate")
                .enumeration("status", PolicyEvaluationStatus::ENUM_NAME)
        });
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::decoder::list_from_value;

    #[test]
    fn evaluation_records_decode_with_configuration() {
        let records: Vec<PolicyEvaluationRecord> = list_from_value(&json!([
            {
                "artifactId": "vstfs:///CodeReview/CodeReviewId/a7573007/1",
                "status": "approved",
                "startedDate": "2024-02-01T10:00:00Z",
                "completedDate": "2024-02-01T10:02:00Z",
                "configuration": {
                    "id": 4,
                    "isEnabled": true,
                    "isBlocking": true,
                    "createdDate": "2023-12-01T00:00:00Z",
                    "type": {"displayName": "Minimum number of reviewers"},
                    "settings": {"minimumApproverCount": 2}
                }
            },
            {"status": 5}
        ]))
        .unwrap();

        assert_eq!(records[0].status, Some(PolicyEvaluationStatus::Approved));
        let configuration = records[0].configuration.as_ref().unwrap();
        assert!(configuration.is_enforced());
        assert_eq!(configuration.settings.as_ref().unwrap()["minimumApproverCount"], 2);
        assert_eq!(records[1].status, Some(PolicyEvaluationStatus::Broken));
        assert!(records[1].configuration.is_none());
    }
}
