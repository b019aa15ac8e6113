//! Agent pools, agents, job requests and variable groups.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use super::{build::TaskResult, common::IdentityRef, Contract, PropertyBag};
use crate::{
    enums::ContractEnum,
    schema::{FieldKind, SchemaRegistry},
};

contract_enum! {
    TaskAgentStatus("taskAgent.TaskAgentStatus") {
        Offline = 1 => "offline",
        Online = 2 => "online",
    }
}

contract_enum! {
    TaskAgentPoolType("taskAgent.TaskAgentPoolType") {
        /// A typical pool of task agents.
        Automation = 1 => "automation",
        /// A deployment pool.
        Deployment = 2 => "deployment",
    }
}

contract_flags! {
    TaskAgentPoolOptions("taskAgent.TaskAgentPoolOptions") {
        NONE = 0 => "none",
        /// Backed by virtual machine scale sets.
        ELASTIC_POOL = 1 => "elasticPool",
        /// Agents run a single job, then are recycled.
        SINGLE_USE_AGENTS = 2 => "singleUseAgents",
        PRESERVE_AGENT_ON_JOB_FAILURE = 4 => "preserveAgentOnJobFailure",
    }
}

contract_flags! {
    TaskAgentPoolMaintenanceScheduleDays("taskAgent.TaskAgentPoolMaintenanceScheduleDays") {
        NONE = 0 => "none",
        MONDAY = 1 => "monday",
        TUESDAY = 2 => "tuesday",
        WEDNESDAY = 4 => "wednesday",
        THURSDAY = 8 => "thursday",
        FRIDAY = 16 => "friday",
        SATURDAY = 32 => "saturday",
        SUNDAY = 64 => "sunday",
        ALL = 127 => "all",
    }
}

contract_enum! {
    TaskAgentPoolMaintenanceJobStatus("taskAgent.TaskAgentPoolMaintenanceJobStatus") {
        InProgress = 1 => "inProgress",
        Completed = 2 => "completed",
        Cancelling = 4 => "cancelling",
        Queued = 8 => "queued",
    }
}

contract_enum! {
    TaskAgentPoolMaintenanceJobResult("taskAgent.TaskAgentPoolMaintenanceJobResult") {
        Succeeded = 1 => "succeeded",
        Failed = 2 => "failed",
        Canceled = 4 => "canceled",
    }
}

contract_flags! {
    TaskAgentJobResultFilter("taskAgent.TaskAgentJobResultFilter") {
        FAILED = 1 => "failed",
        PASSED = 2 => "passed",
        NEVER_DEPLOYED = 4 => "neverDeployed",
        ALL = 7 => "all",
    }
}

contract_enum! {
    TaskAgentUpdateReasonType("taskAgent.TaskAgentUpdateReasonType") {
        Manual = 1 => "manual",
        MinAgentVersionRequired = 2 => "minAgentVersionRequired",
        Downgrade = 3 => "downgrade",
    }
}

contract_enum! {
    VariableGroupType("taskAgent.VariableGroupType") {
        Vsts = 0 => "vsts",
        AzureKeyVault = 1 => "azureKeyVault",
    }
}

contract! {
    TaskAgentPoolReference("taskAgent.TaskAgentPoolReference") {
        id: i32,
        is_hosted: bool,
        is_legacy: bool,
        name: String,
        options: TaskAgentPoolOptions,
        pool_type: TaskAgentPoolType,
        scope: Uuid,
        size: i32,
    }
}

contract! {
    TaskAgentPool("taskAgent.TaskAgentPool") {
        id: i32,
        is_hosted: bool,
        is_legacy: bool,
        name: String,
        options: TaskAgentPoolOptions,
        pool_type: TaskAgentPoolType,
        scope: Uuid,
        size: i32,
        agent_cloud_id: i32,
        auto_provision: bool,
        auto_size: bool,
        auto_update: bool,
        created_by: IdentityRef,
        created_on: DateTime<Utc>,
        owner: IdentityRef,
        properties: PropertyBag,
        target_size: i32,
    }
}

contract! {
    TaskAgentReference("taskAgent.TaskAgentReference") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        access_point: String,
        enabled: bool,
        id: i32,
        name: String,
        os_description: String,
        provisioning_state: String,
        status: TaskAgentStatus,
        version: String,
    }
}

contract! {
    TaskAgentUpdateReason("taskAgent.TaskAgentUpdateReason") {
        code: TaskAgentUpdateReasonType,
    }
}

contract! {
    TaskAgentUpdate("taskAgent.TaskAgentUpdate") {
        current_state: String,
        reason: TaskAgentUpdateReason,
        requested_by: IdentityRef,
        request_time: DateTime<Utc>,
        source_version: Value,
        target_version: Value,
    }
}

contract! {
    TaskAgentAuthorization("taskAgent.TaskAgentAuthorization") {
        authorization_url: String,
        client_id: Uuid,
        public_key: Value,
    }
}

contract! {
    TaskAgent("taskAgent.TaskAgent") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        access_point: String,
        enabled: bool,
        id: i32,
        name: String,
        os_description: String,
        provisioning_state: String,
        status: TaskAgentStatus,
        version: String,
        assigned_request: Box<TaskAgentJobRequest>,
        authorization: TaskAgentAuthorization,
        created_on: DateTime<Utc>,
        last_completed_request: Box<TaskAgentJobRequest>,
        max_parallelism: i32,
        pending_update: TaskAgentUpdate,
        properties: PropertyBag,
        status_changed_on: DateTime<Utc>,
        system_capabilities: IndexMap<String, String>,
        user_capabilities: IndexMap<String, String>,
    }
}

impl TaskAgent {
    /// Look up a capability; user capabilities override system ones.
    pub fn capability(&self, name: &str) -> Option<&str> {
        self.user_capabilities
            .as_ref()
            .and_then(|caps| caps.get(name))
            .or_else(|| self.system_capabilities.as_ref()?.get(name))
            .map(String::as_str)
    }

    pub fn is_online(&self) -> bool {
        self.enabled != Some(false) && self.status == Some(TaskAgentStatus::Online)
    }
}

contract! {
    TaskOrchestrationOwner("taskAgent.TaskOrchestrationOwner") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        id: i32,
        name: String,
    }
}

contract! {
    /// A job waiting for, or running on, an agent.
    TaskAgentJobRequest("taskAgent.TaskAgentJobRequest") {
        agent_specification: Value,
        assign_time: DateTime<Utc>,
        data: IndexMap<String, String>,
        definition: TaskOrchestrationOwner,
        demands: Vec<Value>,
        finish_time: DateTime<Utc>,
        host_id: Uuid,
        job_id: Uuid,
        job_name: String,
        locked_until: DateTime<Utc>,
        matched_agents: Vec<TaskAgentReference>,
        orchestration_id: String,
        owner: TaskOrchestrationOwner,
        plan_group: String,
        plan_id: Uuid,
        plan_type: String,
        pool_id: i32,
        queue_id: i32,
        queue_time: DateTime<Utc>,
        receive_time: DateTime<Utc>,
        request_id: i64,
        reserved_agent: TaskAgentReference,
        result: TaskResult,
        scope_id: Uuid,
        service_owner: Uuid,
        status_message: String,
        user_delayed: bool,
    }
}

contract! {
    TaskAgentPoolMaintenanceSchedule("taskAgent.TaskAgentPoolMaintenanceSchedule") {
        days_to_build: TaskAgentPoolMaintenanceScheduleDays,
        schedule_job_id: Uuid,
        start_hours: i32,
        start_minutes: i32,
        time_zone_id: String,
    }
}

contract! {
    TaskAgentPoolMaintenanceOptions("taskAgent.TaskAgentPoolMaintenanceOptions") {
        working_directory_expiration_in_days: i32,
    }
}

contract! {
    TaskAgentPoolMaintenanceRetentionPolicy("taskAgent.TaskAgentPoolMaintenanceRetentionPolicy") {
        number_of_history_records_to_keep: i32,
    }
}

contract! {
    TaskAgentPoolMaintenanceDefinition("taskAgent.TaskAgentPoolMaintenanceDefinition") {
        enabled: bool,
        id: i32,
        job_timeout_in_minutes: i32,
        max_concurrent_agents_percentage: i32,
        options: TaskAgentPoolMaintenanceOptions,
        pool: TaskAgentPoolReference,
        retention_policy: TaskAgentPoolMaintenanceRetentionPolicy,
        schedule_setting: TaskAgentPoolMaintenanceSchedule,
    }
}

contract! {
    TaskAgentPoolMaintenanceJobTargetAgent("taskAgent.TaskAgentPoolMaintenanceJobTargetAgent") {
        agent: TaskAgentReference,
        job_id: i32,
        result: TaskAgentPoolMaintenanceJobResult,
        status: TaskAgentPoolMaintenanceJobStatus,
    }
}

contract! {
    TaskAgentPoolMaintenanceJob("taskAgent.TaskAgentPoolMaintenanceJob") {
        definition_id: i32,
        error_count: i32,
        finish_time: DateTime<Utc>,
        job_id: i32,
        logs_download_url: String,
        orchestration_id: Uuid,
        pool: TaskAgentPoolReference,
        queue_time: DateTime<Utc>,
        requested_by: IdentityRef,
        result: TaskAgentPoolMaintenanceJobResult,
        start_time: DateTime<Utc>,
        status: TaskAgentPoolMaintenanceJobStatus,
        target_agents: Vec<TaskAgentPoolMaintenanceJobTargetAgent>,
        warning_count: i32,
    }
}

contract! {
    VariableValue("taskAgent.VariableValue") {
        is_read_only: bool,
        is_secret: bool,
        value: String,
    }
}

contract! {
    VariableGroup("taskAgent.VariableGroup") {
        created_by: IdentityRef,
        created_on: DateTime<Utc>,
        description: String,
        id: i32,
        is_shared: bool,
        modified_by: IdentityRef,
        modified_on: DateTime<Utc>,
        name: String,
        provider_data: Value,
        r#type: String,
        variables: IndexMap<String, VariableValue>,
    }
}

impl VariableGroup {
    /// Plain value of a non-secret variable.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        let variable = self.variables.as_ref()?.get(name)?;
        if variable.is_secret == Some(true) {
            return None;
        }
        variable.value.as_deref()
    }
}

contract! {
    TaskAgentQueue("taskAgent.TaskAgentQueue") {
        id: i32,
        name: String,
        pool: TaskAgentPoolReference,
        project_id: Uuid,
    }
}

pub(crate) fn register(registry: &mut SchemaRegistry) {
    registry
        .enumeration::<TaskAgentStatus>()
        .enumeration::<TaskAgentPoolType>()
        .enumeration::<TaskAgentPoolOptions>()
        .enumeration::<TaskAgentPoolMaintenanceScheduleDays>()
        .enumeration::<TaskAgentPoolMaintenanceJobStatus>()
        .enumeration::<TaskAgentPoolMaintenanceJobResult>()
        .enumeration::<TaskAgentJobResultFilter>()
        .enumeration::<TaskAgentUpdateReasonType>()
        .enumeration::<VariableGroupType>();

    registry
        .contract::<TaskAgentPoolReference, _>(|t| {
            t.enumeration("options", TaskAgentPoolOptions::ENUM_NAME)
                .enumeration("poolType", TaskAgentPoolType::ENUM_NAME)
        })
        .contract::<TaskAgentPool, _>(|t| {
            t.date("createdOn")
                .enumeration("options", TaskAgentPoolOptions::ENUM_NAME)
                .enumeration("poolType", TaskAgentPoolType::ENUM_NAME)
        })
        .contract::<TaskAgentReference, _>(|t| {
            t.enumeration("status", TaskAgentStatus::ENUM_NAME)
        })
        .contract::<TaskAgentUpdateReason, _>(|t| {
            t.enumeration("code", TaskAgentUpdateReasonType::ENUM_NAME)
        })
        .contract::<TaskAgentUpdate, _>(|t| {
            t.object("reason", TaskAgentUpdateReason::TYPE_NAME)
                .date("requestTime")
        })
        .plain::<TaskAgentAuthorization>()
        .contract::<TaskAgent, _>(|t| {
            t.object("assignedRequest", TaskAgentJobRequest::TYPE_NAME)
                .date("createdOn")
                .object("lastCompletedRequest", TaskAgentJobRequest::TYPE_NAME)
                .object("pendingUpdate", TaskAgentUpdate::TYPE_NAME)
                .enumeration("status", TaskAgentStatus::ENUM_NAME)
                .date("statusChangedOn")
        })
        .plain::<TaskOrchestrationOwner>()
        .contract::<TaskAgentJobRequest, _>(|t| {
            t.date("assignTime")
                .date("finishTime")
                .date("lockedUntil")
                .array("matchedAgents", TaskAgentReference::TYPE_NAME)
                .date("queueTime")
                .date("receiveTime")
                .object("reservedAgent", TaskAgentReference::TYPE_NAME)
                .enumeration("result", TaskResult::ENUM_NAME)
        })
        .contract::<TaskAgentPoolMaintenanceSchedule, _>(|t| {
            t.enumeration("daysToBuild", TaskAgentPoolMaintenanceScheduleDays::ENUM_NAME)
        })
        .plain::<TaskAgentPoolMaintenanceOptions>()
        .plain::<TaskAgentPoolMaintenanceRetentionPolicy>()
        .contract::<TaskAgentPoolMaintenanceDefinition, _>(|t| {
            t.object("pool", TaskAgentPoolReference::TYPE_NAME)
                .object("scheduleSetting", TaskAgentPoolMaintenanceSchedule::TYPE_NAME)
        })
        .contract::<TaskAgentPoolMaintenanceJobTargetAgent, _>(|t| {
            t.object("agent", TaskAgentReference::TYPE_NAME)
                .enumeration("result", TaskAgentPoolMaintenanceJobResult::ENUM_NAME)
                .enumeration("status", TaskAgentPoolMaintenanceJobStatus::ENUM_NAME)
        })
        .contract::<TaskAgentPoolMaintenanceJob, _>(|t| {
            t.date("finishTime")
                .object("pool", TaskAgentPoolReference::TYPE_NAME)
                .date("queueTime")
                .enumeration("result", TaskAgentPoolMaintenanceJobResult::ENUM_NAME)
                .date("startTime")
                .enumeration("status", TaskAgentPoolMaintenanceJobStatus::ENUM_NAME)
                .array("targetAgents", TaskAgentPoolMaintenanceJobTargetAgent::TYPE_NAME)
        })
        .plain::<VariableValue>()
        .contract::<VariableGroup, _>(|t| {
            t.date("createdOn").date("modifiedOn").dictionary(
                "variables",
                None,
                Some(FieldKind::object(VariableValue::TYPE_NAME)),
            )
        })
        .contract::<TaskAgentQueue, _>(|t| t.object("pool", TaskAgentPoolReference::TYPE_NAME));
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::decoder::{from_value, list_from_value};

    #[test]
    fn agent_with_assigned_request_decodes() {
        let agent: TaskAgent = from_value(&json!({
            "id": 3,
            "name": "build-agent-03",
            "status": "online",
            "enabled": true,
            "systemCapabilities": {"Agent.OS": "Linux", "docker": "24.0"},
            "userCapabilities": {"docker": "25.0"},
            "assignedRequest": {
                "requestId": 9001,
                "queueTime": "2024-05-05T05:05:05Z",
                "result": "succeededWithIssues",
                "reservedAgent": {"id": 3, "status": 2}
            }
        }))
        .unwrap();

        assert!(agent.is_online());
        assert_eq!(agent.capability("docker"), Some("25.0"));
        assert_eq!(agent.capability("Agent.OS"), Some("Linux"));
        assert_eq!(agent.capability("java"), None);
        let request = agent.assigned_request.unwrap();
        assert_eq!(request.request_id, Some(9001));
        assert_eq!(request.result, Some(TaskResult::SucceededWithIssues));
        assert_eq!(
            request.reserved_agent.and_then(|a| a.status),
            Some(TaskAgentStatus::Online)
        );
    }

    #[test]
    fn maintenance_schedule_days_decode_as_flags() {
        let definition: TaskAgentPoolMaintenanceDefinition = from_value(&json!({
            "enabled": true,
            "pool": {"id": 1, "poolType": "automation", "options": "elasticPool, singleUseAgents"},
            "scheduleSetting": {"daysToBuild": "saturday, sunday", "startHours": 2}
        }))
        .unwrap();

        let days = definition.schedule_setting.unwrap().days_to_build.unwrap();
        assert_eq!(days.bits(), 96);
        assert_eq!(days.names(), vec!["saturday", "sunday"]);
        let pool = definition.pool.unwrap();
        assert_eq!(pool.pool_type, Some(TaskAgentPoolType::Automation));
        assert!(pool.options.unwrap().contains(TaskAgentPoolOptions::SINGLE_USE_AGENTS));
    }

    #[test]
    fn variable_groups_hide_secrets() {
        let groups: Vec<VariableGroup> = list_from_value(&json!({
            "count": 1,
            "value": [{
                "name": "release",
                "modifiedOn": "2024-01-01T00:00:00Z",
                "variables": {
                    "environment": {"value": "prod"},
                    "token": {"isSecret": true}
                }
            }]
        }))
        .unwrap();

        assert_eq!(groups[0].value_of("environment"), Some("prod"));
        assert_eq!(groups[0].value_of("token"), None);
        assert_eq!(groups[0].value_of("missing"), None);
    }
}
