//! Builds, definitions, timelines and artifacts.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use super::{common::IdentityRef, core::TeamProjectReference, Contract, PropertyBag};
use crate::{
    enums::ContractEnum,
    schema::{FieldKind, SchemaRegistry},
};

contract_enum! {
    /// Current state of a build. `All` only appears in query filters.
    BuildStatus("build.BuildStatus") {
        None = 0 => "none",
        InProgress = 1 => "inProgress",
        Completed = 2 => "completed",
        Cancelling = 4 => "cancelling",
        /// Build is inactive in the queue.
        Postponed = 8 => "postponed",
        NotStarted = 32 => "notStarted",
        All = 47 => "all",
    }
}

contract_flags! {
    /// Outcome of a build. Query filters combine several outcomes.
    BuildResult("build.BuildResult") {
        NONE = 0 => "none",
        SUCCEEDED = 2 => "succeeded",
        /// At least one step failed but the build was allowed to continue.
        PARTIALLY_SUCCEEDED = 4 => "partiallySucceeded",
        FAILED = 8 => "failed",
        CANCELED = 32 => "canceled",
    }
}

contract_flags! {
    /// Why a build was queued. `TRIGGERED` covers every automatic reason.
    BuildReason("build.BuildReason") {
        NONE = 0 => "none",
        MANUAL = 1 => "manual",
        /// Continuous integration, one build per check-in.
        INDIVIDUAL_CI = 2 => "individualCI",
        /// Continuous integration, batched check-ins.
        BATCHED_CI = 4 => "batchedCI",
        SCHEDULE = 8 => "schedule",
        /// Scheduled even without changes.
        SCHEDULE_FORCED = 16 => "scheduleForced",
        USER_CREATED = 32 => "userCreated",
        VALIDATE_SHELVESET = 64 => "validateShelveset",
        /// Gated check-in.
        CHECK_IN_SHELVESET = 128 => "checkInShelveset",
        PULL_REQUEST = 256 => "pullRequest",
        BUILD_COMPLETION = 512 => "buildCompletion",
        RESOURCE_TRIGGER = 1024 => "resourceTrigger",
        TRIGGERED = 1967 => "triggered",
        ALL = 2031 => "all",
    }
}

contract_enum! {
    QueuePriority("build.QueuePriority") {
        Low = 5 => "low",
        BelowNormal = 4 => "belowNormal",
        Normal = 3 => "normal",
        AboveNormal = 2 => "aboveNormal",
        High = 1 => "high",
    }
}

contract_flags! {
    QueueOptions("build.QueueOptions") {
        NONE = 0 => "none",
        /// Create a plan id without running the build.
        DO_NOT_RUN = 1 => "doNotRun",
    }
}

contract_flags! {
    /// What to remove when a build is deleted.
    DeleteOptions("build.DeleteOptions") {
        NONE = 0 => "none",
        DROP_LOCATION = 1 => "dropLocation",
        TEST_RESULTS = 2 => "testResults",
        LABEL = 4 => "label",
        /// The build record itself.
        DETAILS = 8 => "details",
        SYMBOLS = 16 => "symbols",
        ALL = 31 => "all",
    }
}

contract_enum! {
    DefinitionQuality("build.DefinitionQuality") {
        Definition = 1 => "definition",
        Draft = 2 => "draft",
    }
}

contract_enum! {
    /// Whether a definition accepts queued builds.
    DefinitionQueueStatus("build.DefinitionQueueStatus") {
        Enabled = 0 => "enabled",
        /// Builds queue but are not started.
        Paused = 1 => "paused",
        Disabled = 2 => "disabled",
    }
}

contract_enum! {
    DefinitionType("build.DefinitionType") {
        Xaml = 1 => "xaml",
        Build = 2 => "build",
    }
}

contract_enum! {
    DefinitionQueryOrder("build.DefinitionQueryOrder") {
        None = 0 => "none",
        LastModifiedAscending = 1 => "lastModifiedAscending",
        LastModifiedDescending = 2 => "lastModifiedDescending",
        DefinitionNameAscending = 3 => "definitionNameAscending",
        DefinitionNameDescending = 4 => "definitionNameDescending",
    }
}

contract_enum! {
    BuildQueryOrder("build.BuildQueryOrder") {
        FinishTimeAscending = 2 => "finishTimeAscending",
        FinishTimeDescending = 3 => "finishTimeDescending",
        QueueTimeDescending = 4 => "queueTimeDescending",
        QueueTimeAscending = 5 => "queueTimeAscending",
        StartTimeDescending = 6 => "startTimeDescending",
        StartTimeAscending = 7 => "startTimeAscending",
    }
}

contract_enum! {
    BuildAuthorizationScope("build.BuildAuthorizationScope") {
        ProjectCollection = 1 => "projectCollection",
        Project = 2 => "project",
    }
}

contract_enum! {
    /// Result of a task or timeline record.
    TaskResult("build.TaskResult") {
        Succeeded = 0 => "succeeded",
        SucceededWithIssues = 1 => "succeededWithIssues",
        Failed = 2 => "failed",
        Canceled = 3 => "canceled",
        Skipped = 4 => "skipped",
        Abandoned = 5 => "abandoned",
    }
}

contract_enum! {
    TimelineRecordState("build.TimelineRecordState") {
        Pending = 0 => "pending",
        InProgress = 1 => "inProgress",
        Completed = 2 => "completed",
    }
}

contract_enum! {
    IssueType("build.IssueType") {
        Error = 1 => "error",
        Warning = 2 => "warning",
    }
}

contract_enum! {
    ValidationResult("build.ValidationResult") {
        Ok = 0 => "oK",
        Warning = 1 => "warning",
        Error = 2 => "error",
    }
}

contract_enum! {
    ControllerStatus("build.ControllerStatus") {
        /// No controller connection.
        Unavailable = 0 => "unavailable",
        Available = 1 => "available",
        /// Controller is offline by the administrator.
        Offline = 2 => "offline",
    }
}

contract_enum! {
    RepositoryCleanOptions("build.RepositoryCleanOptions") {
        Source = 0 => "source",
        SourceAndOutputDir = 1 => "sourceAndOutputDir",
        /// Re-create the sources directory.
        SourceDir = 2 => "sourceDir",
        /// Re-create the whole build directory.
        AllBuildDir = 3 => "allBuildDir",
    }
}

contract_flags! {
    ScheduleDays("build.ScheduleDays") {
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

contract_flags! {
    /// Trigger kinds; `NONE` is the historical value 1.
    DefinitionTriggerType("build.DefinitionTriggerType") {
        NONE = 1 => "none",
        CONTINUOUS_INTEGRATION = 2 => "continuousIntegration",
        BATCHED_CONTINUOUS_INTEGRATION = 4 => "batchedContinuousIntegration",
        SCHEDULE = 8 => "schedule",
        GATED_CHECK_IN = 16 => "gatedCheckIn",
        BATCHED_GATED_CHECK_IN = 32 => "batchedGatedCheckIn",
        PULL_REQUEST = 64 => "pullRequest",
        BUILD_COMPLETION = 128 => "buildCompletion",
        ALL = 255 => "all",
    }
}

contract! {
    TaskAgentPoolReference("build.TaskAgentPoolReference") {
        id: i32,
        is_hosted: bool,
        name: String,
    }
}

contract! {
    /// Agent queue a build runs on.
    AgentPoolQueue("build.AgentPoolQueue") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        id: i32,
        name: String,
        pool: TaskAgentPoolReference,
        url: String,
    }
}

contract! {
    DefinitionReference("build.DefinitionReference") {
        created_date: DateTime<Utc>,
        id: i32,
        name: String,
        /// Folder path of the definition.
        path: String,
        project: TeamProjectReference,
        queue_status: DefinitionQueueStatus,
        revision: i32,
        r#type: DefinitionType,
        uri: String,
        url: String,
    }
}

contract! {
    BuildMetric("build.BuildMetric") {
        date: DateTime<Utc>,
        int_value: i32,
        name: String,
        /// e.g. `refs/heads/main`.
        scope: String,
    }
}

contract! {
    /// Definition reference with its latest builds and drafts.
    BuildDefinitionReference("build.BuildDefinitionReference") {
        created_date: DateTime<Utc>,
        id: i32,
        name: String,
        path: String,
        project: TeamProjectReference,
        queue_status: DefinitionQueueStatus,
        revision: i32,
        r#type: DefinitionType,
        uri: String,
        url: String,
        #[serde(rename = "_links")]
        links: PropertyBag,
        authored_by: IdentityRef,
        draft_of: DefinitionReference,
        drafts: Vec<DefinitionReference>,
        latest_build: Box<Build>,
        latest_completed_build: Box<Build>,
        metrics: Vec<BuildMetric>,
        quality: DefinitionQuality,
        queue: AgentPoolQueue,
    }
}

contract! {
    BuildController("build.BuildController") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        created_date: DateTime<Utc>,
        description: String,
        enabled: bool,
        id: i32,
        name: String,
        status: ControllerStatus,
        updated_date: DateTime<Utc>,
        uri: String,
        url: String,
    }
}

contract! {
    BuildLogReference("build.BuildLogReference") {
        id: i32,
        /// Log storage type, e.g. `Container`.
        r#type: String,
        url: String,
    }
}

contract! {
    BuildLog("build.BuildLog") {
        id: i32,
        r#type: String,
        url: String,
        created_on: DateTime<Utc>,
        last_changed_on: DateTime<Utc>,
        line_count: i64,
    }
}

contract! {
    TaskOrchestrationPlanReference("build.TaskOrchestrationPlanReference") {
        orchestration_type: i32,
        plan_id: Uuid,
    }
}

contract! {
    BuildRepository("build.BuildRepository") {
        checkout_submodules: bool,
        clean: String,
        default_branch: String,
        id: String,
        name: String,
        properties: IndexMap<String, String>,
        root_folder: String,
        /// `TfsGit`, `TfsVersionControl`, `GitHub`, ...
        r#type: String,
        url: String,
    }
}

contract! {
    BuildRequestValidationResult("build.BuildRequestValidationResult") {
        message: String,
        result: ValidationResult,
    }
}

contract! {
    /// A build run.
    Build("build.Build") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        build_number: String,
        build_number_revision: i32,
        controller: BuildController,
        definition: DefinitionReference,
        deleted: bool,
        deleted_by: IdentityRef,
        deleted_date: DateTime<Utc>,
        deleted_reason: String,
        finish_time: DateTime<Utc>,
        id: i32,
        keep_forever: bool,
        last_changed_by: IdentityRef,
        last_changed_date: DateTime<Utc>,
        logs: BuildLogReference,
        orchestration_plan: TaskOrchestrationPlanReference,
        /// JSON-encoded queue-time parameters.
        parameters: String,
        plans: Vec<TaskOrchestrationPlanReference>,
        priority: QueuePriority,
        project: TeamProjectReference,
        properties: PropertyBag,
        quality: String,
        queue: AgentPoolQueue,
        queue_options: QueueOptions,
        queue_position: i32,
        queue_time: DateTime<Utc>,
        reason: BuildReason,
        repository: BuildRepository,
        requested_by: IdentityRef,
        requested_for: IdentityRef,
        result: BuildResult,
        retained_by_release: bool,
        source_branch: String,
        source_version: String,
        start_time: DateTime<Utc>,
        status: BuildStatus,
        tags: Vec<String>,
        template_parameters: IndexMap<String, String>,
        trigger_info: IndexMap<String, String>,
        triggered_by_build: Box<Build>,
        uri: String,
        url: String,
        validation_results: Vec<BuildRequestValidationResult>,
    }
}

impl Build {
    pub fn is_completed(&self) -> bool {
        self.status == Some(BuildStatus::Completed)
    }

    /// Time spent running, when both ends are known.
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.finish_time? - self.start_time?)
    }
}

contract! {
    TimelineReference("build.TimelineReference") {
        change_id: i32,
        id: Uuid,
        url: String,
    }
}

contract! {
    TimelineAttempt("build.TimelineAttempt") {
        attempt: i32,
        record_id: Uuid,
        timeline_id: Uuid,
    }
}

contract! {
    TaskReference("build.TaskReference") {
        id: Uuid,
        name: String,
        version: String,
    }
}

contract! {
    Issue("build.Issue") {
        category: String,
        data: IndexMap<String, String>,
        message: String,
        r#type: IssueType,
    }
}

contract! {
    /// One stage, job or task of a build.
    TimelineRecord("build.TimelineRecord") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        attempt: i32,
        change_id: i32,
        current_operation: String,
        details: TimelineReference,
        error_count: i32,
        finish_time: DateTime<Utc>,
        id: Uuid,
        identifier: String,
        issues: Vec<Issue>,
        last_modified: DateTime<Utc>,
        log: BuildLogReference,
        name: String,
        order: i32,
        parent_id: Uuid,
        percent_complete: i32,
        previous_attempts: Vec<TimelineAttempt>,
        queue_id: i32,
        result: TaskResult,
        result_code: String,
        start_time: DateTime<Utc>,
        state: TimelineRecordState,
        task: TaskReference,
        /// `Stage`, `Phase`, `Job`, `Task`, ...
        r#type: String,
        url: String,
        warning_count: i32,
        worker_name: String,
    }
}

contract! {
    Timeline("build.Timeline") {
        change_id: i32,
        id: Uuid,
        url: String,
        last_changed_by: Uuid,
        last_changed_on: DateTime<Utc>,
        records: Vec<TimelineRecord>,
    }
}

impl Timeline {
    /// Records whose parent is `parent_id`, in server order.
    pub fn children_of(&self, parent_id: Uuid) -> impl Iterator<Item = &TimelineRecord> {
        self.records
            .iter()
            .flatten()
            .filter(move |record| record.parent_id == Some(parent_id))
    }
}

contract! {
    /// A source change associated with a build.
    Change("build.Change") {
        author: IdentityRef,
        display_uri: String,
        id: String,
        location: String,
        message: String,
        message_truncated: bool,
        pusher: String,
        timestamp: DateTime<Utc>,
        r#type: String,
    }
}

contract! {
    ArtifactResource("build.ArtifactResource") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        data: String,
        download_url: String,
        properties: IndexMap<String, String>,
        r#type: String,
        url: String,
    }
}

contract! {
    BuildArtifact("build.BuildArtifact") {
        id: i32,
        name: String,
        resource: ArtifactResource,
        source: String,
    }
}

contract! {
    Schedule("build.Schedule") {
        branch_filters: Vec<String>,
        days_to_build: ScheduleDays,
        schedule_job_id: Uuid,
        schedule_only_with_changes: bool,
        start_hours: i32,
        start_minutes: i32,
        time_zone_id: String,
    }
}

contract! {
    /// Union of the trigger shapes, discriminated by `trigger_type`.
    BuildTrigger("build.BuildTrigger") {
        trigger_type: DefinitionTriggerType,
        branch_filters: Vec<String>,
        path_filters: Vec<String>,
        batch_changes: bool,
        max_concurrent_builds_per_branch: i32,
        schedules: Vec<Schedule>,
        settings_source_type: i32,
    }
}

contract! {
    BuildDefinitionVariable("build.BuildDefinitionVariable") {
        allow_override: bool,
        is_secret: bool,
        value: String,
    }
}

contract! {
    /// Full build definition.
    BuildDefinition("build.BuildDefinition") {
        created_date: DateTime<Utc>,
        id: i32,
        name: String,
        path: String,
        project: TeamProjectReference,
        queue_status: DefinitionQueueStatus,
        revision: i32,
        r#type: DefinitionType,
        uri: String,
        url: String,
        #[serde(rename = "_links")]
        links: PropertyBag,
        authored_by: IdentityRef,
        quality: DefinitionQuality,
        queue: AgentPoolQueue,
        badge_enabled: bool,
        build_number_format: String,
        comment: String,
        description: String,
        job_authorization_scope: BuildAuthorizationScope,
        job_cancel_timeout_in_minutes: i32,
        job_timeout_in_minutes: i32,
        options: Vec<Value>,
        /// Designer or YAML process; shape depends on its `type`.
        process: Value,
        properties: PropertyBag,
        repository: BuildRepository,
        tags: Vec<String>,
        triggers: Vec<BuildTrigger>,
        variables: IndexMap<String, BuildDefinitionVariable>,
    }
}

contract! {
    Folder("build.Folder") {
        created_by: IdentityRef,
        created_on: DateTime<Utc>,
        description: String,
        last_changed_by: IdentityRef,
        last_changed_date: DateTime<Utc>,
        path: String,
        project: TeamProjectReference,
    }
}

contract! {
    BuildBadge("build.BuildBadge") {
        build_id: i32,
        image_url: String,
    }
}

pub(crate) fn register(registry: &mut SchemaRegistry) {
    registry
        .enumeration::<BuildStatus>()
        .enumeration::<BuildResult>()
        .enumeration::<BuildReason>()
        .enumeration::<QueuePriority>()
        .enumeration::<QueueOptions>()
        .enumeration::<DeleteOptions>()
        .enumeration::<DefinitionQuality>()
        .enumeration::<DefinitionQueueStatus>()
        .enumeration::<DefinitionType>()
        .enumeration::<DefinitionQueryOrder>()
        .enumeration::<BuildQueryOrder>()
        .enumeration::<BuildAuthorizationScope>()
        .enumeration::<TaskResult>()
        .enumeration::<TimelineRecordState>()
        .enumeration::<IssueType>()
        .enumeration::<ValidationResult>()
        .enumeration::<ControllerStatus>()
        .enumeration::<RepositoryCleanOptions>()
        .enumeration::<ScheduleDays>()
        .enumeration::<DefinitionTriggerType>();

    registry
        .plain::<TaskAgentPoolReference>()
        .plain::<AgentPoolQueue>()
        .contract::<DefinitionReference, _>(|t| {
            t.date("createdDate")
                .object("project", TeamProjectReference::TYPE_NAME)
                .enumeration("queueStatus", DefinitionQueueStatus::ENUM_NAME)
                .enumeration("type", DefinitionType::ENUM_NAME)
        })
        .contract::<BuildMetric, _>(|t| t.date("date"))
        .contract::<BuildDefinitionReference, _>(|t| {
            t.date("createdDate")
                .object("draftOf", DefinitionReference::TYPE_NAME)
                .array("drafts", DefinitionReference::TYPE_NAME)
                .object("latestBuild", Build::TYPE_NAME)
                .object("latestCompletedBuild", Build::TYPE_NAME)
                .array("metrics", BuildMetric::TYPE_NAME)
                .object("project", TeamProjectReference::TYPE_NAME)
                .enumeration("quality", DefinitionQuality::ENUM_NAME)
                .enumeration("queueStatus", DefinitionQueueStatus::ENUM_NAME)
                .enumeration("type", DefinitionType::ENUM_NAME)
        })
        .contract::<BuildController, _>(|t| {
            t.date("createdDate")
                .enumeration("status", ControllerStatus::ENUM_NAME)
                .date("updatedDate")
        })
        .plain::<BuildLogReference>()
        .contract::<BuildLog, _>(|t| t.date("createdOn").date("lastChangedOn"))
        .plain::<TaskOrchestrationPlanReference>()
        .plain::<BuildRepository>()
        .contract::<BuildRequestValidationResult, _>(|t| {
            t.enumeration("result", ValidationResult::ENUM_NAME)
        })
        .contract::<Build, _>(|t| {
            t.object("controller", BuildController::TYPE_NAME)
                .object("definition", DefinitionReference::TYPE_NAME)
                .date("deletedDate")
                .date("finishTime")
                .date("lastChangedDate")
                .enumeration("priority", QueuePriority::ENUM_NAME)
                .object("project", TeamProjectReference::TYPE_NAME)
                .enumeration("queueOptions", QueueOptions::ENUM_NAME)
                .date("queueTime")
                .enumeration("reason", BuildReason::ENUM_NAME)
                .enumeration("result", BuildResult::ENUM_NAME)
                .date("startTime")
                .enumeration("status", BuildStatus::ENUM_NAME)
                .object("triggeredByBuild", Build::TYPE_NAME)
                .array("validationResults", BuildRequestValidationResult::TYPE_NAME)
        })
        .plain::<TimelineReference>()
        .plain::<TimelineAttempt>()
        .plain::<TaskReference>()
        .contract::<Issue, _>(|t| t.enumeration("type", IssueType::ENUM_NAME))
        .contract::<TimelineRecord, _>(|t| {
            t.date("finishTime")
                .array("issues", Issue::TYPE_NAME)
                .date("lastModified")
                .enumeration("result", TaskResult::ENUM_NAME)
                .date("startTime")
                .enumeration("state", TimelineRecordState::ENUM_NAME)
        })
        .contract::<Timeline, _>(|t| {
            t.date("lastChangedOn")
                .array("records", TimelineRecord::TYPE_NAME)
        })
        .contract::<Change, _>(|t| t.date("timestamp"))
        .plain::<ArtifactResource>()
        .plain::<BuildArtifact>()
        .contract::<Schedule, _>(|t| t.enumeration("daysToBuild", ScheduleDays::ENUM_NAME))
        .contract::<BuildTrigger, _>(|t| {
            t.enumeration("triggerType", DefinitionTriggerType::ENUM_NAME)
                .array("schedules", Schedule::TYPE_NAME)
        })
        .plain::<BuildDefinitionVariable>()
        .contract::<BuildDefinition, _>(|t| {
            t.date("createdDate")
                .enumeration("jobAuthorizationScope", BuildAuthorizationScope::ENUM_NAME)
                .object("project", TeamProjectReference::TYPE_NAME)
                .enumeration("quality", DefinitionQuality::ENUM_NAME)
                .enumeration("queueStatus", DefinitionQueueStatus::ENUM_NAME)
                .array("triggers", BuildTrigger::TYPE_NAME)
                .enumeration("type", DefinitionType::ENUM_NAME)
                .dictionary(
                    "variables",
                    None,
                    Some(FieldKind::object(BuildDefinitionVariable::TYPE_NAME)),
                )
        })
        .contract::<Folder, _>(|t| {
            t.date("createdOn")
                .date("lastChangedDate")
                .object("project", TeamProjectReference::TYPE_NAME)
        })
        .plain::<BuildBadge>();
}
