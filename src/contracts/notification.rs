//! Notification subscriptions and delivery statistics.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;

use super::{common::IdentityRef, PropertyBag};
use crate::{enums::ContractEnum, schema::SchemaRegistry};

contract_enum! {
    /// Subscription state. Negative values are disabled states.
    SubscriptionStatus("notification.SubscriptionStatus") {
        /// Disabled after repeated delivery failures.
        JailedByNotificationsVolume = -200 => "jailedByNotificationsVolume",
        /// Pending deletion.
        PendingDeletion = -100 => "pendingDeletion",
        DisabledArgumentException = -12 => "disabledArgumentException",
        DisabledProjectInvalid = -11 => "disabledProjectInvalid",
        DisabledMissingPermissions = -10 => "disabledMissingPermissions",
        DisabledFromProbation = -9 => "disabledFromProbation",
        DisabledInactiveIdentity = -8 => "disabledInactiveIdentity",
        DisabledMessageQueueNotSupported = -7 => "disabledMessageQueueNotSupported",
        DisabledMissingIdentity = -6 => "disabledMissingIdentity",
        DisabledInvalidRoleExpression = -5 => "disabledInvalidRoleExpression",
        DisabledInvalidPathClause = -4 => "disabledInvalidPathClause",
        DisabledAsDuplicateOfDefault = -3 => "disabledAsDuplicateOfDefault",
        DisabledByAdmin = -2 => "disabledByAdmin",
        Disabled = -1 => "disabled",
        Enabled = 0 => "enabled",
        EnabledOnProbation = 1 => "enabledOnProbation",
    }
}

impl SubscriptionStatus {
    pub fn is_enabled(self) -> bool {
        self.value() >= 0
    }
}

contract_flags! {
    SubscriptionFlags("notification.SubscriptionFlags") {
        NONE = 0 => "none",
        /// Subscriber is a group.
        GROUP_SUBSCRIPTION = 1 => "groupSubscription",
        /// Created for the contributing extension.
        CONTRIBUTED_SUBSCRIPTION = 2 => "contributedSubscription",
        CAN_OPT_OUT = 4 => "canOptOut",
        TEAM_SUBSCRIPTION = 8 => "teamSubscription",
        ONE_ACTOR_MATCHES = 16 => "oneActorMatches",
    }
}

contract_flags! {
    SubscriptionPermissions("notification.SubscriptionPermissions") {
        NONE = 0 => "none",
        VIEW = 1 => "view",
        EDIT = 2 => "edit",
        DELETE = 4 => "delete",
    }
}

contract_enum! {
    SubscriberFlags("notification.SubscriberFlags") {
        None = 0 => "none",
        DeliveryPreferencesEditable = 2 => "deliveryPreferencesEditable",
        SupportsPreferredEmailAddressDelivery = 4 => "supportsPreferredEmailAddressDelivery",
        SupportsEachMemberDelivery = 8 => "supportsEachMemberDelivery",
        SupportsNoDelivery = 16 => "supportsNoDelivery",
        IsUser = 32 => "isUser",
        IsGroup = 64 => "isGroup",
        IsTeam = 128 => "isTeam",
    }
}

contract_enum! {
    NotificationStatisticType("notification.NotificationStatisticType") {
        NotificationBySubscription = 0 => "notificationBySubscription",
        EventsByEventType = 1 => "eventsByEventType",
        NotificationByEventType = 2 => "notificationByEventType",
        EventsByEventTypePerUser = 3 => "eventsByEventTypePerUser",
        NotificationByEventTypePerUser = 4 => "notificationByEventTypePerUser",
        Events = 5 => "events",
        Notifications = 6 => "notifications",
        NotificationFailureBySubscription = 7 => "notificationFailureBySubscription",
        UnprocessedRangeStart = 100 => "unprocessedRangeStart",
        UnprocessedEventsByPublisher = 101 => "unprocessedEventsByPublisher",
        UnprocessedEventDelayByPublisher = 102 => "unprocessedEventDelayByPublisher",
        UnprocessedNotificationsByChannelByPublisher = 103 => "unprocessedNotificationsByChannelByPublisher",
        UnprocessedNotificationDelayByChannelByPublisher = 104 => "unprocessedNotificationDelayByChannelByPublisher",
        DelayRangeStart = 200 => "delayRangeStart",
        TotalPipelineTime = 201 => "totalPipelineTime",
        NotificationPipelineTime = 202 => "notificationPipelineTime",
        EventPipelineTime = 203 => "eventPipelineTime",
        HourlyRangeStart = 1000 => "hourlyRangeStart",
        HourlyNotificationBySubscription = 1001 => "hourlyNotificationBySubscription",
        HourlyEventsByEventTypePerUser = 1002 => "hourlyEventsByEventTypePerUser",
        HourlyEvents = 1003 => "hourlyEvents",
        HourlyNotifications = 1004 => "hourlyNotifications",
        HourlyUnprocessedEventsByPublisher = 1101 => "hourlyUnprocessedEventsByPublisher",
        HourlyUnprocessedEventDelayByPublisher = 1102 => "hourlyUnprocessedEventDelayByPublisher",
        HourlyUnprocessedNotificationsByChannelByPublisher = 1103 => "hourlyUnprocessedNotificationsByChannelByPublisher",
        HourlyUnprocessedNotificationDelayByChannelByPublisher = 1104 => "hourlyUnprocessedNotificationDelayByChannelByPublisher",
        HourlyTotalPipelineTime = 1201 => "hourlyTotalPipelineTime",
        HourlyNotificationPipelineTime = 1202 => "hourlyNotificationPipelineTime",
        HourlyEventPipelineTime = 1203 => "hourlyEventPipelineTime",
    }
}

contract_enum! {
    DefaultGroupDeliveryPreference("notification.DefaultGroupDeliveryPreference") {
        NoDelivery = -1 => "noDelivery",
        EachMember = 2 => "eachMember",
    }
}

contract! {
    SubscriptionChannel("notification.SubscriptionChannel") {
        /// Channel kind: `EmailHtml`, `User`, `Group`, `ServiceHooks`, ...
        r#type: String,
        address: String,
        use_custom_address: bool,
    }
}

contract! {
    SubscriptionScope("notification.SubscriptionScope") {
        id: String,
        name: String,
        r#type: String,
    }
}

contract! {
    SubscriptionAdminSettings("notification.SubscriptionAdminSettings") {
        /// Whether members of a group subscription can opt out.
        block_user_opt_out: bool,
    }
}

contract! {
    SubscriptionUserSettings("notification.SubscriptionUserSettings") {
        opted_out: bool,
    }
}

contract! {
    SubscriptionDiagnostics("notification.SubscriptionDiagnostics") {
        delivery_results: Value,
        delivery_tracing: Value,
        evaluation_tracing: Value,
    }
}

contract! {
    NotificationSubscription("notification.NotificationSubscription") {
        #[serde(rename = "_links")]
        links: PropertyBag,
        admin_settings: SubscriptionAdminSettings,
        channel: SubscriptionChannel,
        description: String,
        diagnostics: SubscriptionDiagnostics,
        extended_properties: IndexMap<String, String>,
        filter: Value,
        flags: SubscriptionFlags,
        id: String,
        last_modified_by: IdentityRef,
        modified_date: DateTime<Utc>,
        permissions: SubscriptionPermissions,
        scope: SubscriptionScope,
        status: SubscriptionStatus,
        status_message: String,
        subscriber: IdentityRef,
        url: String,
        user_settings: SubscriptionUserSettings,
    }
}

impl NotificationSubscription {
    pub fn is_group_subscription(&self) -> bool {
        self.flags
            .is_some_and(|flags| flags.contains(SubscriptionFlags::GROUP_SUBSCRIPTION))
    }
}

contract! {
    NotificationSubscriber("notification.NotificationSubscriber") {
        delivery_preference: i32,
        flags: SubscriberFlags,
        id: String,
        preferred_email_address: String,
    }
}

contract! {
    NotificationStatistic("notification.NotificationStatistic") {
        date: DateTime<Utc>,
        hit_count: i32,
        path: String,
        r#type: NotificationStatisticType,
        user: IdentityRef,
    }
}

contract! {
    NotificationEventType("notification.NotificationEventType") {
        alias: String,
        category: Value,
        color: String,
        custom_subscriptions_allowed: bool,
        event_publisher: Value,
        fields: PropertyBag,
        has_initiator: bool,
        icon: String,
        id: String,
        name: String,
        roles: Vec<Value>,
        supported_scopes: Vec<String>,
        url: String,
    }
}

contract! {
    /// Admin defaults for a group subscriber.
    NotificationAdminSettings("notification.NotificationAdminSettings") {
        default_group_delivery_preference: DefaultGroupDeliveryPreference,
    }
}

pub(crate) fn register(registry: &mut SchemaRegistry) {
    registry
        .enumeration::<SubscriptionStatus>()
        .enumeration::<SubscriptionFlags>()
        .enumeration::<SubscriptionPermissions>()
        .enumeration::<SubscriberFlags>()
        .enumeration::<NotificationStatisticType>()
        .enumeration::<DefaultGroupDeliveryPreference>()
        .plain::<SubscriptionChannel>()
        .plain::<SubscriptionScope>()
        .plain::<SubscriptionAdminSettings>()
        .plain::<SubscriptionUserSettings>()
        .plain::<SubscriptionDiagnostics>()
        .contract::<NotificationSubscription, _>(|t| {
            t.enumeration("flags", SubscriptionFlags::ENUM_NAME)
                .date("modifiedDate")
                .enumeration("permissions", SubscriptionPermissions::ENUM_NAME)
                .enumeration("status", SubscriptionStatus::ENUM_NAME)
        })
        .contract::<NotificationSubscriber, _>(|t| {
            t.enumeration("flags", SubscriberFlags::ENUM_NAME)
        })
        .contract::<NotificationStatistic, _>(|t| {
            t.date("date")
                .enumeration("type", NotificationStatisticType::ENUM_NAME)
        })
        .plain::<NotificationEventType>()
        .contract::<NotificationAdminSettings, _>(|t| {
            t.enumeration(
                "defaultGroupDeliveryPreference",
                DefaultGroupDeliveryPreference::ENUM_NAME,
            )
        });
}
