//! User profiles and avatars.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Contract;
use crate::{enums::ContractEnum, schema::SchemaRegistry};

contract_enum! {
    AvatarSize("profile.AvatarSize") {
        Small = 0 => "small",
        Medium = 1 => "medium",
        Large = 2 => "large",
    }
}

contract_enum! {
    ProfileState("profile.ProfileState") {
        Custom = 0 => "custom",
        CustomReadOnly = 1 => "customReadOnly",
        ReadOnly = 2 => "readOnly",
    }
}

contract! {
    Avatar("profile.Avatar") {
        is_auto_generated: bool,
        size: AvatarSize,
        time_stamp: DateTime<Utc>,
        /// Base64 image bytes.
        value: String,
    }
}

contract! {
    CoreProfileAttributes("profile.CoreProfileAttributes") {
        avatar: Avatar,
        contact_with_offers: bool,
        date_first_created: DateTime<Utc>,
        display_name: String,
        email_address: String,
        unconfirmed_email_address: String,
    }
}

contract! {
    Profile("profile.Profile") {
        application_container: super::PropertyBag,
        core_attributes: super::PropertyBag,
        core_revision: i32,
        display_name: String,
        email_address: String,
        id: Uuid,
        profile_state: ProfileState,
        public_alias: String,
        revision: i32,
        time_stamp: DateTime<Utc>,
    }
}

contract! {
    Country("profile.Country") {
        code: String,
        english_name: String,
    }
}

contract! {
    ProfileRegion("profile.ProfileRegion") {
        code: String,
        name: String,
    }
}

contract! {
    ProfileRegions("profile.ProfileRegions") {
        notice_contact_consent_requirement_regions: Vec<String>,
        opt_out_contact_consent_requirement_regions: Vec<String>,
        regions: Vec<ProfileRegion>,
    }
}

contract! {
    GeoRegion("profile.GeoRegion") {
        region_code: String,
    }
}

pub(crate) fn register(registry: &mut SchemaRegistry) {
    registry
        .enumeration::<AvatarSize>()
        .enumeration::<ProfileState>()
        .contract::<Avatar, _>(|t| {
            t.enumeration("size", AvatarSize::ENUM_NAME)
                .date("timeStamp")
        })
        .contract::<CoreProfileAttributes, _>(|t| {
            t.object("avatar", Avatar::TYPE_NAME)
                .date("dateFirstCreated")
        })
        .contract::<Profile, _>(|t| {
            t.enumeration("profileState", ProfileState::ENUM_NAME)
                .date("timeStamp")
        })
        .plain::<Country>()
        .plain::<ProfileRegion>()
        .plain::<ProfileRegions>()
        .plain::<GeoRegion>();
}
