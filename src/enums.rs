//! Enumerations and flag sets shared by every contract area.
//!
//! Wire values are 32-bit integers. Two shapes exist:
//!
//! - `contract_enum!` declares a discriminant enum with an `Other(i32)`
//!   variant, so values added by newer servers survive a round trip.
//! - `contract_flags!` declares a `bitflags` set whose constants combine with
//!   `|`, and which keeps unknown bits.
//!
//! Both serialize as integers and accept integers or member names on input.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};

/// Common surface of every generated enum and flag set.
pub trait ContractEnum: Copy {
    /// Qualified schema name, e.g. `build.BuildStatus`.
    const ENUM_NAME: &'static str;
    /// Member table in declaration order: camelCase wire name and value.
    const MEMBERS: &'static [(&'static str, i32)];
    /// Whether values combine as bit flags.
    const FLAGS: bool;

    fn value(self) -> i32;

    fn from_value(value: i32) -> Self;
}

/// Look up a member value by name. Exact match wins, then a case-insensitive one.
pub fn lookup_value<S: AsRef<str>>(members: &[(S, i32)], name: &str) -> Option<i32> {
    let name = name.trim();
    members
        .iter()
        .find(|(member, _)| member.as_ref() == name)
        .or_else(|| {
            members
                .iter()
                .find(|(member, _)| member.as_ref().eq_ignore_ascii_case(name))
        })
        .map(|(_, value)| *value)
}

/// Parse a wire string into a value.
///
/// Accepts a member name, a numeric string, and for flag sets a
/// comma-separated list of either.
pub fn parse_enum<S: AsRef<str>>(members: &[(S, i32)], input: &str, flags: bool) -> Option<i32> {
    let trimmed = input.trim();
    if let Some(value) = lookup_value(members, trimmed) {
        return Some(value);
    }
    if let Ok(value) = trimmed.parse::<i32>() {
        return Some(value);
    }
    if flags && trimmed.contains(',') {
        let mut bits = 0;
        for part in trimmed.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            bits |= lookup_value(members, part).or_else(|| part.parse::<i32>().ok())?;
        }
        return Some(bits);
    }
    None
}

/// Render a value as its member name.
///
/// Flag sets without an exact member decompose greedily from the largest
/// member down and render as `"a, b"` in ascending order. Returns `None` when
/// the value (or some of its bits) has no name.
pub fn format_enum<S: AsRef<str>>(members: &[(S, i32)], value: i32, flags: bool) -> Option<String> {
    if let Some((name, _)) = members.iter().find(|(_, member)| *member == value) {
        return Some(name.as_ref().to_string());
    }
    if !flags || value <= 0 {
        return None;
    }

    let mut candidates: Vec<(&str, i32)> = members
        .iter()
        .filter(|(_, bits)| *bits > 0)
        .map(|(name, bits)| (name.as_ref(), *bits))
        .collect();
    candidates.sort_by(|a, b| b.1.cmp(&a.1));

    let mut remaining = value;
    let mut names = Vec::new();
    for (name, bits) in candidates {
        if remaining & bits == bits {
            remaining &= !bits;
            names.push(name);
        }
        if remaining == 0 {
            break;
        }
    }
    if remaining != 0 {
        return None;
    }
    names.reverse();
    Some(names.join(", "))
}

/// Serde entry point shared by the enum macros.
pub(crate) fn deserialize_member<'de, D>(
    deserializer: D,
    enum_name: &'static str,
    members: &'static [(&'static str, i32)],
    flags: bool,
) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    struct MemberVisitor {
        enum_name: &'static str,
        members: &'static [(&'static str, i32)],
        flags: bool,
    }

    impl<'de> Visitor<'de> for MemberVisitor {
        type Value = i32;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "an integer or member name of {}", self.enum_name)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i32, E> {
            i32::try_from(v)
                .map_err(|_| E::custom(format!("{v} is out of range for {}", self.enum_name)))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i32, E> {
            i32::try_from(v)
                .map_err(|_| E::custom(format!("{v} is out of range for {}", self.enum_name)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i32, E> {
            parse_enum(self.members, v, self.flags)
                .ok_or_else(|| E::custom(format!("{v:?} is not a member of {}", self.enum_name)))
        }
    }

    deserializer.deserialize_any(MemberVisitor {
        enum_name,
        members,
        flags,
    })
}

/// Declare a discriminant enum with stable wire values.
///
/// ```ignore
/// contract_enum! {
///     /// Build queue priority.
///     QueuePriority("build.QueuePriority") {
///         Low = 5 => "low",
///         High = 1 => "high",
///     }
/// }
/// ```
macro_rules! contract_enum {
    (
        $(#[$meta:meta])*
        $name:ident($enum_name:literal) {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = $value:literal => $wire:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
            /// A value this version of the contracts does not know.
            Other(i32),
        }

        impl $name {
            pub const fn value(self) -> i32 {
                match self {
                    $( $name::$variant => $value, )+
                    $name::Other(value) => value,
                }
            }

            pub fn from_value(value: i32) -> Self {
                match value {
                    $( $value => $name::$variant, )+
                    other => $name::Other(other),
                }
            }

            /// Wire name, or `None` for values outside the table.
            pub fn name(self) -> Option<&'static str> {
                match self {
                    $( $name::$variant => Some($wire), )+
                    $name::Other(_) => None,
                }
            }

            /// Case-insensitive lookup by wire name.
            pub fn from_name(name: &str) -> Option<Self> {
                $crate::enums::lookup_value(
                    <Self as $crate::enums::ContractEnum>::MEMBERS,
                    name,
                )
                .map(Self::from_value)
            }

            pub fn is_known(self) -> bool {
                !matches!(self, $name::Other(_))
            }
        }

        impl $crate::enums::ContractEnum for $name {
            const ENUM_NAME: &'static str = $enum_name;
            const MEMBERS: &'static [(&'static str, i32)] = &[ $( ($wire, $value), )+ ];
            const FLAGS: bool = false;

            fn value(self) -> i32 {
                $name::value(self)
            }

            fn from_value(value: i32) -> Self {
                $name::from_value(value)
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                $name::from_value(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.value()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self.name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "{}", self.value()),
                }
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_i32(self.value())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                $crate::enums::deserialize_member(
                    deserializer,
                    $enum_name,
                    <Self as $crate::enums::ContractEnum>::MEMBERS,
                    false,
                )
                .map(Self::from_value)
            }
        }
    };
}

/// Declare a bit-flag set with stable wire values.
///
/// Set algebra comes from `bitflags`; the wire-name table drives display,
/// parsing and serde. Unknown bits are retained.
macro_rules! contract_flags {
    (
        $(#[$meta:meta])*
        $name:ident($enum_name:literal) {
            $(
                $(#[$($flag_meta:tt)*])*
                $flag:ident = $value:literal => $wire:literal,
            )+
        }
    ) => {
        ::bitflags::bitflags! {
            $(#[$meta])*
            #[derive(Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name: i32 {
                $(
                    $(#[$($flag_meta)*])*
                    const $flag = $value;
                )+
            }
        }

        impl $name {
            /// Names of the single-bit members that are set.
            pub fn names(self) -> Vec<&'static str> {
                <Self as $crate::enums::ContractEnum>::MEMBERS
                    .iter()
                    .filter(|(_, bits)| *bits > 0 && bits & (bits - 1) == 0)
                    .filter(|(_, bits)| self.bits() & bits == *bits)
                    .map(|(name, _)| *name)
                    .collect()
            }

            /// Parse a wire name or a comma-separated list of them.
            pub fn from_wire_name(name: &str) -> Option<Self> {
                $crate::enums::parse_enum(
                    <Self as $crate::enums::ContractEnum>::MEMBERS,
                    name,
                    true,
                )
                .map(Self::from_bits_retain)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::empty()
            }
        }

        impl $crate::enums::ContractEnum for $name {
            const ENUM_NAME: &'static str = $enum_name;
            const MEMBERS: &'static [(&'static str, i32)] = &[ $( ($wire, $value), )+ ];
            const FLAGS: bool = true;

            fn value(self) -> i32 {
                self.bits()
            }

            fn from_value(value: i32) -> Self {
                Self::from_bits_retain(value)
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self::from_bits_retain(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.bits()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match $crate::enums::format_enum(
                    <Self as $crate::enums::ContractEnum>::MEMBERS,
                    self.bits(),
                    true,
                ) {
                    Some(names) => f.write_str(&names),
                    None => write!(f, "{}", self.bits()),
                }
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_i32(self.bits())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                $crate::enums::deserialize_member(
                    deserializer,
                    $enum_name,
                    <Self as $crate::enums::ContractEnum>::MEMBERS,
                    true,
                )
                .map(Self::from_bits_retain)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    contract_enum! {
        /// Test-only discriminant.
        Shade("test.Shade") {
            Light = 0 => "light",
            Dark = 1 => "dark",
            Unset = -1 => "unset",
        }
    }

    contract_flags! {
        /// Test-only flags.
        Perms("test.Perms") {
            NONE = 0 => "none",
            READ = 1 => "read",
            WRITE = 2 => "write",
            EXECUTE = 4 => "execute",
            ALL = 7 => "all",
        }
    }

    #[test]
    fn discriminant_keeps_unknown_values() {
        assert_eq!(Shade::from_value(1), Shade::Dark);
        assert_eq!(Shade::from_value(-1), Shade::Unset);
        assert_eq!(Shade::from_value(42), Shade::Other(42));
        assert_eq!(Shade::Other(42).value(), 42);
        assert!(!Shade::Other(42).is_known());
        assert_eq!(Shade::Other(42).to_string(), "42");
    }

    #[test]
    fn discriminant_names_are_case_insensitive() {
        assert_eq!(Shade::from_name("DARK"), Some(Shade::Dark));
        assert_eq!(Shade::from_name("dark"), Some(Shade::Dark));
        assert_eq!(Shade::from_name("dim"), None);
        assert_eq!(Shade::Dark.to_string(), "dark");
    }

    #[test]
    fn discriminant_serde_accepts_numbers_and_names() {
        let from_number: Shade = serde_json::from_str("1").unwrap();
        let from_name: Shade = serde_json::from_str("\"Dark\"").unwrap();
        let unknown: Shade = serde_json::from_str("9").unwrap();
        assert_eq!(from_number, Shade::Dark);
        assert_eq!(from_name, Shade::Dark);
        assert_eq!(unknown, Shade::Other(9));
        assert_eq!(serde_json::to_string(&Shade::Unset).unwrap(), "-1");
        assert!(serde_json::from_str::<Shade>("\"dim\"").is_err());
        assert!(serde_json::from_str::<Shade>("4294967296").is_err());
    }

    #[test]
    fn flags_set_operations() {
        let rw = Perms::READ | Perms::WRITE;
        assert!(rw.contains(Perms::READ));
        assert!(!rw.contains(Perms::EXECUTE));
        assert!(rw.intersects(Perms::WRITE | Perms::EXECUTE));
        assert_eq!(rw.intersection(Perms::WRITE | Perms::EXECUTE), Perms::WRITE);
        assert_eq!(rw.union(Perms::EXECUTE), Perms::ALL);
        assert_eq!(Perms::ALL.difference(Perms::WRITE).bits(), 5);

        let mut perms = Perms::empty();
        assert!(perms.is_empty());
        perms |= Perms::EXECUTE;
        perms.insert(Perms::READ);
        perms.remove(Perms::EXECUTE);
        assert_eq!(perms, Perms::READ);
    }

    #[test]
    fn flags_display_decomposes_like_the_server() {
        assert_eq!(Perms::ALL.to_string(), "all");
        assert_eq!((Perms::READ | Perms::EXECUTE).to_string(), "read, execute");
        assert_eq!(Perms::NONE.to_string(), "none");
        assert_eq!(Perms::from_bits_retain(8).to_string(), "8");
        assert_eq!(format!("{:?}", Perms::WRITE), "Perms(write)");
    }

    #[test]
    fn flags_parse_comma_separated_names() {
        assert_eq!(Perms::from_wire_name("read, Write"), Some(Perms::READ | Perms::WRITE));
        assert_eq!(Perms::from_wire_name("all"), Some(Perms::ALL));
        assert_eq!(Perms::from_wire_name("read, 8").map(|perms| perms.bits()), Some(9));
        assert_eq!(Perms::from_wire_name("read, fly"), None);

        let parsed: Perms = serde_json::from_str("\"execute, read\"").unwrap();
        assert_eq!(parsed, Perms::READ | Perms::EXECUTE);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "5");
    }

    #[test]
    fn flags_retain_unknown_bits() {
        let odd = Perms::from_bits_retain(8) | Perms::READ;
        assert_eq!(odd.bits(), 9);
        assert!(odd.contains(Perms::READ));
        assert_eq!(Perms::from_bits(8), None);
        assert_eq!(Perms::from_bits_truncate(9), Perms::READ);
        assert_eq!(Perms::default(), Perms::empty());

        let wire = serde_json::to_string(&odd).unwrap();
        assert_eq!(wire, "9");
        assert_eq!(serde_json::from_str::<Perms>(&wire).unwrap(), odd);
        assert_eq!(<Perms as ContractEnum>::from_value(9), odd);
    }

    #[test]
    fn flags_names_lists_single_bits() {
        assert_eq!(Perms::ALL.names(), vec!["read", "write", "execute"]);
        assert!(Perms::NONE.names().is_empty());
    }

    #[test]
    fn format_enum_rejects_partially_named_values() {
        let members = [("a", 1), ("b", 2)];
        assert_eq!(format_enum(&members, 3, true).as_deref(), Some("a, b"));
        assert_eq!(format_enum(&members, 5, true), None);
        assert_eq!(format_enum(&members, 3, false), None);
    }
}
