//! Wire-level helpers shared by the transfer objects: enumerations that
//! decode case-insensitively and timestamps that tolerate a missing offset.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A wire enumeration value that matched none of the known spellings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Lowercase wire spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Capitalised form for display ("Editor", "Pending").
            pub fn label(self) -> String {
                crate::types::wire::capitalize(self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($text) {
                        return Ok($name::$variant);
                    }
                )+
                Err(UnknownVariant { kind: $kind, value: s.to_string() })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

wire_enum! {
    /// Membership role. The owner role exists once per project and is never
    /// handed out through invitations or direct adds.
    Role, "role" {
        Owner => "owner",
        Editor => "editor",
        Viewer => "viewer",
    }
}

impl Role {
    /// Roles that may be granted by invitation or direct add.
    pub const ASSIGNABLE: [Role; 2] = [Role::Editor, Role::Viewer];

    pub fn is_assignable(self) -> bool {
        self != Role::Owner
    }
}

wire_enum! {
    Visibility, "visibility" {
        Private => "private",
        Public => "public",
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Private
    }
}

wire_enum! {
    /// Invitation lifecycle. `Accepted` and `Rejected` are terminal.
    InvitationStatus, "invitation status" {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
    }
}

impl InvitationStatus {
    pub fn is_terminal(self) -> bool {
        self != InvitationStatus::Pending
    }
}

/// Uppercase the first character and lowercase the rest.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Parse RFC 3339, or a naive ISO-8601 date-time taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// serde adapter for `Option<DateTime<Utc>>` fields.
pub mod timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_decode_case_insensitively() {
        for raw in ["\"editor\"", "\"Editor\"", "\"EDITOR\""] {
            let role: Role = serde_json::from_str(raw).unwrap();
            assert_eq!(role, Role::Editor);
        }
        let status: InvitationStatus = serde_json::from_str("\"Accepted\"").unwrap();
        assert_eq!(status, InvitationStatus::Accepted);
    }

    #[test]
    fn enums_encode_lowercase() {
        assert_eq!(serde_json::to_string(&Visibility::Public).unwrap(), "\"public\"");
        assert_eq!(serde_json::to_string(&Role::Owner).unwrap(), "\"owner\"");
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        let err = "admin".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "unknown role 'admin'");
        assert!(serde_json::from_str::<Visibility>("\"internal\"").is_err());
    }

    #[test]
    fn labels_are_capitalised() {
        assert_eq!(Role::Viewer.label(), "Viewer");
        assert_eq!(capitalize("pENDING"), "Pending");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn owner_is_not_assignable() {
        assert!(!Role::Owner.is_assignable());
        assert!(Role::ASSIGNABLE.iter().all(|r| r.is_assignable()));
    }

    #[test]
    fn timestamps_accept_offsets_and_naive_values() {
        let with_offset = parse_timestamp("2024-05-01T10:00:00+02:00").unwrap();
        let naive = parse_timestamp("2024-05-01T08:00:00.123456").unwrap();
        assert_eq!(with_offset.to_rfc3339(), "2024-05-01T08:00:00+00:00");
        assert_eq!(naive.timestamp(), with_offset.timestamp());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
