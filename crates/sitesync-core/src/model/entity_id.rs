// ── Core identity type ──
//
// Every list entity carries an EntityId at all times. Records born
// locally get a `Pending` id from a process-wide counter; the store
// assigns the real integer id on insert, and the dispatcher swaps the
// pending id for the assigned one exactly once.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Process-wide counter for pending ids. Starts at 1 so a pending id is
/// never the zero value.
static NEXT_PENDING: AtomicU64 = AtomicU64::new(1);

/// Canonical identifier for any list entity.
///
/// `Assigned` wraps the store's integer primary key. `Pending` wraps a
/// client-generated placeholder that exists only between an optimistic
/// `add` and its acknowledgment -- the two are distinguishable by type,
/// so a placeholder can never be mistaken for a persisted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    Assigned(i64),
    Pending(u64),
}

impl EntityId {
    /// Mint a fresh pending id from the process-wide counter.
    pub fn next_pending() -> Self {
        Self::Pending(NEXT_PENDING.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_assigned(&self) -> Option<i64> {
        match self {
            Self::Assigned(n) => Some(*n),
            Self::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assigned(n) => write!(f, "{n}"),
            Self::Pending(n) => write!(f, "tmp-{n}"),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self::Assigned(n)
    }
}

impl FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("tmp-") {
            Some(rest) => Ok(Self::Pending(rest.parse()?)),
            None => Ok(Self::Assigned(s.parse()?)),
        }
    }
}

// An assigned id serializes as the bare integer (what the store sends
// and expects); a pending id serializes as a marked string so it can
// round-trip through UI-shaped JSON without colliding with real ids.

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Assigned(n) => serializer.serialize_i64(*n),
            Self::Pending(n) => serializer.serialize_str(&format!("tmp-{n}")),
        }
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = EntityId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer id or a \"tmp-N\" placeholder")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<EntityId, E> {
                Ok(EntityId::Assigned(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<EntityId, E> {
                i64::try_from(v)
                    .map(EntityId::Assigned)
                    .map_err(|_| E::custom("id out of range"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<EntityId, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn pending_ids_are_unique() {
        let a = EntityId::next_pending();
        let b = EntityId::next_pending();
        assert_ne!(a, b);
        assert!(a.is_pending());
    }

    #[test]
    fn assigned_serializes_as_integer() {
        let json = serde_json::to_value(EntityId::Assigned(42)).unwrap();
        assert_eq!(json, serde_json::json!(42));
    }

    #[test]
    fn pending_serializes_as_marked_string() {
        let json = serde_json::to_value(EntityId::Pending(7)).unwrap();
        assert_eq!(json, serde_json::json!("tmp-7"));
    }

    #[test]
    fn round_trips_both_variants() {
        for id in [EntityId::Assigned(9), EntityId::Pending(3)] {
            let json = serde_json::to_value(id).unwrap();
            let back: EntityId = serde_json::from_value(json).unwrap();
            assert_eq!(back, id);
        }
    }

    #[test]
    fn parses_from_display_form() {
        let id: EntityId = "tmp-5".parse().unwrap();
        assert_eq!(id, EntityId::Pending(5));
        let id: EntityId = "18".parse().unwrap();
        assert_eq!(id, EntityId::Assigned(18));
    }
}
