//! Host-shaped records that pass through the access filter.
//!
//! Hosts hand over loosely typed rows (template variables, JSON), so ID
//! fields are kept as raw values and coerced on read.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{MembershipId, MembershipTypeId};

/// One row of a membership search or dashboard listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MembershipRow {
    #[serde(default)]
    pub membership_id: Value,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl MembershipRow {
    pub fn new(membership_id: impl Into<Value>) -> Self {
        Self {
            membership_id: membership_id.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Membership ID as an integer; missing or malformed values read as 0.
    pub fn membership_id(&self) -> MembershipId {
        coerce_id(&self.membership_id)
    }
}

/// One entry of a contact's active membership list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActiveMembership {
    #[serde(default)]
    pub membership_type_id: Value,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ActiveMembership {
    pub fn new(membership_type_id: impl Into<Value>) -> Self {
        Self {
            membership_type_id: membership_type_id.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn membership_type_id(&self) -> Option<MembershipTypeId> {
        Some(coerce_id(&self.membership_type_id)).filter(|id| *id > 0)
    }
}

/// Integer image of a host ID value. Numbers are truncated, numeric strings
/// parsed; everything else is 0, which never matches a stored record.
pub fn coerce_id(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}
