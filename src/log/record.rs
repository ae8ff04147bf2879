//! Record type shared by the primary and every secondary.

use serde::{Deserialize, Serialize};

/// An immutable `(value, offset)` pair.
///
/// Offsets are assigned by [`super::Log::append`]; a record with an
/// unassigned offset (as sent by a client) carries `offset: 0` until the
/// log stamps it — callers MUST NOT rely on that placeholder value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub value: String,
    #[serde(default)]
    pub offset: u64,
}

impl Record {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            offset: 0,
        }
    }

    pub fn with_offset(value: impl Into<String>, offset: u64) -> Self {
        Self {
            value: value.into(),
            offset,
        }
    }
}
