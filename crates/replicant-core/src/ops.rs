//! Change operations
//!
//! Every committed mutation is described by an ordered list of these
//! operations. Live tracking and the diff engine emit identical shapes,
//! so consumers cannot distinguish the two origins. The serde
//! representation is the wire format: `{"type":"update","path":...}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single structured change within a committed mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChangeOp {
    /// Scalar or whole-subtree replacement at a dotted key path
    #[serde(rename_all = "camelCase")]
    Update {
        path: String,
        old_value: Value,
        new_value: Value,
    },

    /// Contiguous removal/insertion within a sequence container
    #[serde(rename_all = "camelCase")]
    Splice {
        path: String,
        index: usize,
        removed: Vec<Value>,
        removed_count: usize,
        added: Vec<Value>,
        added_count: usize,
    },
}

impl ChangeOp {
    pub fn update(path: impl Into<String>, old_value: Value, new_value: Value) -> Self {
        ChangeOp::Update {
            path: path.into(),
            old_value,
            new_value,
        }
    }

    pub fn splice(
        path: impl Into<String>,
        index: usize,
        removed: Vec<Value>,
        added: Vec<Value>,
    ) -> Self {
        let removed_count = removed.len();
        let added_count = added.len();
        ChangeOp::Splice {
            path: path.into(),
            index,
            removed,
            removed_count,
            added,
            added_count,
        }
    }

    /// The dotted path this operation applies at
    pub fn path(&self) -> &str {
        match self {
            ChangeOp::Update { path, .. } => path,
            ChangeOp::Splice { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_wire_shape() {
        let op = ChangeOp::update("a.b.c", json!("c"), json!("x"));
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({
                "type": "update",
                "path": "a.b.c",
                "oldValue": "c",
                "newValue": "x",
            })
        );
    }

    #[test]
    fn test_splice_wire_shape() {
        let op = ChangeOp::splice("", 1, vec![], vec![json!("arrPushOK")]);
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({
                "type": "splice",
                "path": "",
                "index": 1,
                "removed": [],
                "removedCount": 0,
                "added": ["arrPushOK"],
                "addedCount": 1,
            })
        );
    }

    #[test]
    fn test_round_trip() {
        let op = ChangeOp::splice("items", 0, vec![json!(1)], vec![json!(2), json!(3)]);
        let encoded = serde_json::to_string(&op).unwrap();
        let decoded: ChangeOp = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, op);
    }
}
