//! Server-originated messages

use replicant_core::ChangeOp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages the authoritative process sends to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Snapshot handshake: sent once per (session, name) after a declare,
    /// and again after a reconnect re-declare
    #[serde(rename_all = "camelCase")]
    Declared {
        namespace: String,
        name: String,
        value: Value,
        revision: u64,
    },

    /// Acknowledgment of a whole-value assignment, scoped to the
    /// originating session only
    #[serde(rename_all = "camelCase")]
    AssignmentAccepted {
        namespace: String,
        name: String,
        new_value: Value,
        revision: u64,
    },

    /// Incremental change notification, delivered to every session that
    /// declared this replicant
    #[serde(rename_all = "camelCase")]
    Change {
        namespace: String,
        name: String,
        old_value: Value,
        new_value: Value,
        operations: Vec<ChangeOp>,
        revision: u64,
    },

    /// Response to a one-shot read; `value` is absent for unknown names
    #[serde(rename_all = "camelCase")]
    ReadResult {
        namespace: String,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },

    #[serde(rename_all = "camelCase")]
    Error { code: String, message: String },
}

impl ServerMessage {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(namespace: &str, name: &str) -> Self {
        ServerMessage::Error {
            code: "NOT_FOUND".into(),
            message: format!("Replicant not found: {}/{}", namespace, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_wire_shape() {
        let msg = ServerMessage::Change {
            namespace: "test-bundle".into(),
            name: "clientObjTest".into(),
            old_value: json!({"a": {"b": {"c": "c"}}}),
            new_value: json!({"a": {"b": {"c": "x"}}}),
            operations: vec![ChangeOp::update("a.b.c", json!("c"), json!("x"))],
            revision: 1,
        };

        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "change",
                "namespace": "test-bundle",
                "name": "clientObjTest",
                "oldValue": {"a": {"b": {"c": "c"}}},
                "newValue": {"a": {"b": {"c": "x"}}},
                "operations": [
                    {"type": "update", "path": "a.b.c", "oldValue": "c", "newValue": "x"}
                ],
                "revision": 1,
            })
        );
    }

    #[test]
    fn test_assignment_accepted_shape() {
        let msg = ServerMessage::AssignmentAccepted {
            namespace: "test-bundle".into(),
            name: "clientAssignmentTest".into(),
            new_value: json!("assignmentOK"),
            revision: 1,
        };

        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "assignmentAccepted",
                "namespace": "test-bundle",
                "name": "clientAssignmentTest",
                "newValue": "assignmentOK",
                "revision": 1,
            })
        );
    }

    #[test]
    fn test_not_found_is_a_coded_error() {
        assert_eq!(
            ServerMessage::not_found("test-bundle", "ghost"),
            ServerMessage::error("NOT_FOUND", "Replicant not found: test-bundle/ghost")
        );
    }

    #[test]
    fn test_read_result_omits_absent_value() {
        let msg = ServerMessage::ReadResult {
            namespace: "ns".into(),
            name: "ghost".into(),
            value: None,
        };

        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "readResult", "namespace": "ns", "name": "ghost"})
        );
    }
}
