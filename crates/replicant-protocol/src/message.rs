//! Client-originated messages

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Requests a remote session may send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Declare (create-or-attach) a replicant and subscribe to it.
    /// `default_value` and `persistent` only take effect if this is the
    /// first declaration process-wide.
    #[serde(rename_all = "camelCase")]
    Declare {
        namespace: String,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_value: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        persistent: Option<bool>,
    },

    /// Whole-value replacement of a declared replicant
    #[serde(rename_all = "camelCase")]
    Assign {
        namespace: String,
        name: String,
        value: Value,
    },

    /// One-shot snapshot read; creates no subscription
    #[serde(rename_all = "camelCase")]
    Read { namespace: String, name: String },
}

impl ClientMessage {
    pub fn declare(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        ClientMessage::Declare {
            namespace: namespace.into(),
            name: name.into(),
            default_value: None,
            persistent: None,
        }
    }

    pub fn assign(
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: Value,
    ) -> Self {
        ClientMessage::Assign {
            namespace: namespace.into(),
            name: name.into(),
            value,
        }
    }

    pub fn read(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        ClientMessage::Read {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}
