//! Session handler - processes messages and tracks per-session declares

use replicant_core::{
    Broadcast, DeclareOptions, Error as CoreError, Registry, SessionId,
};
use replicant_protocol::{decode_message, ClientMessage, ProtocolError, ServerMessage};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Handles a single session (one connection, or one embedded context)
pub struct SessionHandler {
    session_id: SessionId,
    registry: Arc<Registry>,
    /// (namespace, name) pairs this session has declared; each gets
    /// exactly one `declared` snapshot for the session's lifetime
    declared: HashSet<(String, String)>,
}

impl SessionHandler {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            session_id: SessionId::new(),
            registry,
            declared: HashSet::new(),
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Decode and handle one inbound frame
    pub async fn process(&mut self, frame: &str) -> Vec<ServerMessage> {
        match decode_message(frame) {
            Ok(msg) => self.handle(msg).await,
            Err(ProtocolError::MessageTooLarge { size, max }) => vec![ServerMessage::error(
                "TOO_LARGE",
                format!("Message exceeds size limit: {} > {}", size, max),
            )],
            Err(e) => vec![ServerMessage::error("PARSE_ERROR", e.to_string())],
        }
    }

    /// Handle a single decoded message
    pub async fn handle(&mut self, msg: ClientMessage) -> Vec<ServerMessage> {
        debug!(session = %self.session_id, msg = ?msg, "Processing message");

        match msg {
            ClientMessage::Declare {
                namespace,
                name,
                default_value,
                persistent,
            } => self.handle_declare(namespace, name, default_value, persistent).await,
            ClientMessage::Assign {
                namespace,
                name,
                value,
            } => self.handle_assign(namespace, name, value),
            ClientMessage::Read { namespace, name } => self.handle_read(namespace, name),
        }
    }

    async fn handle_declare(
        &mut self,
        namespace: String,
        name: String,
        default_value: Option<serde_json::Value>,
        persistent: Option<bool>,
    ) -> Vec<ServerMessage> {
        let opts = DeclareOptions {
            default_value,
            persistent: persistent.unwrap_or(true),
            validator: None,
        };

        match self.registry.declare(&namespace, &name, opts).await {
            Ok(record) => {
                if self.declared.insert((namespace.clone(), name.clone())) {
                    let (value, revision) = record.snapshot();
                    vec![ServerMessage::Declared {
                        namespace,
                        name,
                        value,
                        revision,
                    }]
                } else {
                    // Already declared on this session; re-attach silently.
                    Vec::new()
                }
            }
            Err(e) => vec![error_reply(&e)],
        }
    }

    fn handle_assign(
        &self,
        namespace: String,
        name: String,
        value: serde_json::Value,
    ) -> Vec<ServerMessage> {
        match self.registry.assign(&namespace, &name, value) {
            Ok(ack) => vec![ServerMessage::AssignmentAccepted {
                namespace,
                name,
                new_value: ack.new_value,
                revision: ack.revision,
            }],
            Err(e) => vec![error_reply(&e)],
        }
    }

    fn handle_read(&self, namespace: String, name: String) -> Vec<ServerMessage> {
        let value = self.registry.read(&namespace, &name);
        vec![ServerMessage::ReadResult {
            namespace,
            name,
            value,
        }]
    }

    /// Whether this session declared the given replicant
    pub fn wants(&self, namespace: &str, name: &str) -> bool {
        self.declared
            .contains(&(namespace.to_string(), name.to_string()))
    }

    /// Fresh snapshots for every replicant this session declared. Sent
    /// when the session falls behind the fan-out: the client swaps in
    /// each snapshot the same way it handles the declare handshake.
    pub fn resync(&self) -> Vec<ServerMessage> {
        self.declared
            .iter()
            .filter_map(|(namespace, name)| {
                let record = self.registry.get(namespace, name)?;
                let (value, revision) = record.snapshot();
                Some(ServerMessage::Declared {
                    namespace: namespace.clone(),
                    name: name.clone(),
                    value,
                    revision,
                })
            })
            .collect()
    }

    /// Convert a registry broadcast into an outbound message, if this
    /// session subscribed to the record. The originator of an assignment
    /// receives the change too; its ack was a direct reply.
    pub fn forward(&self, broadcast: &Broadcast) -> Option<ServerMessage> {
        match broadcast {
            Broadcast::Change {
                namespace,
                name,
                old_value,
                new_value,
                operations,
                revision,
            } => {
                if !self.wants(namespace, name) {
                    return None;
                }
                Some(ServerMessage::Change {
                    namespace: namespace.clone(),
                    name: name.clone(),
                    old_value: old_value.clone(),
                    new_value: new_value.clone(),
                    operations: operations.clone(),
                    revision: *revision,
                })
            }
        }
    }
}

fn error_reply(e: &CoreError) -> ServerMessage {
    match e {
        CoreError::NotFound { namespace, name } => ServerMessage::not_found(namespace, name),
        CoreError::MissingName => ServerMessage::error("MISSING_NAME", e.to_string()),
        CoreError::InvalidPath(_) => ServerMessage::error("INVALID_PATH", e.to_string()),
        CoreError::Deserialization { .. } => ServerMessage::error("DESERIALIZATION", e.to_string()),
        CoreError::SchemaRejected(_) => ServerMessage::error("SCHEMA_REJECTED", e.to_string()),
        CoreError::Storage(_) => ServerMessage::error("STORAGE", e.to_string()),
    }
}
