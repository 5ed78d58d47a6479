//! Wire protocol spoken with the producer process.
//!
//! The client only ever sends the literal text [`DATA_REQUEST`]; the producer
//! answers with JSON objects tagged by a `type` field.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

/// Outbound request for a fresh sample snapshot.
pub const DATA_REQUEST: &str = "data";

/// One node of a sampled call tree.
///
/// `value` is the weight reported by the producer (sampled time in
/// nanoseconds for austin). Children are not required to sum to less than
/// their parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameNode {
    pub name: String,
    pub value: u64,
    #[serde(default)]
    pub children: Vec<FrameNode>,
}

impl FrameNode {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<FrameNode>) -> Self {
        self.children = children;
        self
    }

    /// Root shown before any data arrives.
    pub fn placeholder() -> Self {
        Self::new("root", 1)
    }

    /// Number of levels in this subtree, counting `self`.
    pub fn height(&self) -> u32 {
        let mut height = 0;
        let mut pending = vec![(self, 1u32)];
        while let Some((node, level)) = pending.pop() {
            height = height.max(level);
            pending.extend(node.children.iter().map(|c| (c, level + 1)));
        }
        height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleMessage {
    pub data: FrameNode,
    pub height: u32,
    pub samples: u64,
    /// Kept as sent so the status bar can show the producer's own digits.
    pub cpu: Number,
    pub memory: Number,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoMessage {
    pub pid: u32,
    pub command: String,
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Sample(SampleMessage),
    Info(InfoMessage),
    /// Any other `type` (empty when the field is missing or not a string).
    Unknown(String),
}

impl Message {
    pub fn kind(&self) -> &str {
        match self {
            Message::Sample(_) => "sample",
            Message::Info(_) => "info",
            Message::Unknown(kind) => kind,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("invalid `{kind}` payload: {source}")]
    Payload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode one text frame from the producer.
///
/// Call trees nest two JSON levels per frame, so parsing runs without
/// serde_json's depth limit and grows the stack on demand instead.
pub fn decode(text: &str) -> Result<Message, ProtocolError> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))
        .map_err(ProtocolError::Malformed)?;
    de.end().map_err(ProtocolError::Malformed)?;

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match kind.as_str() {
        "sample" => SampleMessage::deserialize(serde_stacker::Deserializer::new(value))
            .map(Message::Sample)
            .map_err(|source| ProtocolError::Payload {
                kind: "sample",
                source,
            }),
        "info" => InfoMessage::deserialize(value)
            .map(Message::Info)
            .map_err(|source| ProtocolError::Payload {
                kind: "info",
                source,
            }),
        _ => Ok(Message::Unknown(kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flame::{FlameTree, NodeId};

    #[test]
    fn decodes_sample_with_nested_tree() {
        let text = r#"{
            "type": "sample",
            "data": {"name": "root", "value": 30, "children": [
                {"name": "MainThread", "value": 30, "children": [
                    {"name": "main (app.py)", "value": 20}
                ]}
            ]},
            "height": 3,
            "samples": 12,
            "cpu": 12.5,
            "memory": 48
        }"#;

        let Message::Sample(sample) = decode(text).unwrap() else {
            panic!("expected a sample");
        };
        assert_eq!(sample.height, 3);
        assert_eq!(sample.samples, 12);
        assert_eq!(sample.data.height(), 3);
        assert_eq!(sample.data.children[0].children[0].name, "main (app.py)");
        assert!(sample.data.children[0].children[0].children.is_empty());
        assert_eq!(sample.cpu.to_string(), "12.5");
        assert_eq!(sample.memory.to_string(), "48");
    }

    fn deep_sample(depth: usize) -> String {
        let mut text = String::from(
            r#"{"type":"sample","height":0,"samples":1,"cpu":1,"memory":1,"data":{"name":"root","value":5,"children":[{"name":"MainThread","value":5,"children":["#,
        );
        for i in 0..depth {
            text.push_str(&format!(r#"{{"name":"f{i}","value":5,"children":["#));
        }
        text.push_str(&"]}".repeat(depth));
        text.push_str("]}]}}");
        text
    }

    #[test]
    fn deep_stacks_decode_and_merge() {
        let Message::Sample(sample) = decode(&deep_sample(600)).unwrap() else {
            panic!("expected a sample");
        };
        assert_eq!(sample.data.height(), 602);

        let mut tree = FlameTree::placeholder();
        tree.merge(&sample.data);
        tree.merge(&sample.data);
        assert_eq!(tree.height(), 602);
        assert_eq!(tree.len(), 602);
        assert_eq!(tree.value(NodeId::ROOT), 11);

        let mut leaf = NodeId::ROOT;
        while let Some(&child) = tree.children(leaf).first() {
            leaf = child;
        }
        assert_eq!(tree.name(leaf), "f599");
        assert_eq!(tree.value(leaf), 10);
        assert_eq!(tree.to_frame_node(NodeId::ROOT).height(), 602);
    }

    #[test]
    fn decodes_info() {
        let msg = decode(r#"{"type":"info","pid":123,"command":"foo"}"#).unwrap();
        assert_eq!(
            msg,
            Message::Info(InfoMessage {
                pid: 123,
                command: "foo".to_string()
            })
        );
    }

    #[test]
    fn unknown_and_missing_types_are_not_errors() {
        assert_eq!(
            decode(r#"{"type":"metrics","x":1}"#).unwrap(),
            Message::Unknown("metrics".to_string())
        );
        assert_eq!(decode(r#"{"pid":1}"#).unwrap().kind(), "");
        assert_eq!(decode("[1, 2]").unwrap().kind(), "");
        assert_eq!(decode(r#"{"type": 7}"#).unwrap().kind(), "");
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            decode("{not json"),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn wrong_shape_for_known_type_names_the_kind() {
        let err = decode(r#"{"type":"info","pid":"abc"}"#).unwrap_err();
        match err {
            ProtocolError::Payload { kind, .. } => assert_eq!(kind, "info"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn placeholder_is_single_unit_root() {
        let root = FrameNode::placeholder();
        assert_eq!(root.name, "root");
        assert_eq!(root.value, 1);
        assert_eq!(root.height(), 1);
    }
}
