//! Port system for workflow nodes.
//!
//! Ports are named connection points on nodes. Each port carries a data type
//! tag; input ports additionally say whether they must be fed (`required`)
//! and whether they accept more than one producer (`multi`).
//!
//! Compatibility is directional: a target port accepts a source port when the
//! types are equal or the target is the wildcard [`DataType::Any`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// The data type carried by a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// A trigger event.
    Event,
    /// Structured JSON payload.
    Json,
    /// Free text.
    Text,
    /// Wildcard: as a target type, accepts every source type.
    Any,
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl DataType {
    /// Returns the lowercase tag used on the wire and in issue messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Json => "json",
            Self::Text => "text",
            Self::Any => "any",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Returns true if a port of this type, used as a connection target,
    /// accepts data produced by a port of type `source`.
    ///
    /// This relation is not symmetric: `any` accepts everything as a target,
    /// but an `any` source only feeds `any` targets.
    #[must_use]
    pub fn accepts(self, source: DataType) -> bool {
        self == Self::Any || self == source
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An input port on a workflow node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPort {
    /// Identifier, unique among the node's inputs.
    pub id: String,
    /// The accepted data type.
    pub dtype: DataType,
    /// Whether this input must have an incoming edge.
    #[serde(default)]
    pub required: bool,
    /// Whether more than one edge may feed this input.
    #[serde(default)]
    pub multi: bool,
}

impl InputPort {
    /// Creates a new required, single-producer input port.
    #[must_use]
    pub fn required(id: impl Into<String>, dtype: DataType) -> Self {
        Self {
            id: id.into(),
            dtype,
            required: true,
            multi: false,
        }
    }

    /// Creates a new optional, single-producer input port.
    #[must_use]
    pub fn optional(id: impl Into<String>, dtype: DataType) -> Self {
        Self {
            id: id.into(),
            dtype,
            required: false,
            multi: false,
        }
    }

    /// Allows any number of incoming edges on this port.
    #[must_use]
    pub fn multi(mut self) -> Self {
        self.multi = true;
        self
    }

    /// Returns true if this input accepts data from `source`.
    #[must_use]
    pub fn accepts(&self, source: &OutputPort) -> bool {
        self.dtype.accepts(source.dtype)
    }
}

/// An output port on a workflow node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPort {
    /// Identifier, unique among the node's outputs.
    pub id: String,
    /// The produced data type.
    pub dtype: DataType,
}

impl OutputPort {
    /// Creates a new output port.
    #[must_use]
    pub fn new(id: impl Into<String>, dtype: DataType) -> Self {
        Self {
            id: id.into(),
            dtype,
        }
    }
}

/// The ordered input and output ports of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePorts {
    #[serde(rename = "in", default)]
    pub inputs: Vec<InputPort>,
    #[serde(rename = "out", default)]
    pub outputs: Vec<OutputPort>,
}

impl NodePorts {
    #[must_use]
    pub fn new(inputs: Vec<InputPort>, outputs: Vec<OutputPort>) -> Self {
        Self { inputs, outputs }
    }

    /// Returns the input port with the given id, if any.
    #[must_use]
    pub fn input(&self, id: &str) -> Option<&InputPort> {
        self.inputs.iter().find(|p| p.id == id)
    }

    /// Returns the output port with the given id, if any.
    #[must_use]
    pub fn output(&self, id: &str) -> Option<&OutputPort> {
        self.outputs.iter().find(|p| p.id == id)
    }

    /// Returns the first port id that appears twice in the same direction.
    pub(crate) fn duplicate_id(&self) -> Option<&str> {
        fn first_dup<'a>(mut ids: impl Iterator<Item = &'a str>) -> Option<&'a str> {
            let mut seen = std::collections::HashSet::new();
            ids.find(|id| !seen.insert(*id))
        }

        first_dup(self.inputs.iter().map(|p| p.id.as_str()))
            .or_else(|| first_dup(self.outputs.iter().map(|p| p.id.as_str())))
    }
}
