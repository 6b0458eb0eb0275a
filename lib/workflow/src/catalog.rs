//! Node kind catalog.
//!
//! The catalog is the single lookup table that maps each [`NodeKind`] to its
//! canonical port shape, the parameters it must carry, and the parameters a
//! freshly created node starts with. Both validators read it; hosts can
//! extend or override it through [`CatalogConfig`] without touching the
//! validation algorithms.

use crate::error::CatalogError;
use crate::node::{Node, NodeKind, Params};
use crate::port::{DataType, InputPort, NodePorts, OutputPort};
use rootcause::Report;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// The default input handle id.
pub const DEFAULT_INPUT: &str = "in";
/// The default output handle id.
pub const DEFAULT_OUTPUT: &str = "out";

static BUILTIN: LazyLock<NodeCatalog> =
    LazyLock::new(|| NodeCatalog::with_default_handles(DEFAULT_INPUT, DEFAULT_OUTPUT));

static NO_PORTS: NodePorts = NodePorts {
    inputs: Vec::new(),
    outputs: Vec::new(),
};

/// Everything the catalog knows about one node kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KindSchema {
    /// Canonical ports for nodes of this kind that do not store their own.
    #[serde(default)]
    pub ports: NodePorts,
    /// Parameter names that must be present and truthy.
    #[serde(default)]
    pub required_params: Vec<String>,
    /// Parameters given to newly created nodes.
    #[serde(default)]
    pub default_params: Params,
}

/// The node kind lookup table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeCatalog {
    default_input: String,
    default_output: String,
    kinds: BTreeMap<NodeKind, KindSchema>,
}

impl NodeCatalog {
    /// Returns the shared builtin catalog.
    #[must_use]
    pub fn builtin() -> &'static NodeCatalog {
        &BUILTIN
    }

    /// Builds the builtin table using the given default handle ids.
    #[must_use]
    pub fn with_default_handles(input: &str, output: &str) -> Self {
        let single = |out: DataType, required: &str, default: serde_json::Value| KindSchema {
            ports: NodePorts::new(
                vec![InputPort::required(input, DataType::Any)],
                vec![OutputPort::new(output, out)],
            ),
            required_params: vec![required.to_string()],
            default_params: params(required, default),
        };

        let mut kinds = BTreeMap::new();
        kinds.insert(
            NodeKind::Trigger,
            KindSchema {
                ports: NodePorts::new(vec![], vec![OutputPort::new(output, DataType::Event)]),
                required_params: vec!["name".to_string()],
                default_params: params("name", json!("New Trigger")),
            },
        );
        kinds.insert(
            NodeKind::Action,
            single(DataType::Json, "name", json!("New Action")),
        );
        kinds.insert(
            NodeKind::Condition,
            KindSchema {
                ports: NodePorts::new(
                    vec![InputPort::required(input, DataType::Any)],
                    vec![
                        OutputPort::new("true", DataType::Any),
                        OutputPort::new("false", DataType::Any),
                    ],
                ),
                required_params: vec!["condition".to_string()],
                default_params: params("condition", json!("true")),
            },
        );
        kinds.insert(
            NodeKind::Transformer,
            single(DataType::Json, "transformation", json!("x => x")),
        );
        kinds.insert(
            NodeKind::Webhook,
            single(DataType::Json, "url", json!("https://example.com/webhook")),
        );

        Self {
            default_input: input.to_string(),
            default_output: output.to_string(),
            kinds,
        }
    }

    /// Builds a catalog from the builtin table with host overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if a default handle is blank, an overridden port
    /// list repeats an id in the same direction, or a required parameter
    /// name is blank.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, Report<CatalogError>> {
        let input = config.default_input.as_deref().unwrap_or(DEFAULT_INPUT);
        let output = config.default_output.as_deref().unwrap_or(DEFAULT_OUTPUT);
        if input.trim().is_empty() || output.trim().is_empty() {
            return Err(CatalogError::BlankDefaultHandle.into());
        }

        let mut catalog = Self::with_default_handles(input, output);
        for (kind, patch) in &config.kinds {
            let schema = catalog.kinds.entry(*kind).or_default();
            if let Some(ports) = &patch.ports {
                if let Some(port) = ports.duplicate_id() {
                    return Err(CatalogError::DuplicatePort {
                        kind: *kind,
                        port: port.to_string(),
                    }
                    .into());
                }
                schema.ports = ports.clone();
            }
            if let Some(required) = &patch.required_params {
                if required.iter().any(|p| p.trim().is_empty()) {
                    return Err(CatalogError::BlankParam { kind: *kind }.into());
                }
                schema.required_params = required.clone();
            }
            if let Some(defaults) = &patch.default_params {
                schema
                    .default_params
                    .extend(defaults.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        Ok(catalog)
    }

    /// The handle id used when a candidate connection omits its target handle.
    #[must_use]
    pub fn default_input(&self) -> &str {
        &self.default_input
    }

    /// The handle id used when a candidate connection omits its source handle.
    #[must_use]
    pub fn default_output(&self) -> &str {
        &self.default_output
    }

    /// Returns the schema for a kind, if the catalog has one.
    #[must_use]
    pub fn schema(&self, kind: NodeKind) -> Option<&KindSchema> {
        self.kinds.get(&kind)
    }

    /// Returns the ports of a node: its stored ports if it has them,
    /// otherwise the canonical ports of its kind.
    #[must_use]
    pub fn ports_of<'a>(&'a self, node: &'a Node) -> &'a NodePorts {
        match &node.ports {
            Some(ports) => ports,
            None => self.schema(node.kind).map_or(&NO_PORTS, |s| &s.ports),
        }
    }

    /// Returns the parameter names a node of this kind must carry.
    #[must_use]
    pub fn required_params(&self, kind: NodeKind) -> &[String] {
        match self.schema(kind) {
            Some(schema) => &schema.required_params,
            None => &[],
        }
    }

    /// Returns the parameters a new node of this kind starts with.
    #[must_use]
    pub fn default_params(&self, kind: NodeKind) -> Params {
        self.schema(kind)
            .map(|s| s.default_params.clone())
            .unwrap_or_default()
    }
}

impl Default for NodeCatalog {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

fn params(key: &str, value: serde_json::Value) -> Params {
    let mut params = Params::new();
    params.insert(key.to_string(), value);
    params
}

/// Host-supplied catalog overrides.
///
/// Every field is optional; anything left out keeps its builtin value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub default_input: Option<String>,
    #[serde(default)]
    pub default_output: Option<String>,
    #[serde(default)]
    pub kinds: BTreeMap<NodeKind, KindOverride>,
}

/// Overrides for one node kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KindOverride {
    /// Replaces the canonical ports.
    #[serde(default)]
    pub ports: Option<NodePorts>,
    /// Replaces the required parameter list.
    #[serde(default)]
    pub required_params: Option<Vec<String>>,
    /// Merged over the builtin default parameters.
    #[serde(default)]
    pub default_params: Option<Params>,
}
