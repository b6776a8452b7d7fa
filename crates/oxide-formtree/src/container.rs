//! Container state and the naming rules of groups and repeats.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::node::NodeKey;
use crate::value::{join_name_tokens, name_tokens, ValueMap};

/// Children of a container plus the lazily built id lookup.
#[derive(Debug, Default)]
pub(crate) struct ContainerState {
    pub(crate) elements: Vec<NodeKey>,
    /// Ids of all descendants; dropped on every mutation below this node.
    pub(crate) lookup: OnceLock<HashMap<String, NodeKey>>,
    pub(crate) repeat: Option<RepeatState>,
}

impl ContainerState {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

/// A repeat renders and validates its prototype once per index.
#[derive(Debug, Clone, Default)]
pub(crate) struct RepeatState {
    /// Field whose submitted keys give the indexes; defaults to the first
    /// named leaf of the prototype.
    pub(crate) index_field: Option<String>,
    pub(crate) indexes: Vec<String>,
    /// Errors found per index by the last validation.
    pub(crate) errors: HashMap<String, Vec<(NodeKey, String)>>,
    /// Aggregated prototype values per index, taken on every refresh.
    pub(crate) snapshots: Vec<IndexSnapshot>,
    /// Base `(name, id)` of descendants while an index is applied.
    pub(crate) applied: HashMap<NodeKey, (Option<String>, String)>,
}

/// Values contributed by the prototype for one repeat index.
#[derive(Debug, Clone, Default)]
pub(crate) struct IndexSnapshot {
    pub(crate) raw: ValueMap,
    pub(crate) filtered: ValueMap,
}

/// Applies a group's name to a child name: `g` + `a[b]` gives `g[a][b]`.
pub(crate) fn prefix_name(group: &str, child: &str) -> String {
    let mut tokens = name_tokens(group);
    tokens.extend(name_tokens(child));
    join_name_tokens(&tokens)
}

/// Removes a group's prefix from a child name, if present.
pub(crate) fn strip_prefix(group: &str, child: &str) -> String {
    let prefix = name_tokens(group);
    let tokens = name_tokens(child);
    if tokens.len() > prefix.len() && tokens[..prefix.len()] == prefix[..] {
        join_name_tokens(&tokens[prefix.len()..])
    } else {
        child.to_string()
    }
}

/// Inserts a repeat index after the first name token: `a[b]` gives `a[idx][b]`.
pub(crate) fn indexed_name(name: &str, index: &str) -> String {
    let mut tokens = name_tokens(name);
    tokens.insert(1, index);
    join_name_tokens(&tokens)
}

/// Valid repeat indexes are made of word characters.
pub(crate) fn is_valid_index(index: &str) -> bool {
    !index.is_empty() && index.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
