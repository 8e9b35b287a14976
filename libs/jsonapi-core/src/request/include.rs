use std::collections::{BTreeMap, BTreeSet};

/// Relationship paths requested through the `include` query parameter.
///
/// Every node is addressed by its dotted base path; the root is `""`. Parsing
/// `a.b.c` inserts `"" -> {a}`, `"a" -> {b}` and `"a.b" -> {c}`, so each prefix
/// of a requested path is included as well.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncludeTree {
    nodes: BTreeMap<String, BTreeSet<String>>,
}

impl IncludeTree {
    /// Parse a comma-separated list of dotted paths. An empty value yields an
    /// empty tree.
    pub fn parse(include: &str) -> Self {
        let mut tree = Self::default();
        for path in include.split(',') {
            tree.insert_path(path.trim());
        }
        tree
    }

    /// Insert every `(parent path, segment)` pair of one dotted path.
    /// Insertion stops at the first empty segment.
    pub fn insert_path(&mut self, path: &str) {
        let mut base = String::new();
        for segment in path.split('.') {
            let segment = segment.trim();
            if segment.is_empty() {
                break;
            }
            self.nodes
                .entry(base.clone())
                .or_default()
                .insert(segment.to_string());
            if !base.is_empty() {
                base.push('.');
            }
            base.push_str(segment);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Relationship names directly below `base_path`.
    pub fn relationships(&self, base_path: &str) -> Option<&BTreeSet<String>> {
        self.nodes.get(base_path)
    }

    pub fn contains(&self, base_path: &str, name: &str) -> bool {
        self.nodes
            .get(base_path)
            .is_some_and(|names| names.contains(name))
    }

    /// Path of `name` when nested under `base_path`.
    pub fn child_path(base_path: &str, name: &str) -> String {
        if base_path.is_empty() {
            name.to_string()
        } else {
            format!("{base_path}.{name}")
        }
    }
}
