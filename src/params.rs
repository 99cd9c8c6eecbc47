//! Design parameters driving a garment program.
//!
//! Parameters form a JSON tree whose leaves look like
//! `{ "v": 12.5, "range": [10, 20], "type": "float", "default_prob": 0.3 }`.
//! Leaves are addressed by dotted paths such as `"waist.width"`. A document
//! wrapped in a top-level `"design"` object is unwrapped on load.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ParamError, Result, SeamlineError};

/// One design parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignParam {
    /// Current value.
    pub v: Value,
    /// Admissible values: bounds for numbers, options for selections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Vec<Value>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Probability of keeping the default value when sampling designs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_prob: Option<f64>,
}

/// A tree of design parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignParams {
    tree: Map<String, Value>,
}

fn is_leaf(node: &Value) -> bool {
    node.as_object().is_some_and(|o| o.contains_key("v"))
}

impl DesignParams {
    /// Parses a parameter document.
    ///
    /// # Errors
    ///
    /// Returns a serialization error for malformed JSON and
    /// [`ParamError::Mistyped`] if the document is not an object.
    pub fn parse(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text)?;
        let Value::Object(mut tree) = root else {
            return Err(ParamError::Mistyped {
                path: String::new(),
                expected: "parameter object",
            }
            .into());
        };
        let wrapped = tree.len() == 1
            && tree
                .get("design")
                .is_some_and(|d| d.is_object() && !is_leaf(d));
        if wrapped {
            if let Some(Value::Object(design)) = tree.remove("design") {
                tree = design;
            }
        }
        Ok(Self { tree })
    }

    fn node(&self, path: &str) -> Result<&Value> {
        let mut parts = path.split('.');
        let first = parts.next().unwrap_or_default();
        let mut node = self
            .tree
            .get(first)
            .ok_or_else(|| ParamError::Missing(path.to_owned()))?;
        for part in parts {
            node = node
                .get(part)
                .ok_or_else(|| ParamError::Missing(path.to_owned()))?;
        }
        Ok(node)
    }

    fn node_mut(&mut self, path: &str) -> Result<&mut Value> {
        let mut parts = path.split('.');
        let first = parts.next().unwrap_or_default();
        let mut node = self
            .tree
            .get_mut(first)
            .ok_or_else(|| ParamError::Missing(path.to_owned()))?;
        for part in parts {
            node = node
                .get_mut(part)
                .ok_or_else(|| ParamError::Missing(path.to_owned()))?;
        }
        Ok(node)
    }

    /// The parameter at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Missing`] if nothing is stored there and
    /// [`ParamError::Mistyped`] if the node is a group rather than a leaf.
    pub fn get(&self, path: &str) -> Result<DesignParam> {
        let node = self.node(path)?;
        if !is_leaf(node) {
            return Err(ParamError::Mistyped {
                path: path.to_owned(),
                expected: "parameter leaf",
            }
            .into());
        }
        Ok(serde_json::from_value(node.clone())?)
    }

    fn value(&self, path: &str) -> Result<&Value> {
        let node = self.node(path)?;
        node.get("v").ok_or_else(|| {
            ParamError::Mistyped {
                path: path.to_owned(),
                expected: "parameter leaf",
            }
            .into()
        })
    }

    /// Numeric value at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Missing`] or [`ParamError::Mistyped`].
    pub fn get_f64(&self, path: &str) -> Result<f64> {
        self.value(path)?.as_f64().ok_or_else(|| {
            ParamError::Mistyped {
                path: path.to_owned(),
                expected: "number",
            }
            .into()
        })
    }

    /// Boolean value at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Missing`] or [`ParamError::Mistyped`].
    pub fn get_bool(&self, path: &str) -> Result<bool> {
        self.value(path)?.as_bool().ok_or_else(|| {
            ParamError::Mistyped {
                path: path.to_owned(),
                expected: "boolean",
            }
            .into()
        })
    }

    /// String value at `path`, as used by selection parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Missing`] or [`ParamError::Mistyped`].
    pub fn get_str(&self, path: &str) -> Result<&str> {
        self.value(path)?.as_str().ok_or_else(|| {
            ParamError::Mistyped {
                path: path.to_owned(),
                expected: "string",
            }
            .into()
        })
    }

    /// Replaces the value at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Missing`] unless a leaf exists at `path`.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        let node = self.node_mut(path)?;
        match node.as_object_mut() {
            Some(leaf) if leaf.contains_key("v") => {
                leaf.insert("v".to_owned(), value.into());
                Ok(())
            }
            _ => Err(ParamError::Mistyped {
                path: path.to_owned(),
                expected: "parameter leaf",
            }
            .into()),
        }
    }

    /// Dotted paths of all leaves, in document order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        fn walk(prefix: &str, node: &Map<String, Value>, out: &mut Vec<String>) {
            for (key, child) in node {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                if is_leaf(child) {
                    out.push(path);
                } else if let Value::Object(group) = child {
                    walk(&path, group, out);
                }
            }
        }
        let mut out = Vec::new();
        walk("", &self.tree, &mut out);
        out
    }

    /// Serializes the tree back to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.tree)?)
    }
}

impl FromStr for DesignParams {
    type Err = SeamlineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
