//! Slash-delimited partial updates against a JSON tree.
//!
//! The remote store understands two write shapes: `set`, which replaces the
//! value at a path, and `merge`, which shallow-merges object keys at a path.
//! Intermediate objects are created on demand, mirroring how the remote
//! treats writes below missing keys.

use serde::Serialize;
use serde_json::{Map, Value};

/// A single partial write against the replicated tree.
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PathOp {
    Set { path: String, value: Value },
    Merge { path: String, value: Value },
}

impl PathOp {
    pub fn set(path: impl Into<String>, value: &impl Serialize) -> Self {
        PathOp::Set {
            path: path.into(),
            value: to_json(value),
        }
    }

    pub fn merge(path: impl Into<String>, value: &impl Serialize) -> Self {
        PathOp::Merge {
            path: path.into(),
            value: to_json(value),
        }
    }
}

/// A group of partial writes committed as one unit, stamped with the cache
/// version they produced.
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
pub struct UpdateBatch {
    pub version: u64,
    pub ops: Vec<PathOp>,
}

/// Serialization of in-process state cannot fail for tree-shaped types; if it
/// ever does, the op degrades to a null write and the next full snapshot
/// repairs the path.
pub fn to_json<T: Serialize>(value: &T) -> Value {
    match serde_json::to_value(value) {
        Ok(v) => v,
        Err(error) => {
            tracing::error!(%error, "failed to serialize partial update value");
            Value::Null
        }
    }
}

pub fn apply(root: &mut Value, op: &PathOp) {
    match op {
        PathOp::Set { path, value } => {
            *slot(root, path) = value.clone();
        }
        PathOp::Merge { path, value } => {
            let target = slot(root, path);
            match (target.as_object_mut(), value.as_object()) {
                (Some(existing), Some(incoming)) => {
                    for (key, val) in incoming {
                        existing.insert(key.clone(), val.clone());
                    }
                }
                _ => *target = value.clone(),
            }
        }
    }
}

pub fn apply_batch(root: &mut Value, batch: &UpdateBatch) {
    for op in &batch.ops {
        apply(root, op);
    }
    if let Some(obj) = root.as_object_mut() {
        obj.insert("version".to_string(), Value::from(batch.version));
    }
}

/// Walks `a/b/c` into the tree, materializing missing intermediate objects.
fn slot<'a>(root: &'a mut Value, path: &str) -> &'a mut Value {
    let mut current = root;
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        match current {
            Value::Object(map) => {
                current = map.entry(segment.to_string()).or_insert(Value::Null);
            }
            _ => break,
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_creates_intermediate_objects() {
        let mut root = Value::Null;
        apply(
            &mut root,
            &PathOp::set("users/@g::a/inventory", &vec!["br_1"]),
        );

        assert_eq!(root, json!({"users": {"@g::a": {"inventory": ["br_1"]}}}));
    }

    #[test]
    fn set_replaces_wholesale() {
        let mut root = json!({"scores": {"@g::a": 4.0, "@g::b": 1.0}});
        apply(&mut root, &PathOp::set("scores/@g::a", &9.5));

        assert_eq!(root, json!({"scores": {"@g::a": 9.5, "@g::b": 1.0}}));
    }

    #[test]
    fn merge_is_shallow() {
        let mut root = json!({"users": {"@g::a": {"nickname": "a", "avatar_id": "1"}}});
        apply(
            &mut root,
            &PathOp::merge("users/@g::a", &json!({"nickname": "Ana"})),
        );

        assert_eq!(
            root,
            json!({"users": {"@g::a": {"nickname": "Ana", "avatar_id": "1"}}})
        );
    }

    #[test]
    fn batch_stamps_version() {
        let mut root = json!({});
        let batch = UpdateBatch {
            version: 7,
            ops: vec![PathOp::set("scores/@g::a", &1.0)],
        };
        apply_batch(&mut root, &batch);

        assert_eq!(root, json!({"scores": {"@g::a": 1.0}, "version": 7}));
    }
}
