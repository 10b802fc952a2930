// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

use dashmap::DashMap;

use crate::model::value::Value;

/// Shared key-value state visible to every leaf of a running tree.
///
/// Reads of a missing key answer `None`, never an error.
#[derive(Debug, Default)]
pub struct Blackboard {
    entries: DashMap<String, Value>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) {
        let _ = self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|pair| pair.value().clone())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.entries.remove(key).map(|(_, v)| v)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.as_f64())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Blackboard;
    use crate::model::Value;

    #[test]
    fn test_typed_access() {
        let bb = Blackboard::new();
        bb.insert("docked", true);
        bb.insert("battery", 0.87);
        bb.insert("waypoint", "dock");
        bb.insert("joint_targets", vec![0.0, 1.57, -0.3]);

        assert_eq!(bb.get_bool("docked"), Some(true));
        assert_eq!(bb.get_f64("battery"), Some(0.87));
        assert_eq!(
            bb.get("waypoint").as_ref().and_then(Value::as_str),
            Some("dock")
        );
        assert_eq!(
            bb.get("joint_targets")
                .as_ref()
                .and_then(Value::as_f64_array)
                .map(<[f64]>::len),
            Some(3)
        );

        // Missing keys and type mismatches both answer None.
        assert_eq!(bb.get("missing"), None);
        assert_eq!(bb.get_bool("battery"), None);
    }

    #[test]
    fn test_overwrite_and_remove() {
        let bb = Blackboard::new();
        bb.insert("retries", 1i64);
        bb.insert("retries", 2i64);
        assert_eq!(bb.get("retries").and_then(|v| v.as_i64()), Some(2));

        assert!(bb.remove("retries").is_some());
        assert!(bb.is_empty());
    }
}
