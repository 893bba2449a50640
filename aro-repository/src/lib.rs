//! The in-memory repository store (`spec.md` §4.7): a set of named
//! collections of Entity values, namespaced by `(repositoryName,
//! businessActivity)`. Records published with `businessActivity == ""`
//! live in the framework scope and are visible to every activity;
//! activity-scoped records are only visible within that activity.

use aro_value::{Value, ValueMap};
use compact_str::CompactString;
use dashmap::DashMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct StoreResult {
    pub stored: Value,
    pub old: Option<Value>,
    pub is_update: bool,
    pub entity_id: Value,
}

/// Backed by a single `DashMap` keyed on `(repo, activity)` pairs, so
/// distinct repositories/activities shard independently rather than
/// contending on one process-wide lock.
#[derive(Default)]
pub struct RepositoryStore {
    buckets: DashMap<(String, String), Vec<Value>>,
}

impl RepositoryStore {
    pub fn new() -> Self {
        RepositoryStore { buckets: DashMap::new() }
    }

    pub fn is_repository_name(name: &str) -> bool {
        name.ends_with("-repository")
    }

    fn bucket_key(repo: &str, activity: &str) -> (String, String) {
        (repo.to_string(), activity.to_string())
    }

    pub fn store(&self, value: Value, repo: &str, activity: &str) -> StoreResult {
        let mut bucket = self.buckets.entry(Self::bucket_key(repo, activity)).or_default();
        let existing_id = value.field("id").cloned();
        if let Some(id) = existing_id.filter(|id| !id.is_null()) {
            if let Some(slot) = bucket.iter_mut().find(|v| v.field("id") == Some(&id)) {
                let old = slot.clone();
                *slot = value.clone();
                return StoreResult { stored: value, old: Some(old), is_update: true, entity_id: id };
            }
            bucket.push(value.clone());
            return StoreResult { stored: value, old: None, is_update: false, entity_id: id };
        }
        let id_str = arcstr::ArcStr::from(Uuid::new_v4().to_string());
        let id = Value::String(id_str.clone());
        let entity = match value {
            Value::Map(map) | Value::Entity(map) => Value::wrap_entity(map.as_map().clone(), id_str),
            other => Value::wrap_entity(
                ValueMap::from_iter([(CompactString::from("value"), other)]),
                id_str,
            ),
        };
        bucket.push(entity.clone());
        StoreResult { stored: entity, old: None, is_update: false, entity_id: id }
    }

    /// Records visible to `activity`: those stored under the framework
    /// scope (`""`) plus those stored directly under `activity`.
    fn visible(&self, repo: &str, activity: &str) -> Vec<Value> {
        let mut out = self.buckets.get(&Self::bucket_key(repo, "")).map(|b| b.iter().cloned().collect()).unwrap_or_default();
        if !activity.is_empty() {
            if let Some(scoped) = self.buckets.get(&Self::bucket_key(repo, activity)) {
                out.extend(scoped.iter().cloned());
            }
        }
        out
    }

    pub fn retrieve(&self, repo: &str, activity: &str, where_field: Option<&str>, equals: Option<&Value>) -> Vec<Value> {
        let all = self.visible(repo, activity);
        match (where_field, equals) {
            (Some(field), Some(expected)) => {
                all.into_iter().filter(|v| v.field(field) == Some(expected)).collect()
            }
            _ => all,
        }
    }

    pub fn find_by_id(&self, repo: &str, activity: &str, id: &Value) -> Option<Value> {
        self.visible(repo, activity).into_iter().find(|v| v.field("id") == Some(id))
    }

    pub fn exists(&self, repo: &str, activity: &str, id: &Value) -> bool {
        self.find_by_id(repo, activity, id).is_some()
    }

    pub fn delete(&self, repo: &str, activity: &str, where_field: &str, equals: &Value) -> Vec<Value> {
        let mut removed = Vec::new();
        for key in [Self::bucket_key(repo, ""), Self::bucket_key(repo, activity)] {
            if let Some(mut bucket) = self.buckets.get_mut(&key) {
                let mut kept = Vec::with_capacity(bucket.len());
                for v in bucket.drain(..) {
                    if v.field(where_field) == Some(equals) {
                        removed.push(v);
                    } else {
                        kept.push(v);
                    }
                }
                *bucket = kept;
            }
        }
        removed
    }

    pub fn clear(&self, repo: &str, activity: &str) {
        self.buckets.remove(&Self::bucket_key(repo, activity));
    }

    /// Copies every record visible to `from_activity` in `repo` into the
    /// framework scope under `new_name`.
    pub fn export(&self, repo: &str, from_activity: &str, new_name: &str) {
        let records = self.visible(repo, from_activity);
        let mut bucket = self.buckets.entry(Self::bucket_key(new_name, "")).or_default();
        bucket.extend(records);
    }
}
