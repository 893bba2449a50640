//! The global symbol store (`spec.md` §4.5): a single process-wide table of
//! published values, each tagged with the feature set and business activity
//! that published it, and visible either everywhere (`business_activity ==
//! ""`) or only to callers within the same activity.

use arcstr::ArcStr;
use aro_value::Value;
use dashmap::DashMap;

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    from_feature_set: ArcStr,
    business_activity: ArcStr,
}

/// Concurrent-safe under single-process parallel execution: backed by
/// `dashmap`, which shards its internal locking instead of a single
/// process-wide mutex, matching the fine-grained-lock requirement in
/// `spec.md` §5.
#[derive(Default)]
pub struct GlobalSymbolStore {
    entries: DashMap<ArcStr, Entry>,
}

impl GlobalSymbolStore {
    pub fn new() -> Self {
        GlobalSymbolStore { entries: DashMap::new() }
    }

    pub fn publish(
        &self,
        name: impl Into<ArcStr>,
        value: Value,
        from_feature_set: impl Into<ArcStr>,
        business_activity: impl Into<ArcStr>,
    ) {
        self.entries.insert(
            name.into(),
            Entry { value, from_feature_set: from_feature_set.into(), business_activity: business_activity.into() },
        );
    }

    /// Returns the value iff present and either published framework-wide
    /// (`business_activity == ""`) or published under `for_activity`.
    pub fn resolve(&self, name: &str, for_activity: &str) -> Option<Value> {
        let entry = self.entries.get(name)?;
        if entry.business_activity.is_empty() || entry.business_activity.as_str() == for_activity {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Distinguishes "present but hidden from this activity" from "absent
    /// entirely" — `resolve` alone collapses both to `None`.
    pub fn is_access_denied(&self, name: &str, for_activity: &str) -> bool {
        match self.entries.get(name) {
            Some(entry) => !(entry.business_activity.is_empty() || entry.business_activity.as_str() == for_activity),
            None => false,
        }
    }

    pub fn source_feature_set(&self, name: &str) -> Option<ArcStr> {
        self.entries.get(name).map(|e| e.from_feature_set.clone())
    }

    pub fn business_activity(&self, name: &str) -> Option<ArcStr> {
        self.entries.get(name).map(|e| e.business_activity.clone())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framework_scope_is_visible_from_any_activity() {
        let store = GlobalSymbolStore::new();
        store.publish("config", Value::string("v1"), "Startup", "");
        assert_eq!(store.resolve("config", "orders"), Some(Value::string("v1")));
        assert_eq!(store.resolve("config", "billing"), Some(Value::string("v1")));
    }

    #[test]
    fn activity_scoped_value_is_hidden_from_other_activities() {
        let store = GlobalSymbolStore::new();
        store.publish("cart", Value::string("contents"), "AddToCart", "orders");
        assert_eq!(store.resolve("cart", "orders"), Some(Value::string("contents")));
        assert_eq!(store.resolve("cart", "billing"), None);
        assert!(store.is_access_denied("cart", "billing"));
        assert!(!store.is_access_denied("cart", "orders"));
        assert!(!store.is_access_denied("missing", "orders"));
    }

    #[test]
    fn provenance_is_reported() {
        let store = GlobalSymbolStore::new();
        store.publish("total", Value::Int(5), "ComputeTotal", "orders");
        assert_eq!(store.source_feature_set("total").as_deref(), Some("ComputeTotal"));
        assert_eq!(store.business_activity("total").as_deref(), Some("orders"));
    }
}
