use crate::Value;
use compact_str::CompactString;
use indexmap::IndexMap;
use triomphe::Arc;

/// Insertion-ordered map backing `Value::Map` and `Value::Entity`. Ordered
/// so that `Create`/`Transform` round-trips through JSON/CSV preserve field
/// order, the way a human author of the ARO source wrote them.
pub type ValueMap = IndexMap<CompactString, Value>;

/// A reference-counted, copy-on-write map. Clone is a pointer bump;
/// mutation (`to_mut`) clones the backing map only if another reference is
/// still alive, matching the "shareable, deep copy on mutation" rule in the
/// data model.
#[derive(Debug, Clone)]
pub struct SharedMap(Arc<ValueMap>);

impl SharedMap {
    pub fn new() -> Self {
        SharedMap(Arc::new(ValueMap::new()))
    }

    pub fn from_map(map: ValueMap) -> Self {
        SharedMap(Arc::new(map))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, CompactString, Value> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &ValueMap {
        &self.0
    }

    /// Obtain a uniquely-owned copy of the backing map, cloning it if other
    /// `SharedMap`s still reference the same storage.
    pub fn to_mut(&mut self) -> &mut ValueMap {
        Arc::make_mut(&mut self.0)
    }

    /// Clone-then-set: the state-transition and field-update idiom used by
    /// `Accept` and `Update`.
    pub fn with_set(&self, key: impl Into<CompactString>, value: Value) -> SharedMap {
        let mut next = self.clone();
        next.to_mut().insert(key.into(), value);
        next
    }
}

impl Default for SharedMap {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for SharedMap {
    fn eq(&self, other: &Self) -> bool {
        if self.0.len() != other.0.len() {
            return false;
        }
        self.0.iter().all(|(k, v)| other.0.get(k).map(|ov| ov == v).unwrap_or(false))
    }
}

impl FromIterator<(CompactString, Value)> for SharedMap {
    fn from_iter<T: IntoIterator<Item = (CompactString, Value)>>(iter: T) -> Self {
        SharedMap::from_map(ValueMap::from_iter(iter))
    }
}

/// A reference-counted, copy-on-write list, backing `Value::List` and
/// `Value::Bytes`.
#[derive(Debug, Clone)]
pub struct SharedList<T>(Arc<Vec<T>>);

impl<T: Clone> SharedList<T> {
    pub fn from_vec(items: Vec<T>) -> Self {
        SharedList(Arc::new(items))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.0.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn to_mut(&mut self) -> &mut Vec<T> {
        Arc::make_mut(&mut self.0)
    }
}

impl<T: Clone + PartialEq> PartialEq for SharedList<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

impl<T> Default for SharedList<T> {
    fn default() -> Self {
        SharedList(Arc::new(Vec::new()))
    }
}

impl<T: Clone> FromIterator<T> for SharedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        SharedList::from_vec(iter.into_iter().collect())
    }
}
