use crate::source::StreamSource;
use aro_errors::{AroError, AroResult};
use aro_value::Value;
use compact_str::CompactString;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
pub type MapFn = Arc<dyn Fn(Value) -> AroResult<Value> + Send + Sync>;
pub type CompactMapFn = Arc<dyn Fn(Value) -> Option<Value> + Send + Sync>;
pub type FlatMapFn = Arc<dyn Fn(Value) -> AroResult<Arc<dyn StreamSource>> + Send + Sync>;

struct FilterSource {
    upstream: Arc<dyn StreamSource>,
    pred: Predicate,
}

#[async_trait]
impl StreamSource for FilterSource {
    async fn next(&self) -> AroResult<Option<Value>> {
        loop {
            match self.upstream.next().await? {
                Some(v) if (self.pred)(&v) => return Ok(Some(v)),
                Some(_) => continue,
                None => return Ok(None),
            }
        }
    }
}

pub fn filter(upstream: Arc<dyn StreamSource>, pred: Predicate) -> Arc<dyn StreamSource> {
    Arc::new(FilterSource { upstream, pred })
}

struct MapSource {
    upstream: Arc<dyn StreamSource>,
    f: MapFn,
}

#[async_trait]
impl StreamSource for MapSource {
    async fn next(&self) -> AroResult<Option<Value>> {
        match self.upstream.next().await? {
            Some(v) => Ok(Some((self.f)(v)?)),
            None => Ok(None),
        }
    }
}

pub fn map(upstream: Arc<dyn StreamSource>, f: MapFn) -> Arc<dyn StreamSource> {
    Arc::new(MapSource { upstream, f })
}

struct CompactMapSource {
    upstream: Arc<dyn StreamSource>,
    f: CompactMapFn,
}

#[async_trait]
impl StreamSource for CompactMapSource {
    async fn next(&self) -> AroResult<Option<Value>> {
        loop {
            match self.upstream.next().await? {
                Some(v) => match (self.f)(v) {
                    Some(mapped) => return Ok(Some(mapped)),
                    None => continue,
                },
                None => return Ok(None),
            }
        }
    }
}

pub fn compact_map(upstream: Arc<dyn StreamSource>, f: CompactMapFn) -> Arc<dyn StreamSource> {
    Arc::new(CompactMapSource { upstream, f })
}

struct FlatMapSource {
    upstream: Arc<dyn StreamSource>,
    f: FlatMapFn,
    current: tokio::sync::Mutex<Option<Arc<dyn StreamSource>>>,
}

#[async_trait]
impl StreamSource for FlatMapSource {
    async fn next(&self) -> AroResult<Option<Value>> {
        loop {
            let mut current = self.current.lock().await;
            if let Some(inner) = current.as_ref() {
                if let Some(v) = inner.next().await? {
                    return Ok(Some(v));
                }
                *current = None;
            }
            match self.upstream.next().await? {
                Some(v) => *current = Some((self.f)(v)?),
                None => return Ok(None),
            }
        }
    }
}

pub fn flat_map(upstream: Arc<dyn StreamSource>, f: FlatMapFn) -> Arc<dyn StreamSource> {
    Arc::new(FlatMapSource { upstream, f, current: tokio::sync::Mutex::new(None) })
}

struct TakeSource {
    upstream: Arc<dyn StreamSource>,
    remaining: AtomicUsize,
}

#[async_trait]
impl StreamSource for TakeSource {
    async fn next(&self) -> AroResult<Option<Value>> {
        loop {
            let remaining = self.remaining.load(Ordering::SeqCst);
            if remaining == 0 {
                return Ok(None);
            }
            if self
                .remaining
                .compare_exchange(remaining, remaining - 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return self.upstream.next().await;
            }
        }
    }
}

pub fn take(upstream: Arc<dyn StreamSource>, n: usize) -> Arc<dyn StreamSource> {
    Arc::new(TakeSource { upstream, remaining: AtomicUsize::new(n) })
}

struct DropSource {
    upstream: Arc<dyn StreamSource>,
    to_drop: AtomicUsize,
}

#[async_trait]
impl StreamSource for DropSource {
    async fn next(&self) -> AroResult<Option<Value>> {
        loop {
            let remaining = self.to_drop.load(Ordering::SeqCst);
            if remaining == 0 {
                return self.upstream.next().await;
            }
            match self.upstream.next().await? {
                Some(_) => {
                    self.to_drop.fetch_sub(1, Ordering::SeqCst);
                    continue;
                }
                None => return Ok(None),
            }
        }
    }
}

pub fn drop_n(upstream: Arc<dyn StreamSource>, n: usize) -> Arc<dyn StreamSource> {
    Arc::new(DropSource { upstream, to_drop: AtomicUsize::new(n) })
}

struct TakeWhileSource {
    upstream: Arc<dyn StreamSource>,
    pred: Predicate,
    done: AtomicBool,
}

#[async_trait]
impl StreamSource for TakeWhileSource {
    async fn next(&self) -> AroResult<Option<Value>> {
        if self.done.load(Ordering::SeqCst) {
            return Ok(None);
        }
        match self.upstream.next().await? {
            Some(v) if (self.pred)(&v) => Ok(Some(v)),
            Some(_) => {
                self.done.store(true, Ordering::SeqCst);
                Ok(None)
            }
            None => {
                self.done.store(true, Ordering::SeqCst);
                Ok(None)
            }
        }
    }
}

pub fn take_while(upstream: Arc<dyn StreamSource>, pred: Predicate) -> Arc<dyn StreamSource> {
    Arc::new(TakeWhileSource { upstream, pred, done: AtomicBool::new(false) })
}

struct DropWhileSource {
    upstream: Arc<dyn StreamSource>,
    pred: Predicate,
    dropping: AtomicBool,
}

#[async_trait]
impl StreamSource for DropWhileSource {
    async fn next(&self) -> AroResult<Option<Value>> {
        loop {
            match self.upstream.next().await? {
                Some(v) => {
                    if self.dropping.load(Ordering::SeqCst) {
                        if (self.pred)(&v) {
                            continue;
                        }
                        self.dropping.store(false, Ordering::SeqCst);
                    }
                    return Ok(Some(v));
                }
                None => return Ok(None),
            }
        }
    }
}

pub fn drop_while(upstream: Arc<dyn StreamSource>, pred: Predicate) -> Arc<dyn StreamSource> {
    Arc::new(DropWhileSource { upstream, pred, dropping: AtomicBool::new(true) })
}

/// `whereField(name, equals)` — row filter over a stream of `Map`/`Entity`
/// values.
pub fn where_field(upstream: Arc<dyn StreamSource>, name: impl Into<CompactString>, equals: Value) -> Arc<dyn StreamSource> {
    let name = name.into();
    filter(upstream, Arc::new(move |v: &Value| v.field(&name) == Some(&equals)))
}

/// `project(names)` — keeps only the named fields of each row, in the
/// order given.
pub fn project(upstream: Arc<dyn StreamSource>, names: Vec<CompactString>) -> Arc<dyn StreamSource> {
    map(
        upstream,
        Arc::new(move |v: Value| {
            let entries = names.iter().filter_map(|n| v.field(n).map(|val| (n.clone(), val.clone())));
            Ok(Value::map(entries))
        }),
    )
}

/// `field(name, as:type)` — projects a Map stream down to the scalar
/// values of one field, per `spec.md` §4.8.
pub fn field(upstream: Arc<dyn StreamSource>, name: impl Into<CompactString>) -> Arc<dyn StreamSource> {
    let name = name.into();
    let name_for_err = name.clone();
    map(
        upstream,
        Arc::new(move |v: Value| {
            v.field(&name).cloned().ok_or_else(|| AroError::undefined_variable(&name_for_err))
        }),
    )
}
