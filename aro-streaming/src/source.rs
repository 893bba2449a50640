use crate::Supplier;
use aro_errors::AroResult;
use aro_value::Value;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex as AsyncMutex};

/// A cold, pull-based, finite-or-infinite lazy sequence of Values
/// (`spec.md` §4.8). Restarting a stream means calling the constructor
/// again; `StreamSource` has no `reset`.
#[async_trait]
pub trait StreamSource: Send + Sync {
    async fn next(&self) -> AroResult<Option<Value>>;
}

pub struct EmptySource;

#[async_trait]
impl StreamSource for EmptySource {
    async fn next(&self) -> AroResult<Option<Value>> {
        Ok(None)
    }
}

pub fn empty() -> Arc<dyn StreamSource> {
    Arc::new(EmptySource)
}

struct ListSource {
    items: Vec<Value>,
    cursor: AtomicUsize,
}

#[async_trait]
impl StreamSource for ListSource {
    async fn next(&self) -> AroResult<Option<Value>> {
        let i = self.cursor.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.get(i).cloned())
    }
}

pub fn from_list(items: Vec<Value>) -> Arc<dyn StreamSource> {
    Arc::new(ListSource { items, cursor: AtomicUsize::new(0) })
}

pub fn just(value: Value) -> Arc<dyn StreamSource> {
    from_list(vec![value])
}

/// Wraps an `mpsc::Receiver` as a `StreamSource`: the common shape behind
/// `fromBuffered`, `fromCSV` and `fromJSONL`, each of which pushes parsed
/// values (or a terminal error) from a producer task into a bounded
/// channel so a slow consumer never waits on more than one buffer's worth
/// of look-ahead.
pub(crate) struct ChannelSource {
    rx: AsyncMutex<mpsc::Receiver<AroResult<Value>>>,
}

impl ChannelSource {
    pub(crate) fn new(rx: mpsc::Receiver<AroResult<Value>>) -> Arc<dyn StreamSource> {
        Arc::new(ChannelSource { rx: AsyncMutex::new(rx) })
    }
}

#[async_trait]
impl StreamSource for ChannelSource {
    async fn next(&self) -> AroResult<Option<Value>> {
        let mut rx = self.rx.lock().await;
        match rx.recv().await {
            Some(Ok(v)) => Ok(Some(v)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

pub fn from_buffered(supplier: Arc<dyn Supplier>, capacity: usize) -> Arc<dyn StreamSource> {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    tokio::spawn(async move {
        loop {
            match supplier.supply().await {
                Ok(Some(v)) => {
                    if tx.send(Ok(v)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    break;
                }
            }
        }
    });
    ChannelSource::new(rx)
}
