use crate::source::StreamSource;
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_value::Value;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

/// Shared bounded buffer backing `tee(n)` (`spec.md` §4.8). The producer
/// writes at monotonically increasing global indices; each consumer keeps
/// an independent read cursor. The buffer trims everything below
/// `min(cursors)` — reading an index that has already been trimmed is the
/// `EvictedAccess` protocol violation.
pub struct RingBuffer {
    capacity: usize,
    state: Mutex<RingState>,
    space_available: Notify,
    element_available: Notify,
}

struct RingState {
    slots: VecDeque<Value>,
    /// Global index of `slots[0]`; everything before this has been trimmed.
    base: usize,
    /// Global index the next produced element will take.
    produced: usize,
    /// One cursor per live consumer; `None` once cancelled.
    cursors: Vec<Option<usize>>,
    upstream_done: bool,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(RingBuffer {
            capacity: capacity.max(1),
            state: Mutex::new(RingState {
                slots: VecDeque::new(),
                base: 0,
                produced: 0,
                cursors: Vec::new(),
                upstream_done: false,
            }),
            space_available: Notify::new(),
            element_available: Notify::new(),
        })
    }

    pub fn register_consumer(&self) -> usize {
        let mut state = self.state.lock();
        state.cursors.push(Some(state.base));
        state.cursors.len() - 1
    }

    pub fn cancel_consumer(&self, id: usize) {
        let mut state = self.state.lock();
        if let Some(slot) = state.cursors.get_mut(id) {
            *slot = None;
        }
        self.trim(&mut state);
        self.space_available.notify_waiters();
    }

    fn min_cursor(state: &RingState) -> usize {
        state.cursors.iter().flatten().copied().min().unwrap_or(state.produced)
    }

    fn trim(&self, state: &mut RingState) {
        let min = Self::min_cursor(state);
        while state.base < min && !state.slots.is_empty() {
            state.slots.pop_front();
            state.base += 1;
        }
    }

    /// Called by the producer task for each upstream element. Blocks until
    /// the slowest live consumer has room.
    pub async fn produce(&self, value: Value) {
        loop {
            let notified = self.space_available.notified();
            {
                let mut state = self.state.lock();
                if state.produced - state.base < self.capacity {
                    state.slots.push_back(value);
                    state.produced += 1;
                    self.element_available.notify_waiters();
                    return;
                }
            }
            notified.await;
        }
    }

    pub fn mark_done(&self) {
        self.state.lock().upstream_done = true;
        self.element_available.notify_waiters();
    }

    pub fn was_evicted(&self, index: usize) -> bool {
        index < self.state.lock().base
    }

    pub fn is_available(&self, index: usize) -> bool {
        let state = self.state.lock();
        index >= state.base && index < state.produced
    }

    /// Reads the element at `index` for `consumer`, waiting for the
    /// producer if it has not arrived yet. Advances `consumer`'s cursor to
    /// `index + 1` and trims the buffer if possible.
    pub async fn element_at(&self, consumer: usize, index: usize) -> AroResult<Option<Value>> {
        loop {
            let notified = self.element_available.notified();
            {
                let mut state = self.state.lock();
                if index < state.base {
                    return Err(AroError::new(
                        ErrorKind::Runtime,
                        format!("tee consumer {consumer} accessed evicted index {index}"),
                    ));
                }
                if index < state.produced {
                    let value = state.slots[index - state.base].clone();
                    if let Some(cursor) = state.cursors.get_mut(consumer).and_then(|c| c.as_mut()) {
                        *cursor = index + 1;
                    }
                    self.trim(&mut state);
                    drop(state);
                    self.space_available.notify_waiters();
                    return Ok(Some(value));
                }
                if state.upstream_done {
                    return Ok(None);
                }
            }
            notified.await;
        }
    }
}

/// One of the `n` independent consumer streams returned by `tee(n)`.
struct TeeConsumer {
    buffer: Arc<RingBuffer>,
    id: usize,
    position: Mutex<usize>,
}

#[async_trait]
impl StreamSource for TeeConsumer {
    async fn next(&self) -> AroResult<Option<Value>> {
        let index = {
            let mut pos = self.position.lock();
            let current = *pos;
            *pos += 1;
            current
        };
        self.buffer.element_at(self.id, index).await
    }
}

impl Drop for TeeConsumer {
    fn drop(&mut self) {
        self.buffer.cancel_consumer(self.id);
    }
}

/// Fans `upstream` out into `n` independent consumer streams that all
/// observe the same element ordering from position 0.
pub fn tee(upstream: Arc<dyn StreamSource>, n: usize, capacity: usize) -> Vec<Arc<dyn StreamSource>> {
    let buffer = RingBuffer::new(capacity);
    let consumers: Vec<Arc<dyn StreamSource>> = (0..n)
        .map(|_| {
            let id = buffer.register_consumer();
            Arc::new(TeeConsumer { buffer: buffer.clone(), id, position: Mutex::new(0) }) as Arc<dyn StreamSource>
        })
        .collect();

    let producer_buffer = buffer.clone();
    tokio::spawn(async move {
        loop {
            match upstream.next().await {
                Ok(Some(v)) => producer_buffer.produce(v).await,
                Ok(None) | Err(_) => break,
            }
        }
        producer_buffer.mark_done();
    });

    consumers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::from_list;

    #[tokio::test]
    async fn tee_consumers_each_see_the_full_sequence() {
        let source = from_list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let consumers = tee(source, 2, 4);
        let mut a = Vec::new();
        while let Some(v) = consumers[0].next().await.unwrap() {
            a.push(v);
        }
        let mut b = Vec::new();
        while let Some(v) = consumers[1].next().await.unwrap() {
            b.push(v);
        }
        assert_eq!(a, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(b, a);
    }

    #[tokio::test]
    async fn is_available_and_was_evicted_reflect_trim_state() {
        let buf = RingBuffer::new(2);
        let c0 = buf.register_consumer();
        let c1 = buf.register_consumer();
        buf.produce(Value::Int(1)).await;
        buf.produce(Value::Int(2)).await;
        assert!(buf.is_available(0));
        let _ = buf.element_at(c0, 0).await.unwrap();
        let _ = buf.element_at(c1, 0).await.unwrap();
        assert!(buf.was_evicted(0));
    }
}
