//! `EngineConfig` (`SPEC_FULL.md` §2's ambient configuration layer),
//! grounded on the teacher's `GXConfigBuilder` in `graphix-rt/src/lib.rs`:
//! a `derive_builder`-generated builder over the knobs `spec.md` §5 and
//! §4.8 leave as engine-level parameters rather than per-call arguments.

use derive_builder::Builder;
use std::time::Duration;

/// Tunables for one [`crate::Engine`] instance. Every field has a default
/// matching the value `spec.md` calls out inline (30s URL timeout, 4096
/// ring-buffer capacity, parallel I/O off by default since it changes
/// observable scheduling).
#[derive(Debug, Clone, Builder)]
#[builder(pattern = "owned", setter(into))]
pub struct EngineConfig {
    /// `spec.md` §4.3: lets adjacent read/write/fetch statements whose
    /// results aren't consumed until a later statement dispatch
    /// concurrently. Off by default — sequential-as-written is the safer
    /// default for a language whose whole point is readable control flow.
    #[builder(default = "false")]
    pub enable_parallel_io: bool,

    /// `spec.md` §4.8: default capacity for a `tee`'s backing ring buffer
    /// when the statement doesn't specify one.
    #[builder(default = "4096")]
    pub stream_ring_buffer_capacity: usize,

    /// `spec.md` §4.9, §5: default timeout for the `url` system object's
    /// reads and writes, overridable per call.
    #[builder(default = "Duration::from_secs(30)")]
    pub url_timeout: Duration,

    /// `spec.md` §4.10: how long the shutdown coordinator waits for
    /// in-flight feature sets to drain before the process exits.
    #[builder(default = "Duration::from_secs(10)")]
    pub shutdown_grace_period: Duration,
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::builder().build().expect("every EngineConfig field has a default")
    }
}
