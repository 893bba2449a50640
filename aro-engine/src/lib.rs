//! The ARO execution core's composition root: engine wiring
//! ([`Engine`]/[`EngineConfig`]) and the feature-set executor
//! ([`FeatureSetExecutor`]) that sequences an `AnalyzedFeatureSet`'s
//! statements against the dispatch protocol in `aro-runtime`.

mod config;
mod engine;
mod executor;

pub use config::{EngineConfig, EngineConfigBuilder};
pub use engine::Engine;
pub use executor::{evaluate_condition, FeatureSetExecutor};
