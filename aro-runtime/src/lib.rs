//! The runtime variable context and scope graph (`spec.md` §4.1), plus the
//! action registry and dispatch protocol between verbs and typed system
//! objects (`spec.md` §4.2). The feature-set executor that sequences
//! statements through this dispatch lives one layer up, in `aro-engine`.

mod action;
mod context;
mod schema;
mod services;

pub use action::{Action, ActionOutcome, ActionRegistry, ActionRequest, ObjectResolution};
pub use context::{Environment, OutputContext, Response, RuntimeContext};
pub use schema::{SchemaRegistry, SchemaRegistryHandle};
pub use services::ServiceRegistry;
