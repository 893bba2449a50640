//! The schema-lookup interface `Extract` validates PascalCase specifiers
//! against (`spec.md` §4.2, §1: the OpenAPI loader itself is out of
//! scope — only this lookup contract matters to the execution core).

use aro_errors::AroResult;
use aro_value::Value;
use std::sync::Arc;

/// Consumed as a service (`RuntimeContext::service::<SchemaRegistryHandle>`).
/// An external loader registers an implementation that knows how to
/// resolve a PascalCase schema name (e.g. `Order`, `Customer`) to a
/// structural shape and validate a `Value` against it.
pub trait SchemaRegistry: Send + Sync {
    fn validate(&self, schema_name: &str, value: &Value) -> AroResult<()>;
}

/// `ServiceRegistry::get`/`register` need a `Sized` type; this thin
/// newtype is what actually goes in the registry, wrapping the unsized
/// `dyn SchemaRegistry` the service lookup protocol operates on.
#[derive(Clone)]
pub struct SchemaRegistryHandle(pub Arc<dyn SchemaRegistry>);
