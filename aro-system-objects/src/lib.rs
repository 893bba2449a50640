//! Built-in system objects (`spec.md` §4.9): typed adapters a statement's
//! object can resolve to instead of an ordinary context variable, plus the
//! registry mapping identifier to factory.

mod env;
mod event_object;
mod file;
mod format;
mod object;
mod parameter;
mod registry;
mod request;
mod shutdown_object;
mod socket;
mod stdio;
mod url;

pub use env::EnvObject;
pub use event_object::EventObject;
pub use file::FileObject;
pub use format::DataFormat;
pub use object::{Capability, SystemObject};
pub use parameter::{parse_args, ParameterObject, ParameterStore};
pub use registry::{Factory, SystemObjectRegistry};
pub use request::{FieldObject, HeadersObject};
pub use shutdown_object::ShutdownObject;
pub use socket::SocketObject;
pub use stdio::{ConsoleObject, StderrObject, StdinObject};
pub use url::UrlObject;
