//! Small atomic-counter id types, grounded on the `atomic_id!` pattern the
//! teacher project uses throughout (`netidx_core::atomic_id!`, consumed as
//! `LambdaId`, `BindId`, `CallableId`, ...). We reimplement the same shape
//! locally rather than pull in `netidx-core` for two counters.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! atomic_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            pub fn next() -> Self {
                static NEXT: AtomicU64 = AtomicU64::new(0);
                $name(NEXT.fetch_add(1, Ordering::Relaxed))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

atomic_id! {
    /// Identity of a `Stream` value. Two `Value::Stream` compare equal iff
    /// they carry the same id; the id does not name a reusable producer,
    /// streams are cold and restart by re-creating them.
    StreamId
}

atomic_id! {
    /// Identity of a `ForeignObject` value (a handle to a system object
    /// adapter instance).
    ForeignId
}
