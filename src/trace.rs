//! Logging hooks that vanish without the `tracing` feature.
//!
//! Spans wrap recomputation passes (propagation, refits, convergence) and
//! events report derived values. Fallbacks are logged at warn level. With the
//! feature off every macro expands to a no-op that still evaluates its field
//! values, so call sites need no `cfg` attributes.

#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::debug_span!($name $(, $($field)*)?)
    };
}

#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($name:expr $(, $key:ident = $value:expr)+ $(,)?) => {
        tracing::debug!(name: $name, $($key = $value),+)
    };
}

#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($name:expr $(, $key:ident = $value:expr)+ $(,)?) => {
        tracing::warn!(name: $name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        $crate::trace::NoopSpan
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($name:expr $(, $key:ident = $value:expr)+ $(,)?) => {
        let _ = ($($value,)+);
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($name:expr $(, $key:ident = $value:expr)+ $(,)?) => {
        let _ = ($($value,)+);
    };
}

pub(crate) use trace_event;
pub(crate) use trace_span;
pub(crate) use trace_warn;

/// Stand-in for `tracing::Span` so `trace_span!(..).entered()` compiles
/// without the feature.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
