// We want a few things here:
// 1. A way to create a new error with a backtrace
// 2. A way to centralize setting a breakpoint to trap any error in the system fairly soon
//    after it's created (or at least when it's propagated from a library we use back to us)
// 3. Same but for logging / emitting error messages into the tracing/logging system
// 4. A tag distinguishing NotFound from Rejected from Upstream failure, so HTTP
//    boundary code can map to a status code without inspecting message text.

use std::borrow::Cow;
use backtrace_error::DynBacktraceError;
use tracing::error;

#[cfg(test)]
use test_log::test;

/// Which of the taxonomy in spec §7 an error belongs to. Boundary code (the
/// axum handlers in each `*-service` binary) matches on this to pick a
/// status code; nothing internal to a component should match on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// The named instrument, order id, or other keyed resource does not exist.
    NotFound,
    /// The request was well-formed but violates a domain invariant: unknown
    /// transaction type, a buy that would drive quantity negative, a
    /// zero-quantity order.
    Rejected,
    /// A downstream component (catalog, replica, front-end) returned an
    /// unexpected failure, or a transport call exhausted its retry budget.
    Upstream,
    /// Anything else: I/O errors, codec errors, bugs.
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    inner: DynBacktraceError,
}
pub type Result<T> = std::result::Result<T, Error>;

struct SimpleErr(Cow<'static, str>);
impl std::fmt::Debug for SimpleErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for SimpleErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for SimpleErr {
    fn description(&self) -> &str {
        &self.0
    }
}

impl<E: std::error::Error + Send + Sync + 'static> From<E> for Error {
    fn from(err: E) -> Error {
        Error::new(Kind::Internal, err)
    }
}

impl Error {
    pub fn new<E: std::error::Error + Send + Sync + 'static>(kind: Kind, err: E) -> Error {
        error!(target: "bourse", kind = ?kind, "{:?}", err);
        let dbe = DynBacktraceError::from(err);
        Error { kind, inner: dbe }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The bare inner message, without the `Kind` prefix `Display` adds —
    /// what HTTP boundary code should put in an error body.
    pub fn message(&self) -> String {
        self.inner.to_string()
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Error {
        Error::new(Kind::NotFound, SimpleErr(msg.into()))
    }

    pub fn rejected(msg: impl Into<Cow<'static, str>>) -> Error {
        Error::new(Kind::Rejected, SimpleErr(msg.into()))
    }

    pub fn upstream(msg: impl Into<Cow<'static, str>>) -> Error {
        Error::new(Kind::Upstream, SimpleErr(msg.into()))
    }

    pub fn internal(msg: impl Into<Cow<'static, str>>) -> Error {
        Error::new(Kind::Internal, SimpleErr(msg.into()))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.inner)
    }
}

/// Generic internal-error constructor, kept for call sites that don't care
/// about a specific taxonomy tag (mirrors the teacher's free `err()` fn).
pub fn err(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::internal(msg)
}

#[test]
fn test_error() {
    let e = err("test error");
    assert_eq!(e.kind(), Kind::Internal);
    let e = Error::not_found("stock not found");
    assert_eq!(e.kind(), Kind::NotFound);
}
