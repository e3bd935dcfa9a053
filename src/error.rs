//! Error types for the iteration engine.
//!
//! Two kinds of failure exist. Invalid arguments are reported before any
//! iteration starts. Protocol violations are programming errors in a step
//! body (a continuation invoked twice, or invoked after the run moved on) and
//! are reported from whichever call frame invoked the offending continuation.
//!
//! A step that never signals is not an error: the run simply stays suspended.

use std::fmt;

/// The result of every signal, step and governor operation.
///
/// Returning `Outcome` lets a violation detected deep inside a resumed loop
/// travel back with `?` to the frame that triggered it.
pub type Outcome = Result<(), EngineError>;

/// A runtime-checkable argument was rejected.
///
/// # Examples
///
/// ```rust
/// use kiter::error::InvalidArgumentError;
///
/// let error = InvalidArgumentError {
///     argument: "policy",
///     received: "eventually".to_string(),
///     expected: "immediate, deferred, deferred-fifo or deferred-single-slot",
/// };
/// assert_eq!(
///     format!("{error}"),
///     "invalid policy `eventually`: expected immediate, deferred, deferred-fifo or deferred-single-slot"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidArgumentError {
    /// The name of the rejected argument.
    pub argument: &'static str,
    /// The value that was received.
    pub received: String,
    /// A description of the accepted values.
    pub expected: &'static str,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "invalid {} `{}`: expected {}",
            self.argument, self.received, self.expected
        )
    }
}

impl std::error::Error for InvalidArgumentError {}

/// The way a continuation contract was broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// A second signal arrived for a step occurrence that was already signalled.
    AlreadySignalled,
    /// A continuation from an earlier step occurrence was invoked after the
    /// loop had moved on to a later one.
    StaleOccurrence,
    /// A continuation was invoked after its run had finished.
    AlreadyFinished,
    /// A join unit reported completion twice.
    UnitAlreadyDone,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::AlreadySignalled => "step occurrence already signalled",
            Self::StaleOccurrence => "continuation belongs to an earlier step occurrence",
            Self::AlreadyFinished => "run already finished",
            Self::UnitAlreadyDone => "unit already reported completion",
        };
        formatter.write_str(text)
    }
}

/// A continuation was invoked in a way its contract forbids.
///
/// # Examples
///
/// ```rust
/// use kiter::error::{ProtocolViolation, ViolationKind};
///
/// let violation = ProtocolViolation {
///     signal: "finish",
///     kind: ViolationKind::AlreadySignalled,
///     occurrence: 3,
/// };
/// assert_eq!(
///     format!("{violation}"),
///     "finish at occurrence 3: step occurrence already signalled"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolViolation {
    /// The name of the continuation that was misused (`"proceed"`, `"finish"`, `"done"`).
    pub signal: &'static str,
    /// What went wrong.
    pub kind: ViolationKind,
    /// The step occurrence (or join unit index) the continuation belonged to.
    pub occurrence: u64,
}

impl fmt::Display for ProtocolViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{} at occurrence {}: {}",
            self.signal, self.occurrence, self.kind
        )
    }
}

impl std::error::Error for ProtocolViolation {}

/// Errors produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An argument was rejected before any iteration began.
    InvalidArgument(InvalidArgumentError),
    /// A continuation contract was broken by a step or unit body.
    ProtocolViolation(ProtocolViolation),
    /// Every continuation into a run was dropped before it finished.
    ///
    /// Only the future bridge reports this; a stalled run is otherwise silent.
    Abandoned,
}

impl EngineError {
    /// Returns `true` if this is a protocol violation.
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::ProtocolViolation(_))
    }

    /// Returns the violation kind, if this is a protocol violation.
    #[must_use]
    pub const fn violation_kind(&self) -> Option<ViolationKind> {
        match self {
            Self::ProtocolViolation(violation) => Some(violation.kind),
            _ => None,
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(error) => write!(formatter, "{error}"),
            Self::ProtocolViolation(violation) => write!(formatter, "protocol violation: {violation}"),
            Self::Abandoned => formatter.write_str("run abandoned before it finished"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidArgument(error) => Some(error),
            Self::ProtocolViolation(violation) => Some(violation),
            Self::Abandoned => None,
        }
    }
}

impl From<InvalidArgumentError> for EngineError {
    fn from(error: InvalidArgumentError) -> Self {
        Self::InvalidArgument(error)
    }
}

impl From<ProtocolViolation> for EngineError {
    fn from(violation: ProtocolViolation) -> Self {
        Self::ProtocolViolation(violation)
    }
}
