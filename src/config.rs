//! Runtime selection of the scheduling policy.
//!
//! A [`GovernorPolicy`] names a governor in text so it can come from a
//! settings file, an environment variable or a command line, and be turned
//! into an engine with [`Engine::from_policy`](crate::engine::Engine::from_policy).
//!
//! | Text | Policy |
//! |---|---|
//! | `immediate` | [`GovernorPolicy::Immediate`] |
//! | `deferred`, `deferred-fifo` | [`GovernorPolicy::Deferred`] with [`PendingPolicy::Fifo`] |
//! | `deferred-single-slot` | [`GovernorPolicy::Deferred`] with [`PendingPolicy::SingleSlot`] |
//!
//! Parsing ignores case and surrounding whitespace.

use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, InvalidArgumentError};
use crate::governor::PendingPolicy;

const POLICY_EXPECTED: &str = "immediate, deferred, deferred-fifo or deferred-single-slot";
const PENDING_EXPECTED: &str = "fifo or single-slot";

/// The scheduling policy an engine is built with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum GovernorPolicy {
    /// Re-enter synchronously, trampolined.
    #[default]
    Immediate,
    /// Park re-entries until pumped.
    Deferred(PendingPolicy),
}

impl fmt::Display for GovernorPolicy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => formatter.write_str("immediate"),
            Self::Deferred(PendingPolicy::Fifo) => formatter.write_str("deferred"),
            Self::Deferred(PendingPolicy::SingleSlot) => {
                formatter.write_str("deferred-single-slot")
            }
        }
    }
}

impl FromStr for GovernorPolicy {
    type Err = EngineError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim().to_ascii_lowercase().as_str() {
            "immediate" => Ok(Self::Immediate),
            "deferred" | "deferred-fifo" => Ok(Self::Deferred(PendingPolicy::Fifo)),
            "deferred-single-slot" => Ok(Self::Deferred(PendingPolicy::SingleSlot)),
            _ => Err(InvalidArgumentError {
                argument: "policy",
                received: text.to_string(),
                expected: POLICY_EXPECTED,
            }
            .into()),
        }
    }
}

impl TryFrom<String> for GovernorPolicy {
    type Error = EngineError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<GovernorPolicy> for String {
    fn from(policy: GovernorPolicy) -> Self {
        policy.to_string()
    }
}

impl fmt::Display for PendingPolicy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fifo => formatter.write_str("fifo"),
            Self::SingleSlot => formatter.write_str("single-slot"),
        }
    }
}

impl FromStr for PendingPolicy {
    type Err = EngineError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(Self::Fifo),
            "single-slot" => Ok(Self::SingleSlot),
            _ => Err(InvalidArgumentError {
                argument: "pending policy",
                received: text.to_string(),
                expected: PENDING_EXPECTED,
            }
            .into()),
        }
    }
}
