//! Resource caps enforced by the environment chain and the GC's pin stack.
//!
//! Generic over a [`ResourceTracker`] so the hard caps from the spec
//! (≈31 Ki environments, a 4096-deep pin stack) can be swapped out in tests
//! for a tracker with no limits at all, the way the reference interpreter's
//! arena is generic over its allocation policy.

use std::fmt;

/// Default cap on live environments, mirroring the reference configuration's
/// `31 * 1024`.
pub const DEFAULT_ENVIRONMENT_CAP: usize = 31 * 1024;

/// Default cap on pin-stack depth.
pub const DEFAULT_PIN_STACK_CAP: usize = 4096;

/// Cap on slots in a single local environment.
pub const MAX_LOCAL_SLOTS: usize = 256;

/// Static upper bound on the number of fields a single instance may hold.
pub const DEFAULT_MAX_FIELDS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceError {
    /// The environment cap (or pin-stack cap) would be exceeded.
    StackOverflow,
    /// A single local environment's slot array is full.
    TooManyConstants,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackOverflow => write!(f, "Stack overflow."),
            // Preserved verbatim for compatibility with the reference implementation.
            Self::TooManyConstants => write!(f, "Too many constants in one chunk."),
        }
    }
}

/// Policy object consulted before each environment allocation and pin-stack push.
pub trait ResourceTracker: fmt::Debug {
    fn check_environment_cap(&self, live_environments: usize) -> Result<(), ResourceError>;
    fn check_pin_stack_depth(&self, depth: usize) -> Result<(), ResourceError>;
}

/// The reference interpreter's caps: ≈31 Ki environments, a 4096-deep pin stack.
#[derive(Debug, Clone, Copy)]
pub struct DefaultLimits {
    pub environment_cap: usize,
    pub pin_stack_cap: usize,
}

impl Default for DefaultLimits {
    fn default() -> Self {
        Self { environment_cap: DEFAULT_ENVIRONMENT_CAP, pin_stack_cap: DEFAULT_PIN_STACK_CAP }
    }
}

impl ResourceTracker for DefaultLimits {
    fn check_environment_cap(&self, live_environments: usize) -> Result<(), ResourceError> {
        if live_environments >= self.environment_cap {
            Err(ResourceError::StackOverflow)
        } else {
            Ok(())
        }
    }

    fn check_pin_stack_depth(&self, depth: usize) -> Result<(), ResourceError> {
        if depth >= self.pin_stack_cap {
            Err(ResourceError::StackOverflow)
        } else {
            Ok(())
        }
    }
}

/// A tracker with no caps at all, useful for tests that want to avoid
/// tripping resource limits while exercising unrelated behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLimitTracker;

impl ResourceTracker for NoLimitTracker {
    fn check_environment_cap(&self, _live_environments: usize) -> Result<(), ResourceError> {
        Ok(())
    }

    fn check_pin_stack_depth(&self, _depth: usize) -> Result<(), ResourceError> {
        Ok(())
    }
}
