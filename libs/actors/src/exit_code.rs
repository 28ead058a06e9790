//! Exit Reason Codes
//!
//! One-shot reason codes describing why an actor terminated. `NOT_EXITED` is
//! a reserved sentinel and never a real termination reason; every other
//! value is opaque to this core and interpreted by callers and supervisors.

/// Sentinel for an actor that has not terminated
pub const NOT_EXITED: u32 = 0x0;

/// Voluntary, successful termination
pub const NORMAL: u32 = 0x1;

/// A behavior callback returned a non-terminate error
pub const UNHANDLED_FAILURE: u32 = 0x2;

/// Forced external stop
pub const KILLED: u32 = 0x4;

/// First reason code reserved for application use
pub const USER_DEFINED: u32 = 0x10000;

/// True for every reason except the `NOT_EXITED` sentinel
pub fn is_terminal(reason: u32) -> bool {
    reason != NOT_EXITED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_not_terminal() {
        assert!(!is_terminal(NOT_EXITED));
        assert!(is_terminal(NORMAL));
        assert!(is_terminal(KILLED));
        assert!(is_terminal(USER_DEFINED + 7));
    }
}
