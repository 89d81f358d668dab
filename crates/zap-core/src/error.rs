//! # Error Hierarchy
//!
//! Structured validation errors for the ZAP Stack domain primitives, built
//! with `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Each variant carries the invalid input and the expected format so that
//! operators can diagnose misconfiguration without guesswork.

use thiserror::Error;

/// Errors from domain-primitive validation in `zap-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    /// PID does not have the expected number of hierarchy components.
    #[error("invalid PID depth: {0} components (expected {min}..={max})",
        min = crate::pid::MIN_PID_DEPTH,
        max = crate::pid::MAX_PID_DEPTH)]
    PidDepthOutOfRange(usize),

    /// A PID component is empty or whitespace-only.
    #[error("empty PID component at position {0}")]
    EmptyPidComponent(usize),

    /// A PID component contains a reserved character.
    #[error("invalid PID component at position {position}: \"{component}\" ({reason})")]
    InvalidPidComponent {
        /// Zero-based position of the offending component.
        position: usize,
        /// The component that failed validation.
        component: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The leading component is not a two-letter uppercase country code.
    #[error("invalid country code: \"{0}\" (expected 2 uppercase ASCII letters)")]
    InvalidCountryCode(String),

    /// Hex string failed to decode or has the wrong length.
    #[error("invalid hex encoding: \"{value}\" ({reason})")]
    InvalidHex {
        /// The string that failed to decode.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Hex string decodes to a value outside the scalar field.
    #[error("non-canonical field element: \"{0}\" (value >= field modulus)")]
    NonCanonicalFieldElement(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_depth_display_names_bounds() {
        let msg = format!("{}", CoreError::PidDepthOutOfRange(1));
        assert!(msg.contains("1 components"));
        assert!(msg.contains("2..=8"));
    }

    #[test]
    fn empty_component_display() {
        let msg = format!("{}", CoreError::EmptyPidComponent(3));
        assert!(msg.contains("position 3"));
    }

    #[test]
    fn invalid_country_code_display() {
        let msg = format!("{}", CoreError::InvalidCountryCode("usa".to_string()));
        assert!(msg.contains("usa"));
        assert!(msg.contains("2 uppercase"));
    }

    #[test]
    fn invalid_hex_display() {
        let err = CoreError::InvalidHex {
            value: "zz".to_string(),
            reason: "non-hex characters".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("zz"));
        assert!(msg.contains("non-hex characters"));
    }
}
