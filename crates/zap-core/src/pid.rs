//! # Hierarchical Address Identifiers (PIDs)
//!
//! A PID encodes a physical address as an ordered hierarchy:
//! `country / admin level(s) / locality / unit`, e.g.
//! `PK/ICT/Islamabad/F-7/H-12` or `SG/Queenstown/Blk-88/04-123`.
//!
//! PIDs are validated at construction — you cannot hold a [`Pid`] whose
//! depth or country code is out of range. Once constructed, a PID is
//! consumed by the proof layer exclusively through its field-element
//! digests ([`Pid::digest`], [`Pid::component_digests`]); the string form
//! never enters a circuit and never appears among public signals.
//!
//! ## Canonical form
//!
//! Components are joined with `/`. Comparison, hashing, and digest
//! computation all operate on the canonical form, so two PIDs are equal
//! iff their canonical strings are equal.

use ark_bn254::Fr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;
use crate::field::hash_to_field;

/// Minimum number of hierarchy components (country + at least one level).
pub const MIN_PID_DEPTH: usize = 2;

/// Maximum number of hierarchy components a PID may carry.
///
/// This bound is load-bearing: the structure circuit allocates exactly
/// this many component slots, so raising it changes the circuit shape and
/// requires a key rotation.
pub const MAX_PID_DEPTH: usize = 8;

/// Separator between hierarchy components in the canonical string form.
pub const PID_SEPARATOR: char = '/';

/// A validated hierarchical address identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pid {
    components: Vec<String>,
}

impl Pid {
    /// Parse and validate a PID from its canonical string form.
    ///
    /// Validation rules:
    /// - between [`MIN_PID_DEPTH`] and [`MAX_PID_DEPTH`] components;
    /// - every component non-empty, no surrounding whitespace, and free of
    ///   the separator character;
    /// - component 0 is a two-letter uppercase ASCII country code.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let components: Vec<String> = input
            .split(PID_SEPARATOR)
            .map(|c| c.to_string())
            .collect();

        if !(MIN_PID_DEPTH..=MAX_PID_DEPTH).contains(&components.len()) {
            return Err(CoreError::PidDepthOutOfRange(components.len()));
        }

        for (position, component) in components.iter().enumerate() {
            if component.is_empty() {
                return Err(CoreError::EmptyPidComponent(position));
            }
            if component.trim() != component {
                return Err(CoreError::InvalidPidComponent {
                    position,
                    component: component.clone(),
                    reason: "surrounding whitespace".to_string(),
                });
            }
            if component.chars().any(char::is_control) {
                return Err(CoreError::InvalidPidComponent {
                    position,
                    component: component.clone(),
                    reason: "control characters".to_string(),
                });
            }
        }

        let country = &components[0];
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(CoreError::InvalidCountryCode(country.clone()));
        }

        Ok(Self { components })
    }

    /// The two-letter country code (component 0).
    pub fn country(&self) -> &str {
        &self.components[0]
    }

    /// All hierarchy components, country first.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Number of hierarchy components.
    pub fn depth(&self) -> usize {
        self.components.len()
    }

    /// Canonical string form, components joined with `/`.
    pub fn canonical(&self) -> String {
        self.components.join(&PID_SEPARATOR.to_string())
    }

    /// The PID as an opaque scalar-field element: SHA-256 of the canonical
    /// form, reduced into the field. This is the value the membership and
    /// version circuits treat as "the identifier".
    pub fn digest(&self) -> Fr {
        hash_to_field(self.canonical().as_bytes())
    }

    /// Per-component field digests, in hierarchy order. Feeds the structure
    /// and selective-reveal circuits, which constrain components
    /// individually.
    pub fn component_digests(&self) -> Vec<Fr> {
        self.components
            .iter()
            .map(|c| hash_to_field(c.as_bytes()))
            .collect()
    }

    /// The country code as a field element (its digest, like any other
    /// component). Used as a public signal by the structure circuit.
    pub fn country_digest(&self) -> Fr {
        hash_to_field(self.components[0].as_bytes())
    }
}

impl std::fmt::Display for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl std::str::FromStr for Pid {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Pid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical())
    }
}

impl<'de> Deserialize<'de> for Pid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_full_hierarchy() {
        let pid = Pid::parse("PK/ICT/Islamabad/F-7/H-12").unwrap();
        assert_eq!(pid.country(), "PK");
        assert_eq!(pid.depth(), 5);
        assert_eq!(pid.components()[4], "H-12");
        assert_eq!(pid.canonical(), "PK/ICT/Islamabad/F-7/H-12");
    }

    #[test]
    fn parse_minimal_hierarchy() {
        let pid = Pid::parse("SG/Queenstown").unwrap();
        assert_eq!(pid.depth(), 2);
    }

    #[test]
    fn reject_single_component() {
        assert!(matches!(
            Pid::parse("PK"),
            Err(CoreError::PidDepthOutOfRange(1))
        ));
    }

    #[test]
    fn reject_nine_components() {
        let input = "PK/a/b/c/d/e/f/g/h";
        assert!(matches!(
            Pid::parse(input),
            Err(CoreError::PidDepthOutOfRange(9))
        ));
    }

    #[test]
    fn reject_empty_component() {
        assert!(matches!(
            Pid::parse("PK//Islamabad"),
            Err(CoreError::EmptyPidComponent(1))
        ));
    }

    #[test]
    fn reject_lowercase_country() {
        assert!(matches!(
            Pid::parse("pk/ICT"),
            Err(CoreError::InvalidCountryCode(_))
        ));
    }

    #[test]
    fn reject_three_letter_country() {
        assert!(matches!(
            Pid::parse("PAK/ICT"),
            Err(CoreError::InvalidCountryCode(_))
        ));
    }

    #[test]
    fn reject_whitespace_component() {
        assert!(matches!(
            Pid::parse("PK/ ICT"),
            Err(CoreError::InvalidPidComponent { position: 1, .. })
        ));
    }

    #[test]
    fn digest_depends_on_every_component() {
        let a = Pid::parse("PK/ICT/Islamabad/F-7/H-12").unwrap();
        let b = Pid::parse("PK/ICT/Islamabad/F-7/H-13").unwrap();
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn component_digests_match_depth() {
        let pid = Pid::parse("DE/BE/Berlin/Mitte").unwrap();
        assert_eq!(pid.component_digests().len(), 4);
        assert_eq!(pid.component_digests()[0], pid.country_digest());
    }

    #[test]
    fn serde_round_trip_as_string() {
        let pid = Pid::parse("US/CA/San-Francisco/Mission/3301").unwrap();
        let json = serde_json::to_string(&pid).unwrap();
        assert_eq!(json, "\"US/CA/San-Francisco/Mission/3301\"");
        let back: Pid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pid);
    }

    #[test]
    fn deserialize_rejects_invalid() {
        let result: Result<Pid, _> = serde_json::from_str("\"not a pid\"");
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn parse_display_round_trip(
            levels in proptest::collection::vec("[A-Za-z0-9-]{1,12}", 1..=7)
        ) {
            let canonical = format!("PK/{}", levels.join("/"));
            let pid = Pid::parse(&canonical).unwrap();
            prop_assert_eq!(pid.to_string(), canonical);
        }
    }
}
