use serde::Deserialize;

/// A named, reusable code configuration: constraint length, generator
/// polynomials, mode flags and (for decoding) the uncertainty-scale used by
/// soft-decision callers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoderProfile {
    pub name: String,
    pub k: u8,
    pub polys: Vec<u32>,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default = "default_true")]
    pub tail_terminated: bool,
    #[serde(default = "default_uncertainty_100")]
    pub uncertainty_100: u8,
    #[serde(default)]
    pub interleave_cols: Option<usize>,
}

fn default_true() -> bool {
    true
}

fn default_uncertainty_100() -> u8 {
    100
}

impl CoderProfile {
    /// Voyager-era deep-space rate-1/2, k=7, non-recursive, tail-terminated.
    pub fn voyager() -> Self {
        CoderProfile {
            name: "voyager".to_string(),
            k: 7,
            polys: vec![0o171, 0o133],
            recursive: false,
            tail_terminated: true,
            uncertainty_100: 100,
            interleave_cols: None,
        }
    }

    /// LTE-style rate-1/3, k=7, tail-biting turbo-constituent encoder,
    /// modeled here as a plain non-recursive trellis (tail biting itself is
    /// out of scope; see the crate-level documentation).
    pub fn lte() -> Self {
        CoderProfile {
            name: "lte".to_string(),
            k: 7,
            polys: vec![0o133, 0o171, 0o165],
            recursive: false,
            tail_terminated: true,
            uncertainty_100: 100,
            interleave_cols: Some(32),
        }
    }

    /// Looks up a profile by name among the built-ins.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "voyager" => Some(Self::voyager()),
            "lte" => Some(Self::lte()),
            _ => None,
        }
    }

    /// Cheaply checks the constraint length and polynomial count against the
    /// engine's supported ranges, without building the full state tables.
    pub fn validate(&self) -> Result<(), convcode_core::CoderError> {
        if self.k < 1 || self.k > 16 {
            return Err(convcode_core::CoderError::InvalidConstraintLength { k: self.k });
        }
        if self.polys.is_empty() || self.polys.len() > 16 {
            return Err(convcode_core::CoderError::InvalidPolynomialCount { num_polys: self.polys.len() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_lookup_matches_constructors() {
        assert_eq!(CoderProfile::named("voyager"), Some(CoderProfile::voyager()));
        assert_eq!(CoderProfile::named("lte"), Some(CoderProfile::lte()));
        assert_eq!(CoderProfile::named("nonexistent"), None);
    }

    #[test]
    fn built_in_profiles_validate() {
        assert!(CoderProfile::voyager().validate().is_ok());
        assert!(CoderProfile::lte().validate().is_ok());
    }

    #[test]
    fn rejects_bad_constraint_length() {
        let mut profile = CoderProfile::voyager();
        profile.k = 0;
        assert!(profile.validate().is_err());
    }
}
