//! Named material presets.
//!
//! Values are single-frequency approximations near 1.55 µm, except `Si`
//! which uses the rounded $\epsilon = 12$ common in waveguide tutorials.

use crate::medium::{MaterialError, Medium};

/// Preset identifiers with their media and a short description.
const PRESETS: &[(&str, f64, &str)] = &[
    ("vacuum", 1.0, "Vacuum"),
    ("air", 1.0, "Air (treated as vacuum)"),
    ("SiO2", 1.45 * 1.45, "Fused silica, n = 1.45"),
    ("Si3N4", 2.0 * 2.0, "Silicon nitride, n = 2.0"),
    ("Si", 12.0, "Silicon, eps = 12"),
    ("GaAs", 3.6 * 3.6, "Gallium arsenide, n = 3.6"),
];

/// Look up a preset medium by name (case-sensitive).
pub fn lookup(name: &str) -> Result<Medium, MaterialError> {
    PRESETS
        .iter()
        .find(|(id, _, _)| *id == name)
        .map(|&(_, epsilon, _)| Medium::dielectric(epsilon))
        .ok_or_else(|| MaterialError::NotFound(name.to_string()))
}

/// All preset names in display order.
pub fn names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|(id, _, _)| *id)
}

/// Human-readable description of a preset, if it exists.
pub fn describe(name: &str) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|(id, _, _)| *id == name)
        .map(|(_, _, desc)| *desc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lookup_known() {
        assert_relative_eq!(lookup("Si").unwrap().epsilon, 12.0);
        assert_relative_eq!(lookup("air").unwrap().epsilon, 1.0);
        assert_relative_eq!(lookup("Si3N4").unwrap().refractive_index(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lookup_unknown() {
        let err = lookup("unobtainium").unwrap_err();
        assert!(matches!(err, MaterialError::NotFound(ref n) if n == "unobtainium"));
    }

    #[test]
    fn test_every_name_resolves() {
        for name in names() {
            let m = lookup(name).unwrap();
            assert!(m.validate().is_ok(), "{} is invalid", name);
            assert!(describe(name).is_some());
        }
    }
}
