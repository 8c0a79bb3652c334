use std::collections::HashSet;

/// Units-of-measure capability consulted when profile validation is enabled.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait UnitsOfMeasure: Send + Sync {
    /// Report whether a unit string is acceptable.
    fn validate(&self, units: &str) -> bool;
}

/// Validator backed by a fixed reference set of unit names.
///
/// An empty unit string is always valid: resources without a measurement
/// unit are legal.
pub struct StaticUnitsOfMeasure {
    units: HashSet<String>,
}

impl StaticUnitsOfMeasure {
    pub fn new<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            units: units.into_iter().map(Into::into).collect(),
        }
    }
}

impl UnitsOfMeasure for StaticUnitsOfMeasure {
    fn validate(&self, units: &str) -> bool {
        units.is_empty() || self.units.contains(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_known_units() {
        let uom = StaticUnitsOfMeasure::new(["Celsius", "percent"]);
        assert!(uom.validate("Celsius"));
        assert!(uom.validate("percent"));
    }

    #[test]
    fn rejects_unknown_units() {
        let uom = StaticUnitsOfMeasure::new(["Celsius"]);
        assert!(!uom.validate("Smoots"));
    }

    #[test]
    fn empty_units_are_valid() {
        let uom = StaticUnitsOfMeasure::new(Vec::<String>::new());
        assert!(uom.validate(""));
    }
}
