//! Comfort categories of CO2 and air temperature readings

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Indoor air quality category of a CO2 concentration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumString, Display, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Co2Level {
    Excellent,
    Fair,
    NeedsImprovement,
}

/// Categorizes a CO2 concentration [ppm]
///
/// * excellent: co2 <= 600
/// * fair: 600 < co2 <= 1000
/// * needs improvement: co2 > 1000
pub fn categorize_co2(co2: f64) -> Co2Level {
    if co2 <= 600. {
        Co2Level::Excellent
    } else if co2 <= 1000. {
        Co2Level::Fair
    } else {
        Co2Level::NeedsImprovement
    }
}

/// Thermal comfort category of an air temperature (ASHRAE-55)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumString, Display, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ThermalComfort {
    TooCold,
    Comfortable,
    TooHot,
}

/// Categorizes an air temperature [C]
///
/// * too cold: ta < 21
/// * comfortable: 21 <= ta <= 26
/// * too hot: ta > 26
pub fn categorize_thermal_comfort(ta: f64) -> ThermalComfort {
    if ta < 21. {
        ThermalComfort::TooCold
    } else if ta <= 26. {
        ThermalComfort::Comfortable
    } else {
        ThermalComfort::TooHot
    }
}

/// Classification scheme applied to the measured field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classifier {
    Co2,
    ThermalComfort,
}
impl Classifier {
    /// Returns the category label of a value
    pub fn label(&self, value: f64) -> &'static str {
        match self {
            Classifier::Co2 => categorize_co2(value).into(),
            Classifier::ThermalComfort => categorize_thermal_comfort(value).into(),
        }
    }
}

/// Returns true if the column name is one of the category labels
pub fn is_category_label(label: &str) -> bool {
    label.parse::<Co2Level>().is_ok() || label.parse::<ThermalComfort>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn co2_boundaries() {
        assert_eq!(categorize_co2(600.), Co2Level::Excellent);
        assert_eq!(categorize_co2(601.), Co2Level::Fair);
        assert_eq!(categorize_co2(1000.), Co2Level::Fair);
        assert_eq!(categorize_co2(1001.), Co2Level::NeedsImprovement);
        assert_eq!(categorize_co2(0.), Co2Level::Excellent);
    }

    #[test]
    fn thermal_comfort_boundaries() {
        assert_eq!(categorize_thermal_comfort(21.), ThermalComfort::Comfortable);
        assert_eq!(categorize_thermal_comfort(20.99), ThermalComfort::TooCold);
        assert_eq!(categorize_thermal_comfort(26.), ThermalComfort::Comfortable);
        assert_eq!(categorize_thermal_comfort(26.01), ThermalComfort::TooHot);
    }

    #[test]
    fn labels() {
        let co2: Vec<_> = Co2Level::iter().map(|c| c.to_string()).collect();
        assert_eq!(co2, vec!["excellent", "fair", "needs_improvement"]);
        let ta: Vec<&'static str> = ThermalComfort::iter().map(|c| c.into()).collect();
        assert_eq!(ta, vec!["too_cold", "comfortable", "too_hot"]);
        assert_eq!(Classifier::Co2.label(1500.), "needs_improvement");
        assert_eq!(Classifier::ThermalComfort.label(18.), "too_cold");
        assert!(is_category_label("fair"));
        assert!(!is_category_label("count"));
    }
}
