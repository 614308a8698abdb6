//! Unit-tagged physical measurements.
//!
//! Every quantity kind (mass, length, energy, ...) has its own unit enum, so a
//! `Mass` can never carry `watts`. Values are checked on construction and on
//! deserialization; conversion between units is always an explicit call.

use crate::error::ValidationError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unit belonging to exactly one quantity kind
pub trait Unit: Copy + Eq + fmt::Debug + Serialize + DeserializeOwned + 'static {
    /// Human readable quantity kind, used in errors
    const KIND: &'static str;

    /// Every unit of this kind
    const ALL: &'static [Self];

    /// Smallest admissible value, expressed in the base unit
    const BASE_MIN: f64 = 0.0;

    /// Wire name of the unit
    fn name(self) -> &'static str;

    /// Convert a value in this unit to the kind's base unit
    fn to_base(self, value: f64) -> f64;

    /// Convert a value in the kind's base unit to this unit
    fn from_base(self, value: f64) -> f64;

    /// Look up a unit by its wire name
    fn parse(name: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .iter()
            .copied()
            .find(|u| u.name() == name)
            .ok_or_else(|| ValidationError::InvalidUnit {
                kind: Self::KIND,
                unit: name.to_string(),
            })
    }
}

macro_rules! unit_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            const VARIANTS: &'static [$name] = &[$($name::$variant),+];

            fn wire_name(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.wire_name())
            }
        }
    };
}

unit_enum!(
    /// Mass units (base: gram)
    MassUnit {
        Gram => "gram",
        Kilogram => "kilogram",
        Milligram => "milligram",
        Microgram => "microgram",
        Ounce => "ounce",
        Pound => "pound",
    }
);

unit_enum!(
    /// Length units (base: meter)
    LengthUnit {
        Meter => "meter",
        Kilometer => "kilometer",
        Mile => "mile",
        Inch => "inch",
        Feet => "feet",
    }
);

unit_enum!(
    /// Energy units (base: joule)
    EnergyUnit {
        Calories => "calories",
        Kilocalories => "kilocalories",
        Joules => "joules",
        Kilojoules => "kilojoules",
    }
);

unit_enum!(
    /// Temperature units (base: celsius)
    TemperatureUnit {
        Celsius => "celsius",
        Fahrenheit => "fahrenheit",
    }
);

unit_enum!(
    /// Pressure units (base: millimeters of mercury)
    PressureUnit {
        MillimetersOfMercury => "millimetersOfMercury",
    }
);

unit_enum!(
    /// Power units (base: watt)
    PowerUnit {
        KilocaloriesPerDay => "kilocaloriesPerDay",
        Watts => "watts",
    }
);

unit_enum!(
    /// Blood glucose concentration units (base: millimoles per liter)
    BloodGlucoseUnit {
        MilligramsPerDeciliter => "milligramsPerDeciliter",
        MillimolesPerLiter => "millimolesPerLiter",
    }
);

const GRAMS_PER_OUNCE: f64 = 28.349_523_125;
const GRAMS_PER_POUND: f64 = 453.592_37;
const METERS_PER_MILE: f64 = 1_609.344;
const METERS_PER_INCH: f64 = 0.0254;
const METERS_PER_FOOT: f64 = 0.3048;
const JOULES_PER_CALORIE: f64 = 4.184;
const WATTS_PER_KCAL_PER_DAY: f64 = 4_184.0 / 86_400.0;
const MG_DL_PER_MMOL_L: f64 = 18.0;

impl MassUnit {
    fn grams(self) -> f64 {
        match self {
            MassUnit::Gram => 1.0,
            MassUnit::Kilogram => 1_000.0,
            MassUnit::Milligram => 1e-3,
            MassUnit::Microgram => 1e-6,
            MassUnit::Ounce => GRAMS_PER_OUNCE,
            MassUnit::Pound => GRAMS_PER_POUND,
        }
    }
}

impl Unit for MassUnit {
    const KIND: &'static str = "mass";
    const ALL: &'static [Self] = Self::VARIANTS;

    fn name(self) -> &'static str {
        self.wire_name()
    }

    fn to_base(self, value: f64) -> f64 {
        value * self.grams()
    }

    fn from_base(self, value: f64) -> f64 {
        value / self.grams()
    }
}

impl LengthUnit {
    fn meters(self) -> f64 {
        match self {
            LengthUnit::Meter => 1.0,
            LengthUnit::Kilometer => 1_000.0,
            LengthUnit::Mile => METERS_PER_MILE,
            LengthUnit::Inch => METERS_PER_INCH,
            LengthUnit::Feet => METERS_PER_FOOT,
        }
    }
}

impl Unit for LengthUnit {
    const KIND: &'static str = "length";
    const ALL: &'static [Self] = Self::VARIANTS;

    fn name(self) -> &'static str {
        self.wire_name()
    }

    fn to_base(self, value: f64) -> f64 {
        value * self.meters()
    }

    fn from_base(self, value: f64) -> f64 {
        value / self.meters()
    }
}

impl EnergyUnit {
    fn joules(self) -> f64 {
        match self {
            EnergyUnit::Calories => JOULES_PER_CALORIE,
            EnergyUnit::Kilocalories => JOULES_PER_CALORIE * 1_000.0,
            EnergyUnit::Joules => 1.0,
            EnergyUnit::Kilojoules => 1_000.0,
        }
    }
}

impl Unit for EnergyUnit {
    const KIND: &'static str = "energy";
    const ALL: &'static [Self] = Self::VARIANTS;

    fn name(self) -> &'static str {
        self.wire_name()
    }

    fn to_base(self, value: f64) -> f64 {
        value * self.joules()
    }

    fn from_base(self, value: f64) -> f64 {
        value / self.joules()
    }
}

impl Unit for TemperatureUnit {
    const KIND: &'static str = "temperature";
    const ALL: &'static [Self] = Self::VARIANTS;
    // Absolute zero
    const BASE_MIN: f64 = -273.15;

    fn name(self) -> &'static str {
        self.wire_name()
    }

    fn to_base(self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => value,
            TemperatureUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        }
    }

    fn from_base(self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => value,
            TemperatureUnit::Fahrenheit => value * 9.0 / 5.0 + 32.0,
        }
    }
}

impl Unit for PressureUnit {
    const KIND: &'static str = "pressure";
    const ALL: &'static [Self] = Self::VARIANTS;

    fn name(self) -> &'static str {
        self.wire_name()
    }

    fn to_base(self, value: f64) -> f64 {
        value
    }

    fn from_base(self, value: f64) -> f64 {
        value
    }
}

impl Unit for PowerUnit {
    const KIND: &'static str = "power";
    const ALL: &'static [Self] = Self::VARIANTS;

    fn name(self) -> &'static str {
        self.wire_name()
    }

    fn to_base(self, value: f64) -> f64 {
        match self {
            PowerUnit::Watts => value,
            PowerUnit::KilocaloriesPerDay => value * WATTS_PER_KCAL_PER_DAY,
        }
    }

    fn from_base(self, value: f64) -> f64 {
        match self {
            PowerUnit::Watts => value,
            PowerUnit::KilocaloriesPerDay => value / WATTS_PER_KCAL_PER_DAY,
        }
    }
}

impl Unit for BloodGlucoseUnit {
    const KIND: &'static str = "blood glucose";
    const ALL: &'static [Self] = Self::VARIANTS;

    fn name(self) -> &'static str {
        self.wire_name()
    }

    fn to_base(self, value: f64) -> f64 {
        match self {
            BloodGlucoseUnit::MillimolesPerLiter => value,
            BloodGlucoseUnit::MilligramsPerDeciliter => value / MG_DL_PER_MMOL_L,
        }
    }

    fn from_base(self, value: f64) -> f64 {
        match self {
            BloodGlucoseUnit::MillimolesPerLiter => value,
            BloodGlucoseUnit::MilligramsPerDeciliter => value * MG_DL_PER_MMOL_L,
        }
    }
}

/// Wire form of a measurement before the unit is resolved
#[derive(Deserialize)]
struct MeasurementRepr {
    unit: String,
    value: f64,
}

/// A value tagged with a unit of one quantity kind
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MeasurementRepr", bound(deserialize = "U: Unit"))]
pub struct Measurement<U> {
    unit: U,
    value: f64,
}

pub type Mass = Measurement<MassUnit>;
pub type Length = Measurement<LengthUnit>;
pub type Energy = Measurement<EnergyUnit>;
pub type Temperature = Measurement<TemperatureUnit>;
pub type Pressure = Measurement<PressureUnit>;
pub type Power = Measurement<PowerUnit>;
pub type BloodGlucose = Measurement<BloodGlucoseUnit>;

impl<U: Unit> Measurement<U> {
    /// Build a measurement, rejecting non-finite or out-of-domain values
    pub fn new(unit: U, value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::InvalidValue(format!(
                "{} value must be finite, got {}",
                U::KIND,
                value
            )));
        }
        // Small tolerance so the domain edge itself survives unit round trips
        if unit.to_base(value) < U::BASE_MIN - 1e-9 {
            return Err(ValidationError::InvalidValue(format!(
                "{} {} {} is below the minimum for {}",
                U::KIND,
                value,
                unit.name(),
                U::KIND
            )));
        }
        Ok(Self { unit, value })
    }

    /// Build a measurement from a wire unit name
    pub fn parse(unit: &str, value: f64) -> Result<Self, ValidationError> {
        Self::new(U::parse(unit)?, value)
    }

    pub fn unit(&self) -> U {
        self.unit
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Express the same physical quantity in another unit of this kind.
    ///
    /// Fails with `InvalidValue` when the converted value is not finite.
    pub fn convert(&self, target: U) -> Result<Self, ValidationError> {
        if target == self.unit {
            return Ok(*self);
        }
        Self::new(target, target.from_base(self.unit.to_base(self.value)))
    }

    /// Value in the kind's base unit, for comparisons across units
    pub fn base_value(&self) -> f64 {
        self.unit.to_base(self.value)
    }

    /// Compare two measurements physically, within a relative tolerance
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        let a = self.base_value();
        let b = other.base_value();
        (a - b).abs() <= tolerance * a.abs().max(b.abs()).max(1.0)
    }
}

impl<U: Unit> TryFrom<MeasurementRepr> for Measurement<U> {
    type Error = ValidationError;

    fn try_from(repr: MeasurementRepr) -> Result<Self, Self::Error> {
        Self::parse(&repr.unit, repr.value)
    }
}

impl<U: Unit + fmt::Display> fmt::Display for Measurement<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trips<U: Unit>(values: &[f64]) {
        for &from in U::ALL {
            for &to in U::ALL {
                for &value in values {
                    let m = Measurement::new(from, value).unwrap();
                    let back = m.convert(to).unwrap().convert(from).unwrap();
                    assert_eq!(back.unit(), from);
                    assert!(
                        (back.value() - value).abs() <= 1e-9 * value.abs().max(1.0),
                        "{:?} -> {:?} -> {:?}: {} became {}",
                        from,
                        to,
                        from,
                        value,
                        back.value()
                    );
                }
            }
        }
    }

    #[test]
    fn test_construct_keeps_fields() {
        let m = Mass::new(MassUnit::Kilogram, 71.0).unwrap();
        assert_eq!(m.unit(), MassUnit::Kilogram);
        assert_eq!(m.value(), 71.0);
    }

    #[test]
    fn test_conversions_round_trip() {
        assert_round_trips::<MassUnit>(&[0.0, 0.5, 71.0, 12_345.678]);
        assert_round_trips::<LengthUnit>(&[0.0, 1.8, 42_195.0]);
        assert_round_trips::<EnergyUnit>(&[0.0, 250.0, 1e6]);
        assert_round_trips::<TemperatureUnit>(&[-40.0, 0.0, 36.6, 98.6]);
        assert_round_trips::<PressureUnit>(&[80.0, 120.0]);
        assert_round_trips::<PowerUnit>(&[0.0, 1_650.0]);
        assert_round_trips::<BloodGlucoseUnit>(&[0.0, 5.5, 99.0]);
    }

    #[test]
    fn test_standard_factors() {
        let kg = Mass::new(MassUnit::Kilogram, 1.0).unwrap();
        assert!((kg.convert(MassUnit::Gram).unwrap().value() - 1_000.0).abs() < 1e-9);
        assert!((kg.convert(MassUnit::Ounce).unwrap().value() - 35.274).abs() < 1e-3);

        let mile = Length::new(LengthUnit::Mile, 1.0).unwrap();
        assert!((mile.convert(LengthUnit::Kilometer).unwrap().value() - 1.609_344).abs() < 1e-9);

        let boiling = Temperature::new(TemperatureUnit::Celsius, 100.0).unwrap();
        assert!((boiling.convert(TemperatureUnit::Fahrenheit).unwrap().value() - 212.0).abs() < 1e-9);

        let kcal = Energy::new(EnergyUnit::Kilocalories, 1.0).unwrap();
        assert!((kcal.convert(EnergyUnit::Kilojoules).unwrap().value() - 4.184).abs() < 1e-9);

        let glucose = BloodGlucose::new(BloodGlucoseUnit::MillimolesPerLiter, 5.0).unwrap();
        assert!(
            (glucose.convert(BloodGlucoseUnit::MilligramsPerDeciliter).unwrap().value() - 90.0).abs()
                < 1e-9
        );
    }

    #[test]
    fn test_conversion_overflow_rejected() {
        let huge = Mass::new(MassUnit::Kilogram, 1e306).unwrap();
        assert!(matches!(
            huge.convert(MassUnit::Microgram),
            Err(ValidationError::InvalidValue(_))
        ));

        let large = Mass::new(MassUnit::Kilogram, 1e300).unwrap();
        assert!(large.convert(MassUnit::Gram).unwrap().value().is_finite());
    }

    #[test]
    fn test_rejects_unknown_unit() {
        let err = Mass::parse("watts", 1.0).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidUnit {
                kind: "mass",
                unit: "watts".into()
            }
        );
        assert!(Power::parse("watts", 1.0).is_ok());
    }

    #[test]
    fn test_rejects_out_of_domain_values() {
        assert!(matches!(
            Mass::new(MassUnit::Gram, -1.0),
            Err(ValidationError::InvalidValue(_))
        ));
        assert!(matches!(
            Length::new(LengthUnit::Meter, f64::NAN),
            Err(ValidationError::InvalidValue(_))
        ));
        assert!(matches!(
            Energy::new(EnergyUnit::Joules, f64::INFINITY),
            Err(ValidationError::InvalidValue(_))
        ));
        assert!(matches!(
            Temperature::new(TemperatureUnit::Celsius, -300.0),
            Err(ValidationError::InvalidValue(_))
        ));
        // Sub-zero temperatures above absolute zero are fine
        assert!(Temperature::new(TemperatureUnit::Fahrenheit, -40.0).is_ok());
    }

    #[test]
    fn test_wire_format() {
        let m = Pressure::new(PressureUnit::MillimetersOfMercury, 120.0).unwrap();
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "unit": "millimetersOfMercury", "value": 120.0 })
        );

        let parsed: Power =
            serde_json::from_value(serde_json::json!({ "unit": "kilocaloriesPerDay", "value": 1600 }))
                .unwrap();
        assert_eq!(parsed.unit(), PowerUnit::KilocaloriesPerDay);
    }

    #[test]
    fn test_deserialize_validates() {
        let bad_unit = serde_json::from_value::<Mass>(serde_json::json!({ "unit": "meter", "value": 1 }));
        assert!(bad_unit.unwrap_err().to_string().contains("invalid unit"));

        let negative =
            serde_json::from_value::<Mass>(serde_json::json!({ "unit": "kilogram", "value": -3 }));
        assert!(negative.is_err());
    }
}
