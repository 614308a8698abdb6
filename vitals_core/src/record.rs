//! Health record variants.
//!
//! `Record` is a sum type keyed by the wire `type` tag. Each variant carries
//! only the fields that describe its own measurement: interval records share
//! an [`Interval`], instant records share an [`Instant`]. Keys belonging to
//! other variants (and the legacy `startTime`/`endTime` on instant payloads)
//! are ignored on input and never written back out.

use crate::error::ValidationError;
use crate::time::{Instant, Interval};
use crate::units::{
    BloodGlucose, BloodGlucoseUnit, Energy, EnergyUnit, Length, LengthUnit, Mass, MassUnit,
    Power, PowerUnit, Pressure, PressureUnit, Temperature, TemperatureUnit, Unit,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Record Type Tags
// ============================================================================

/// Wire tag of a record variant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    Steps,
    #[serde(alias = "HeartRateSeries")]
    HeartRate,
    SleepSession,
    ActiveCalories,
    BasalBodyTemperature,
    BasalMetabolicRate,
    BloodGlucose,
    BloodPressure,
    Height,
    Weight,
}

impl RecordType {
    pub const ALL: [RecordType; 10] = [
        RecordType::Steps,
        RecordType::HeartRate,
        RecordType::SleepSession,
        RecordType::ActiveCalories,
        RecordType::BasalBodyTemperature,
        RecordType::BasalMetabolicRate,
        RecordType::BloodGlucose,
        RecordType::BloodPressure,
        RecordType::Height,
        RecordType::Weight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::Steps => "Steps",
            RecordType::HeartRate => "HeartRate",
            RecordType::SleepSession => "SleepSession",
            RecordType::ActiveCalories => "ActiveCalories",
            RecordType::BasalBodyTemperature => "BasalBodyTemperature",
            RecordType::BasalMetabolicRate => "BasalMetabolicRate",
            RecordType::BloodGlucose => "BloodGlucose",
            RecordType::BloodPressure => "BloodPressure",
            RecordType::Height => "Height",
            RecordType::Weight => "Weight",
        }
    }

    /// Interval records span `startTime..endTime`; the rest are instants
    pub fn is_interval(self) -> bool {
        matches!(
            self,
            RecordType::Steps
                | RecordType::HeartRate
                | RecordType::SleepSession
                | RecordType::ActiveCalories
        )
    }

    /// Wire keys a payload of this type must carry
    pub fn mandatory_fields(self) -> &'static [&'static str] {
        match self {
            RecordType::Steps => &["startTime", "endTime", "count"],
            RecordType::HeartRate => &["startTime", "endTime", "samples"],
            RecordType::SleepSession => &["startTime", "endTime", "stages"],
            RecordType::ActiveCalories => &["startTime", "endTime", "energy"],
            RecordType::BasalBodyTemperature => &["time", "temperature"],
            RecordType::BasalMetabolicRate => &["time", "basalMetabolicRate"],
            RecordType::BloodGlucose => &["time", "level"],
            RecordType::BloodPressure => &["time", "systolic", "diastolic"],
            RecordType::Height => &["time", "height"],
            RecordType::Weight => &["time", "weight"],
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "HeartRateSeries" {
            return Ok(RecordType::HeartRate);
        }
        RecordType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidValue(format!("unknown record type '{}'", s)))
    }
}

// ============================================================================
// Nested Values
// ============================================================================

/// Accepted heart rate range, beats per minute
const MIN_BPM: i64 = 1;
const MAX_BPM: i64 = 300;

/// One heart rate reading inside a heart rate record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub time: DateTime<Utc>,
    pub beats_per_minute: i64,
}

impl Sample {
    pub fn new(time: DateTime<Utc>, beats_per_minute: i64) -> Self {
        Self {
            time,
            beats_per_minute,
        }
    }
}

/// Sleep stage codes as the store numbers them
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SleepStageType {
    Unknown = 0,
    Awake = 1,
    Sleeping = 2,
    OutOfBed = 3,
    Light = 4,
    Deep = 5,
    Rem = 6,
    AwakeInBed = 7,
}

impl TryFrom<u8> for SleepStageType {
    type Error = ValidationError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => SleepStageType::Unknown,
            1 => SleepStageType::Awake,
            2 => SleepStageType::Sleeping,
            3 => SleepStageType::OutOfBed,
            4 => SleepStageType::Light,
            5 => SleepStageType::Deep,
            6 => SleepStageType::Rem,
            7 => SleepStageType::AwakeInBed,
            other => {
                return Err(ValidationError::InvalidValue(format!(
                    "sleep stage code {} is outside 0..=7",
                    other
                )))
            }
        })
    }
}

impl From<SleepStageType> for u8 {
    fn from(stage: SleepStageType) -> u8 {
        stage as u8
    }
}

/// A stage inside a sleep session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub stage: SleepStageType,
}

impl Stage {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>, stage: SleepStageType) -> Self {
        Self {
            start_time,
            end_time,
            stage,
        }
    }
}

/// Where a basal body temperature was taken
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureMeasurementLocation {
    #[default]
    Unknown,
    Armpit,
    Finger,
    Forehead,
    Mouth,
    Rectum,
    TemporalArtery,
    Toe,
    Ear,
    Wrist,
    Vagina,
}

/// Fluid a glucose reading was taken from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecimenSource {
    #[default]
    Unknown,
    InterstitialFluid,
    CapillaryBlood,
    Plasma,
    Serum,
    Tears,
    WholeBlood,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    #[default]
    Unknown,
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationToMeal {
    #[default]
    Unknown,
    General,
    Fasting,
    BeforeMeal,
    AfterMeal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPosition {
    #[default]
    Unknown,
    StandingUp,
    SittingDown,
    LyingDown,
    Reclining,
}

/// Arm or wrist a blood pressure cuff was placed on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BloodPressureMeasurementLocation {
    #[default]
    Unknown,
    LeftWrist,
    RightWrist,
    LeftUpperArm,
    RightUpperArm,
}

// ============================================================================
// Interval Records
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepsRecord {
    #[serde(flatten)]
    pub interval: Interval,
    pub count: i64,
}

impl StepsRecord {
    pub fn new(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        count: i64,
    ) -> Result<Self, ValidationError> {
        let record = Self {
            interval: Interval::new(start_time, end_time),
            count,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn with_interval(mut self, interval: Interval) -> Result<Self, ValidationError> {
        self.interval = interval;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.interval.check_order(true)?;
        if self.count < 0 {
            return Err(ValidationError::InvalidValue(format!(
                "step count must be non-negative, got {}",
                self.count
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateRecord {
    #[serde(flatten)]
    pub interval: Interval,
    pub samples: Vec<Sample>,
}

impl HeartRateRecord {
    /// Samples are sorted by time before validation
    pub fn new(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        mut samples: Vec<Sample>,
    ) -> Result<Self, ValidationError> {
        samples.sort_by_key(|s| s.time);
        let record = Self {
            interval: Interval::new(start_time, end_time),
            samples,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn with_interval(mut self, interval: Interval) -> Result<Self, ValidationError> {
        self.interval = interval;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.interval.check_order(false)?;
        if self.samples.is_empty() {
            return Err(ValidationError::MissingField("samples".into()));
        }

        for sample in &self.samples {
            if !(MIN_BPM..=MAX_BPM).contains(&sample.beats_per_minute) {
                return Err(ValidationError::InvalidValue(format!(
                    "heart rate {} bpm is outside {}..={}",
                    sample.beats_per_minute, MIN_BPM, MAX_BPM
                )));
            }
            if !self.interval.contains_span(sample.time, sample.time) {
                return Err(ValidationError::InvalidRange(format!(
                    "sample at {} falls outside the record interval",
                    sample.time
                )));
            }
        }

        if self.samples.windows(2).any(|w| w[0].time > w[1].time) {
            return Err(ValidationError::InvalidRange(
                "samples must be ordered by time".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepSessionRecord {
    #[serde(flatten)]
    pub interval: Interval,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub stages: Vec<Stage>,
}

impl SleepSessionRecord {
    /// Stages are sorted by start time before validation
    pub fn new(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        mut stages: Vec<Stage>,
    ) -> Result<Self, ValidationError> {
        stages.sort_by_key(|s| s.start_time);
        let record = Self {
            interval: Interval::new(start_time, end_time),
            title: None,
            notes: None,
            stages,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn with_interval(mut self, interval: Interval) -> Result<Self, ValidationError> {
        self.interval = interval;
        self.validate()?;
        Ok(self)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Stages must be non-empty, well formed, nested in the session, and
    /// must not overlap one another.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.interval.check_order(false)?;
        if self.stages.is_empty() {
            return Err(ValidationError::MissingField("stages".into()));
        }

        for stage in &self.stages {
            if stage.start_time >= stage.end_time {
                return Err(ValidationError::InvalidRange(format!(
                    "stage {:?} starts at {} but ends at {}",
                    stage.stage, stage.start_time, stage.end_time
                )));
            }
            if !self.interval.contains_span(stage.start_time, stage.end_time) {
                return Err(ValidationError::InvalidRange(format!(
                    "stage {:?} ({} - {}) falls outside the session",
                    stage.stage, stage.start_time, stage.end_time
                )));
            }
        }

        let mut ordered: Vec<&Stage> = self.stages.iter().collect();
        ordered.sort_by_key(|s| s.start_time);
        if let Some(pair) = ordered.windows(2).find(|w| w[1].start_time < w[0].end_time) {
            return Err(ValidationError::InvalidRange(format!(
                "stage starting at {} overlaps the stage ending at {}",
                pair[1].start_time, pair[0].end_time
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCaloriesRecord {
    #[serde(flatten)]
    pub interval: Interval,
    pub energy: Energy,
}

impl ActiveCaloriesRecord {
    pub fn new(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        energy: Energy,
    ) -> Result<Self, ValidationError> {
        let record = Self {
            interval: Interval::new(start_time, end_time),
            energy,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn with_interval(mut self, interval: Interval) -> Result<Self, ValidationError> {
        self.interval = interval;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.interval.check_order(true)
    }
}

// ============================================================================
// Instant Records
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasalBodyTemperatureRecord {
    #[serde(flatten)]
    pub instant: Instant,
    pub temperature: Temperature,
    #[serde(default)]
    pub measurement_location: TemperatureMeasurementLocation,
}

impl BasalBodyTemperatureRecord {
    pub fn new(time: DateTime<Utc>, temperature: Temperature) -> Self {
        Self {
            instant: Instant::new(time),
            temperature,
            measurement_location: TemperatureMeasurementLocation::default(),
        }
    }

    pub fn with_location(mut self, location: TemperatureMeasurementLocation) -> Self {
        self.measurement_location = location;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasalMetabolicRateRecord {
    #[serde(flatten)]
    pub instant: Instant,
    pub basal_metabolic_rate: Power,
}

impl BasalMetabolicRateRecord {
    pub fn new(time: DateTime<Utc>, basal_metabolic_rate: Power) -> Self {
        Self {
            instant: Instant::new(time),
            basal_metabolic_rate,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodGlucoseRecord {
    #[serde(flatten)]
    pub instant: Instant,
    pub level: BloodGlucose,
    #[serde(default)]
    pub specimen_source: SpecimenSource,
    #[serde(default)]
    pub meal_type: MealType,
    #[serde(default)]
    pub relation_to_meal: RelationToMeal,
}

impl BloodGlucoseRecord {
    pub fn new(time: DateTime<Utc>, level: BloodGlucose) -> Self {
        Self {
            instant: Instant::new(time),
            level,
            specimen_source: SpecimenSource::default(),
            meal_type: MealType::default(),
            relation_to_meal: RelationToMeal::default(),
        }
    }

    pub fn with_context(
        mut self,
        specimen_source: SpecimenSource,
        meal_type: MealType,
        relation_to_meal: RelationToMeal,
    ) -> Self {
        self.specimen_source = specimen_source;
        self.meal_type = meal_type;
        self.relation_to_meal = relation_to_meal;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodPressureRecord {
    #[serde(flatten)]
    pub instant: Instant,
    pub systolic: Pressure,
    pub diastolic: Pressure,
    #[serde(default)]
    pub body_position: BodyPosition,
    #[serde(default)]
    pub measurement_location: BloodPressureMeasurementLocation,
}

impl BloodPressureRecord {
    pub fn new(time: DateTime<Utc>, systolic: Pressure, diastolic: Pressure) -> Self {
        Self {
            instant: Instant::new(time),
            systolic,
            diastolic,
            body_position: BodyPosition::default(),
            measurement_location: BloodPressureMeasurementLocation::default(),
        }
    }

    pub fn with_position(
        mut self,
        body_position: BodyPosition,
        measurement_location: BloodPressureMeasurementLocation,
    ) -> Self {
        self.body_position = body_position;
        self.measurement_location = measurement_location;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeightRecord {
    #[serde(flatten)]
    pub instant: Instant,
    pub height: Length,
}

impl HeightRecord {
    pub fn new(time: DateTime<Utc>, height: Length) -> Self {
        Self {
            instant: Instant::new(time),
            height,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecord {
    #[serde(flatten)]
    pub instant: Instant,
    pub weight: Mass,
}

impl WeightRecord {
    pub fn new(time: DateTime<Utc>, weight: Mass) -> Self {
        Self {
            instant: Instant::new(time),
            weight,
        }
    }
}

// ============================================================================
// Record
// ============================================================================

/// Borrowed view of a record's time fields
#[derive(Clone, Copy, Debug)]
pub enum Timing<'a> {
    Interval(&'a Interval),
    Instant(&'a Instant),
}

/// A health record of exactly one kind
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Record {
    Steps(StepsRecord),
    #[serde(alias = "HeartRateSeries")]
    HeartRate(HeartRateRecord),
    SleepSession(SleepSessionRecord),
    ActiveCalories(ActiveCaloriesRecord),
    BasalBodyTemperature(BasalBodyTemperatureRecord),
    BasalMetabolicRate(BasalMetabolicRateRecord),
    BloodGlucose(BloodGlucoseRecord),
    BloodPressure(BloodPressureRecord),
    Height(HeightRecord),
    Weight(WeightRecord),
}

impl Record {
    pub fn record_type(&self) -> RecordType {
        match self {
            Record::Steps(_) => RecordType::Steps,
            Record::HeartRate(_) => RecordType::HeartRate,
            Record::SleepSession(_) => RecordType::SleepSession,
            Record::ActiveCalories(_) => RecordType::ActiveCalories,
            Record::BasalBodyTemperature(_) => RecordType::BasalBodyTemperature,
            Record::BasalMetabolicRate(_) => RecordType::BasalMetabolicRate,
            Record::BloodGlucose(_) => RecordType::BloodGlucose,
            Record::BloodPressure(_) => RecordType::BloodPressure,
            Record::Height(_) => RecordType::Height,
            Record::Weight(_) => RecordType::Weight,
        }
    }

    /// The record's temporal shape
    pub fn timing(&self) -> Timing<'_> {
        match self {
            Record::Steps(r) => Timing::Interval(&r.interval),
            Record::HeartRate(r) => Timing::Interval(&r.interval),
            Record::SleepSession(r) => Timing::Interval(&r.interval),
            Record::ActiveCalories(r) => Timing::Interval(&r.interval),
            Record::BasalBodyTemperature(r) => Timing::Instant(&r.instant),
            Record::BasalMetabolicRate(r) => Timing::Instant(&r.instant),
            Record::BloodGlucose(r) => Timing::Instant(&r.instant),
            Record::BloodPressure(r) => Timing::Instant(&r.instant),
            Record::Height(r) => Timing::Instant(&r.instant),
            Record::Weight(r) => Timing::Instant(&r.instant),
        }
    }

    pub fn interval(&self) -> Option<&Interval> {
        match self.timing() {
            Timing::Interval(interval) => Some(interval),
            Timing::Instant(_) => None,
        }
    }

    pub fn instant(&self) -> Option<&Instant> {
        match self.timing() {
            Timing::Instant(instant) => Some(instant),
            Timing::Interval(_) => None,
        }
    }

    /// `(start, end)` of the record; instants start and end at `time`
    pub fn time_span(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        match self.timing() {
            Timing::Interval(interval) => (interval.start_time, interval.end_time),
            Timing::Instant(instant) => (instant.time, instant.time),
        }
    }

    /// Time records are ordered by: `startTime` or `time`
    pub fn sort_time(&self) -> DateTime<Utc> {
        self.time_span().0
    }

    /// Check every invariant of this record's variant
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Record::Steps(r) => r.validate(),
            Record::HeartRate(r) => r.validate(),
            Record::SleepSession(r) => r.validate(),
            Record::ActiveCalories(r) => r.validate(),
            // Instants hold one timestamp and measurements validated on construction
            _ => Ok(()),
        }
    }

    /// Decode and validate a wire payload.
    ///
    /// Mandatory keys are checked first so an absent field reports
    /// `MissingField`, and measurement units are resolved against the
    /// field's quantity kind so a wrong unit reports `InvalidUnit`.
    pub fn from_json(value: Value) -> Result<Record, ValidationError> {
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ValidationError::MissingField("type".into()))?;
        let record_type: RecordType = tag.parse()?;

        for field in record_type.mandatory_fields() {
            match value.get(*field) {
                None | Some(Value::Null) => {
                    return Err(ValidationError::MissingField((*field).to_string()))
                }
                _ => {}
            }
        }

        match record_type {
            RecordType::ActiveCalories => check_unit::<EnergyUnit>(&value, "energy")?,
            RecordType::BasalBodyTemperature => {
                check_unit::<TemperatureUnit>(&value, "temperature")?
            }
            RecordType::BasalMetabolicRate => {
                check_unit::<PowerUnit>(&value, "basalMetabolicRate")?
            }
            RecordType::BloodGlucose => check_unit::<BloodGlucoseUnit>(&value, "level")?,
            RecordType::BloodPressure => {
                check_unit::<PressureUnit>(&value, "systolic")?;
                check_unit::<PressureUnit>(&value, "diastolic")?;
            }
            RecordType::Height => check_unit::<LengthUnit>(&value, "height")?,
            RecordType::Weight => check_unit::<MassUnit>(&value, "weight")?,
            _ => {}
        }

        let record: Record = serde_json::from_value(value)
            .map_err(|e| ValidationError::InvalidValue(e.to_string()))?;
        record.validate()?;
        Ok(record)
    }
}

fn check_unit<U: Unit>(value: &Value, field: &str) -> Result<(), ValidationError> {
    let Some(measurement) = value.get(field).and_then(Value::as_object) else {
        return Ok(());
    };
    for key in ["unit", "value"] {
        if matches!(measurement.get(key), None | Some(Value::Null)) {
            return Err(ValidationError::MissingField(format!("{}.{}", field, key)));
        }
    }
    match measurement.get("unit") {
        Some(Value::String(unit)) => U::parse(unit).map(|_| ()),
        _ => Ok(()),
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(
            impl From<$ty> for Record {
                fn from(record: $ty) -> Self {
                    Record::$variant(record)
                }
            }
        )+
    };
}

impl_from_variant!(
    Steps(StepsRecord),
    HeartRate(HeartRateRecord),
    SleepSession(SleepSessionRecord),
    ActiveCalories(ActiveCaloriesRecord),
    BasalBodyTemperature(BasalBodyTemperatureRecord),
    BasalMetabolicRate(BasalMetabolicRateRecord),
    BloodGlucose(BloodGlucoseRecord),
    BloodPressure(BloodPressureRecord),
    Height(HeightRecord),
    Weight(WeightRecord),
);
