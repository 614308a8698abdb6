//! Ready-made sample records for trying a store out.
//!
//! Each builder produces valid records relative to `now`, stamped with the
//! given zone offset when one is supplied.

use crate::error::ValidationError;
use crate::record::{
    HeartRateRecord, Record, Sample, SleepSessionRecord, SleepStageType, Stage, StepsRecord,
    WeightRecord,
};
use crate::time::{Instant, Interval, ZoneOffset};
use crate::units::{Mass, MassUnit};
use chrono::{DateTime, Duration, Utc};

fn interval(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    offset: Option<ZoneOffset>,
) -> Interval {
    let interval = Interval::new(start, end);
    match offset {
        Some(o) => interval.with_zone_offset(o),
        None => interval,
    }
}

/// 510 steps over the two hours before `now`
pub fn steps(now: DateTime<Utc>, offset: Option<ZoneOffset>) -> Result<Record, ValidationError> {
    let start = now - Duration::hours(2);
    let record = StepsRecord::new(start, now, 510)?.with_interval(interval(start, now, offset))?;
    Ok(record.into())
}

/// A 71 kg weigh-in at `now`
pub fn weight(now: DateTime<Utc>, offset: Option<ZoneOffset>) -> Result<Record, ValidationError> {
    let mut record = WeightRecord::new(now, Mass::new(MassUnit::Kilogram, 71.0)?);
    if let Some(o) = offset {
        record.instant = Instant::new(now).with_zone_offset(o);
    }
    Ok(record.into())
}

/// A single 128 bpm reading at `now`
pub fn heart_rate(
    now: DateTime<Utc>,
    offset: Option<ZoneOffset>,
) -> Result<Record, ValidationError> {
    let record = HeartRateRecord::new(now, now, vec![Sample::new(now, 128)])?
        .with_interval(interval(now, now, offset))?;
    Ok(record.into())
}

/// Three single-stage sessions over the last six hours: REM, sleeping, deep
pub fn sleep_sessions(
    now: DateTime<Utc>,
    offset: Option<ZoneOffset>,
) -> Result<Vec<Record>, ValidationError> {
    let hours_ago = |h: i64| now - Duration::hours(h);
    let spans = [
        (hours_ago(6), hours_ago(5), SleepStageType::Rem),
        (hours_ago(4), hours_ago(3), SleepStageType::Sleeping),
        (hours_ago(2), now, SleepStageType::Deep),
    ];

    spans
        .into_iter()
        .map(|(start, end, stage)| -> Result<Record, ValidationError> {
            let record = SleepSessionRecord::new(start, end, vec![Stage::new(start, end, stage)])?
                .with_interval(interval(start, end, offset))?;
            Ok(record.into())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordType;

    #[test]
    fn test_demo_records_are_valid() {
        let now = Utc::now();
        let offset = Some("-06:00".parse().unwrap());

        let steps = steps(now, offset).unwrap();
        assert_eq!(steps.record_type(), RecordType::Steps);
        assert_eq!(steps.interval().unwrap().start_zone_offset, offset);

        let weight = weight(now, offset).unwrap();
        assert_eq!(weight.instant().unwrap().zone_offset, offset);

        assert!(heart_rate(now, None).unwrap().validate().is_ok());

        let sessions = sleep_sessions(now, offset).unwrap();
        assert_eq!(sessions.len(), 3);
        for session in &sessions {
            assert!(session.validate().is_ok());
        }
    }
}
