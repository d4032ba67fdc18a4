//! Search, filter and nearest-match queries over sets of weather records.
//!
//! All functions borrow their inputs and never mutate them. Collections are
//! scanned in slice order.

use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    model::WeatherRecord,
    registry::{LookupError, StatusCodeRegistry},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the specified time is not included in the weather coverage range")]
pub struct NotFoundError {
    pub timestamp: i64,
}

/// Checks whether the registry label for `record`'s weather code equals `status`.
///
/// Only the registry label is lower-cased. `status` is compared as given, so
/// `"Rain"` never matches; callers pass lowercase labels.
pub fn status_is<R, G>(record: &R, status: &str, registry: &G) -> Result<bool, LookupError>
where
    R: WeatherRecord + ?Sized,
    G: StatusCodeRegistry + ?Sized,
{
    let label = registry.label_for(record.weather_code())?.to_lowercase();
    Ok(label == status)
}

/// True if at least one record has `status`. Stops at the first match.
pub fn any_status_is<R, G>(records: &[R], status: &str, registry: &G) -> Result<bool, LookupError>
where
    R: WeatherRecord,
    G: StatusCodeRegistry + ?Sized,
{
    for record in records {
        if status_is(record, status, registry)? {
            trace!(status, reference_time = record.reference_time(), "status matched");
            return Ok(true);
        }
    }
    Ok(false)
}

/// Records whose coded status is `status`, in their original order.
pub fn filter_by_status<'a, R, G>(
    records: &'a [R],
    status: &str,
    registry: &G,
) -> Result<Vec<&'a R>, LookupError>
where
    R: WeatherRecord,
    G: StatusCodeRegistry + ?Sized,
{
    let mut matching = Vec::new();
    for record in records {
        if status_is(record, status, registry)? {
            matching.push(record);
        }
    }
    debug!(total = records.len(), matched = matching.len(), status, "filtered by status");
    Ok(matching)
}

/// Plain substring match of any keyword against the lower-cased detailed status.
///
/// Keywords are used as given and not lower-cased.
pub fn status_matches_any<S, R>(keywords: &[S], record: &R) -> bool
where
    S: AsRef<str>,
    R: WeatherRecord + ?Sized,
{
    let detailed = record.detailed_status().to_lowercase();
    keywords.iter().any(|word| detailed.contains(word.as_ref()))
}

pub fn filter_by_matching_statuses<'a, S, R>(keywords: &[S], records: &'a [R]) -> Vec<&'a R>
where
    S: AsRef<str>,
    R: WeatherRecord,
{
    let matching: Vec<&R> = records
        .iter()
        .filter(|record| status_matches_any(keywords, *record))
        .collect();
    debug!(total = records.len(), matched = matching.len(), "filtered by keywords");
    matching
}

/// Earliest and latest reference times, or `None` for an empty set.
pub fn coverage<R: WeatherRecord>(records: &[R]) -> Option<(i64, i64)> {
    let mut times = records.iter().map(WeatherRecord::reference_time);
    let first = times.next()?;
    Some(times.fold((first, first), |(min, max), t| (min.min(t), max.max(t))))
}

/// True if `timestamp` lies in the closed interval spanned by `records`.
pub fn is_in_coverage<R: WeatherRecord>(timestamp: i64, records: &[R]) -> bool {
    match coverage(records) {
        Some((min, max)) => {
            trace!(timestamp, min, max, "coverage check");
            min <= timestamp && timestamp <= max
        }
        None => false,
    }
}

/// The record closest in time to `timestamp`.
///
/// Returns `Ok(None)` for an empty set and `Err(NotFoundError)` when
/// `timestamp` is outside the coverage range. On equal distances the
/// earliest record in slice order is kept.
pub fn find_closest_weather<R: WeatherRecord>(
    records: &[R],
    timestamp: i64,
) -> Result<Option<&R>, NotFoundError> {
    let Some(first) = records.first() else {
        return Ok(None);
    };

    if !is_in_coverage(timestamp, records) {
        debug!(timestamp, "timestamp outside coverage");
        return Err(NotFoundError { timestamp });
    }

    let mut closest = first;
    let mut distance = first.reference_time().abs_diff(timestamp);
    for record in records {
        let d = record.reference_time().abs_diff(timestamp);
        if d < distance {
            distance = d;
            closest = record;
        }
    }

    debug!(timestamp, reference_time = closest.reference_time(), distance, "closest record");
    Ok(Some(closest))
}
