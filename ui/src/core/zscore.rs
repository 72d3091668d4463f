//! Standard scores against the baseline population and the radar encoding.
//!
//! Scores always use the population's *Baseline* statistics, whichever
//! session the raw value came from. Lookup prefers a record for the same task
//! at Baseline and falls back to any record with the same metric name; the
//! fallback is reported as approximate so the UI can say so.

use api::CalibrationRecord;

use super::filter::same_task;
use super::metrics::normalize_metric_name;

pub const BASELINE_LABEL: &str = "Baseline";

/// |z| beyond this is clipped on the radar and drawn as an outlier.
pub const Z_CAP: f64 = 3.0;
/// Radar radius of z = 0, i.e. the population-average ring.
pub const POPULATION_RADIUS: f64 = 2.5;
const RADIUS_PER_Z: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline<'a> {
    pub record: &'a CalibrationRecord,
    pub approximate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScore {
    pub value: f64,
    /// Scored against a context-agnostic record instead of the task's Baseline.
    pub approximate: bool,
}

impl ZScore {
    /// Zero standard deviations produce infinities/NaN; those are errors to
    /// show, not points to plot.
    pub fn is_finite(&self) -> bool {
        self.value.is_finite()
    }
}

fn same_metric(record: &CalibrationRecord, metric: &str) -> bool {
    normalize_metric_name(&record.metric_name) == normalize_metric_name(metric)
}

/// Find the calibration record a metric is scored against.
pub fn resolve_baseline<'a>(
    metric: &str,
    records: Option<&'a [CalibrationRecord]>,
    task: Option<&str>,
) -> Option<Baseline<'a>> {
    let records = records?;

    let exact = records.iter().find(|record| {
        same_metric(record, metric)
            && task.map_or(true, |task| {
                record
                    .task_condition
                    .as_deref()
                    .is_some_and(|condition| same_task(condition, task))
            })
            && record.timepoint.as_deref().map(str::trim) == Some(BASELINE_LABEL)
    });
    if let Some(record) = exact {
        return Some(Baseline {
            record,
            approximate: false,
        });
    }

    records
        .iter()
        .find(|record| same_metric(record, metric))
        .map(|record| Baseline {
            record,
            approximate: true,
        })
}

/// `(raw - mean) / stdev` against the resolved baseline, full precision.
pub fn score(
    metric: &str,
    raw: f64,
    records: Option<&[CalibrationRecord]>,
    task: Option<&str>,
) -> Option<ZScore> {
    let baseline = resolve_baseline(metric, records, task)?;
    Some(ZScore {
        value: (raw - baseline.record.mean) / baseline.record.stdev,
        approximate: baseline.approximate,
    })
}

/// Where a z-score lands on the radar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarEncoding {
    pub radius: f64,
    pub outlier: bool,
}

impl RadarEncoding {
    pub const NEUTRAL: Self = Self {
        radius: POPULATION_RADIUS,
        outlier: false,
    };
}

/// Clip z to ±3 and map it onto radius 1..=4 (z = 0 at 2.5). A missing or
/// non-finite score sits on the population ring.
pub fn encode(z: Option<f64>) -> RadarEncoding {
    match z {
        Some(z) if z.is_finite() => RadarEncoding {
            radius: RADIUS_PER_Z * z.clamp(-Z_CAP, Z_CAP) + POPULATION_RADIUS,
            outlier: z.abs() > Z_CAP,
        },
        _ => RadarEncoding::NEUTRAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::round2;

    fn average_speed() -> CalibrationRecord {
        CalibrationRecord::new("Average Speed", 0.6, 0.3)
            .with_condition("ST")
            .with_timepoint(BASELINE_LABEL)
    }

    #[test]
    fn scores_against_task_baseline() {
        let records = vec![average_speed()];
        let z = score("Average Speed", 0.9, Some(records.as_slice()), Some("ST")).unwrap();
        assert_eq!(round2(z.value), 1.00);
        assert!(!z.approximate);
    }

    #[test]
    fn unset_task_still_resolves() {
        let records = vec![average_speed()];
        let z = score("Average Speed", 0.7, Some(records.as_slice()), None).unwrap();
        assert_eq!(round2(z.value), 0.33);
    }

    #[test]
    fn identifier_form_matches_display_name() {
        let records = vec![average_speed()];
        assert!(score("Average_Speed", 0.7, Some(records.as_slice()), Some("ST")).is_some());
    }

    #[test]
    fn other_task_falls_back_to_name_match() {
        let records = vec![average_speed()];
        let z = score("Average Speed", 0.9, Some(records.as_slice()), Some("DT")).unwrap();
        assert!(z.approximate);
        assert_eq!(round2(z.value), 1.00);
    }

    #[test]
    fn exact_match_beats_earlier_fallback_candidates() {
        let records = vec![
            CalibrationRecord::new("Average Speed", 1.0, 0.5)
                .with_condition("ST")
                .with_timepoint("PI-1"),
            average_speed(),
        ];
        let baseline = resolve_baseline("Average Speed", Some(records.as_slice()), Some("ST")).unwrap();
        assert_eq!(baseline.record.mean, 0.6);
        assert!(!baseline.approximate);
    }

    #[test]
    fn no_records_or_no_name_match_gives_none() {
        let records = vec![average_speed()];
        assert_eq!(score("Average Speed", 0.9, None, Some("ST")), None);
        assert_eq!(score("Cadence", 100.0, Some(records.as_slice()), None), None);
        assert_eq!(score("Cadence", 100.0, Some(&records[..0]), None), None);
    }

    #[test]
    fn zero_stdev_is_not_guarded() {
        let records = vec![CalibrationRecord::new("Cadence", 100.0, 0.0)];
        let z = score("Cadence", 110.0, Some(records.as_slice()), None).unwrap();
        assert!(!z.is_finite());
    }

    #[test]
    fn radar_radius_is_linear_inside_the_cap() {
        for z in [-3.0, -1.5, 0.0, 0.4, 2.0, 3.0] {
            let encoded = encode(Some(z));
            assert_eq!(encoded.radius, 0.5 * z + 2.5);
            assert!(!encoded.outlier);
        }
    }

    #[test]
    fn radar_clamps_and_flags_outliers() {
        assert_eq!(
            encode(Some(4.2)),
            RadarEncoding {
                radius: 4.0,
                outlier: true
            }
        );
        assert_eq!(
            encode(Some(-7.0)),
            RadarEncoding {
                radius: 1.0,
                outlier: true
            }
        );
    }

    #[test]
    fn unresolved_scores_sit_on_the_population_ring() {
        assert_eq!(encode(None), RadarEncoding::NEUTRAL);
        assert_eq!(encode(Some(f64::NAN)).radius, POPULATION_RADIUS);
    }
}
