//! Flat wire format for exposure events, plus legacy-shape migration.
//!
//! On the wire an exposure event is the historical flat record: `type`,
//! `pattern`, `duration`, and `repeated` all present, with the inapplicable
//! ones null. The tagged `Regimen` is folded into that shape on serialize
//! and reassembled on deserialize. Two legacy input shapes are migrated:
//! the flat-hours repeated record (`duration_per_exposure_hours`,
//! `frequency_count`, `interval_hours`) and the `min` duration-unit alias
//! (handled in `quantity`).

use serde::{Deserialize, Serialize};

use crate::exposure::{ExposureEvent, Pattern, Regimen, RepeatedExposure, Route};
use crate::quantity::{Duration, DurationUnit, Quantity, Stage};
use crate::substance::SubstanceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum RegimenKind {
    Continuous,
    Repeated,
}

/// The repeated-dosing record as it appears on the wire: either the
/// canonical structured shape or the legacy flat-hours one, told apart by
/// which keys carry values. Serialization always emits the structured
/// shape; partially filled structured records keep whatever they carry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "RepeatedWireRaw")]
pub(crate) struct RepeatedWire(pub(crate) RepeatedExposure);

/// Superset of both repeated-dosing shapes, every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RepeatedWireRaw {
    count: Option<u32>,
    duration_per: Option<Duration>,
    interval_between: Option<Duration>,
    total_length: Option<Duration>,
    duration_per_exposure_hours: Option<f64>,
    frequency_count: Option<u32>,
    interval_hours: Option<f64>,
}

impl From<RepeatedWireRaw> for RepeatedWire {
    fn from(raw: RepeatedWireRaw) -> Self {
        let legacy = raw.duration_per_exposure_hours.is_some()
            || raw.frequency_count.is_some()
            || raw.interval_hours.is_some();
        let rep = if legacy {
            RepeatedExposure {
                count: raw.frequency_count,
                duration_per: Duration::new(
                    raw.duration_per_exposure_hours,
                    raw.duration_per_exposure_hours.map(|_| DurationUnit::Hour),
                ),
                interval_between: Duration::new(
                    raw.interval_hours,
                    raw.interval_hours.map(|_| DurationUnit::Hour),
                ),
                total_length: Duration::default(),
            }
        } else {
            RepeatedExposure {
                count: raw.count,
                duration_per: raw.duration_per.unwrap_or_default(),
                interval_between: raw.interval_between.unwrap_or_default(),
                total_length: raw.total_length.unwrap_or_default(),
            }
        };
        RepeatedWire(rep)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ExposureEventWire {
    pub substance: SubstanceId,
    pub concentration: Quantity,
    #[serde(default)]
    pub route: Option<Route>,
    #[serde(rename = "type", default)]
    pub kind: Option<RegimenKind>,
    #[serde(default)]
    pub pattern: Option<Pattern>,
    #[serde(default)]
    pub duration: Duration,
    #[serde(default)]
    pub repeated: RepeatedWire,
    pub start_stage: Stage,
    pub end_stage: Stage,
    #[serde(default)]
    pub textual_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

impl From<ExposureEventWire> for ExposureEvent {
    fn from(w: ExposureEventWire) -> Self {
        let regimen = match w.kind {
            None => Regimen::Unspecified,
            Some(RegimenKind::Continuous) => Regimen::Continuous {
                duration: w.duration,
                pattern: w.pattern,
            },
            Some(RegimenKind::Repeated) => Regimen::Repeated(w.repeated.0),
        };
        ExposureEvent {
            substance: w.substance,
            concentration: w.concentration,
            route: w.route,
            regimen,
            start_stage: w.start_stage,
            end_stage: w.end_stage,
            textual_description: w.textual_description,
            additional_notes: w.additional_notes,
        }
    }
}

impl From<ExposureEvent> for ExposureEventWire {
    fn from(ev: ExposureEvent) -> Self {
        let (kind, pattern, duration, repeated) = match ev.regimen {
            Regimen::Unspecified => (None, None, Duration::default(), RepeatedExposure::default()),
            Regimen::Continuous { duration, pattern } => {
                (Some(RegimenKind::Continuous), pattern, duration, RepeatedExposure::default())
            }
            Regimen::Repeated(rep) => {
                (Some(RegimenKind::Repeated), None, Duration::default(), rep)
            }
        };
        ExposureEventWire {
            substance: ev.substance,
            concentration: ev.concentration,
            route: ev.route,
            kind,
            pattern,
            duration,
            repeated: RepeatedWire(repeated),
            start_stage: ev.start_stage,
            end_stage: ev.end_stage,
            textual_description: ev.textual_description,
            additional_notes: ev.additional_notes,
        }
    }
}
