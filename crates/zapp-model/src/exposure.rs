//! Exposure events — the central entity of an observation.
//!
//! The source schema kept `type`, `pattern`, `duration`, and `repeated` as
//! flat nullable fields and relied on reset-on-change logic to null out
//! whichever of them the current route/regimen combination made
//! inapplicable. Here the regimen is a tagged variant, so inapplicable
//! fields are unrepresentable and no clearing code exists. The wire format
//! is still the flat record (see `wire`).

use serde::{Deserialize, Serialize};

use crate::quantity::{Duration, Quantity, Stage, StageUnit};
use crate::substance::SubstanceId;
use crate::wire::ExposureEventWire;

/// How the chemical reached the fish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Water,
    Injected,
    Ingested,
    Gavage,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Water, Route::Injected, Route::Ingested, Route::Gavage];

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Water => "water",
            Route::Injected => "injected",
            Route::Ingested => "ingested",
            Route::Gavage => "gavage",
        }
    }
}

/// Medium handling for continuous water exposures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Static,
    StaticRenewal,
    FlowThrough,
}

impl Pattern {
    pub const ALL: [Pattern; 3] = [Pattern::Static, Pattern::StaticRenewal, Pattern::FlowThrough];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::Static => "static",
            Pattern::StaticRenewal => "static_renewal",
            Pattern::FlowThrough => "flow_through",
        }
    }
}

/// Repeated-dosing regimen: how many repeats, how long each, how far apart,
/// and the overall window. All fields start out null and are filled in by
/// the annotator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RepeatedExposure {
    pub count: Option<u32>,
    pub duration_per: Duration,
    pub interval_between: Duration,
    pub total_length: Duration,
}

impl RepeatedExposure {
    pub fn is_empty(&self) -> bool {
        self.count.is_none()
            && self.duration_per.is_empty()
            && self.interval_between.is_empty()
            && self.total_length.is_empty()
    }
}

/// The exposure regimen, keyed by what the annotator has chosen so far.
///
/// `Unspecified` is the wire `type: null`: "not chosen yet" for water
/// routes, "single occurrence" for the others. Continuous exposures carry
/// their duration and (for water) medium pattern; repeated exposures carry
/// the dosing record. Nothing else can be stored, which is the whole point.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Regimen {
    #[default]
    Unspecified,
    Continuous {
        duration: Duration,
        pattern: Option<Pattern>,
    },
    Repeated(RepeatedExposure),
}

impl Regimen {
    pub fn is_continuous(&self) -> bool {
        matches!(self, Regimen::Continuous { .. })
    }

    pub fn is_repeated(&self) -> bool {
        matches!(self, Regimen::Repeated(_))
    }
}

/// One chemical exposure: substance, concentration, route, regimen, and the
/// developmental window it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ExposureEventWire", from = "ExposureEventWire")]
pub struct ExposureEvent {
    pub substance: SubstanceId,
    pub concentration: Quantity,
    pub route: Option<Route>,
    pub regimen: Regimen,
    pub start_stage: Stage,
    pub end_stage: Stage,
    pub textual_description: Option<String>,
    pub additional_notes: Option<String>,
}

impl Default for ExposureEvent {
    /// The empty form row: ambient water route pre-selected, concentration
    /// in µM, stages in hpf, regimen not yet chosen.
    fn default() -> Self {
        Self {
            substance: SubstanceId::default(),
            concentration: Quantity::new(None, Some("uM")),
            route: Some(Route::Water),
            regimen: Regimen::Unspecified,
            start_stage: Stage::new(None, Some(StageUnit::Hpf)),
            end_stage: Stage::new(None, Some(StageUnit::Hpf)),
            textual_description: None,
            additional_notes: None,
        }
    }
}
