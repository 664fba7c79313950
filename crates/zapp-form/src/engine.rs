//! The update engine.
//!
//! One `FormEngine` exclusively owns the Observation being edited. Every
//! edit goes through `apply`: build a candidate, revalidate, store the
//! candidate unconditionally (invalid intermediate states are allowed and
//! flagged, never rejected), and notify the observer. Operations that the
//! source handled with cascading field resets are expressed here as regimen
//! transitions on the tagged variant, so there is nothing left to clear.

use tracing::{debug, warn};

use zapp_model::{
    ExposureEvent, IdType, Observation, PhenotypeItem, PhenotypeTerm, Regimen, RepeatedExposure,
    Route, SourceType, ValidationOptions, ValidationReport,
};

type Observer = Box<dyn Fn(&Observation, &ValidationReport)>;

pub struct FormEngine {
    current: Observation,
    errors: ValidationReport,
    opts: ValidationOptions,
    observer: Option<Observer>,
}

impl FormEngine {
    /// Start from the empty form.
    pub fn new(opts: ValidationOptions) -> Self {
        Self::with_observation(Observation::default(), opts)
    }

    /// Resume editing an existing observation (e.g. one deserialized from a
    /// stored submission).
    pub fn with_observation(observation: Observation, opts: ValidationOptions) -> Self {
        let errors = observation.validate(&opts);
        Self {
            current: observation,
            errors,
            opts,
            observer: None,
        }
    }

    pub fn observation(&self) -> &Observation {
        &self.current
    }

    /// Advisory error report from the last edit. Never blocks editing.
    pub fn errors(&self) -> &ValidationReport {
        &self.errors
    }

    pub fn validation_options(&self) -> &ValidationOptions {
        &self.opts
    }

    /// Register the collaborator notified after every applied edit.
    pub fn set_observer(&mut self, observer: impl Fn(&Observation, &ValidationReport) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Apply a transformation, revalidate, store the result, notify.
    pub fn apply(&mut self, transform: impl FnOnce(&mut Observation)) -> &Observation {
        let mut candidate = self.current.clone();
        transform(&mut candidate);

        let errors = candidate.validate(&self.opts);
        if !errors.is_valid() {
            debug!(error_count = errors.len(), "Edit left the observation invalid (held anyway)");
        }

        self.current = candidate;
        self.errors = errors;
        if let Some(observer) = &self.observer {
            observer(&self.current, &self.errors);
        }
        &self.current
    }

    // ── Exposure regimen transitions ─────────────────────────────────────────

    /// Change an exposure's route. The regimen always returns to
    /// `Unspecified`: whatever was captured for the previous route's
    /// regimen no longer applies.
    pub fn set_route(&mut self, exposure_idx: usize, route: Route) {
        if !self.exposure_in_bounds(exposure_idx) {
            return;
        }
        self.apply(|d| {
            let ev = &mut d.exposures[exposure_idx];
            ev.route = Some(route);
            ev.regimen = Regimen::Unspecified;
        });
    }

    /// Switch an exposure to a continuous regimen. Only water exposures can
    /// be continuous; for any other route this is ignored. Re-selecting
    /// continuous keeps the duration already entered but drops the pattern
    /// choice, matching the form's behaviour.
    pub fn set_regimen_continuous(&mut self, exposure_idx: usize) {
        if !self.exposure_in_bounds(exposure_idx) {
            return;
        }
        if self.current.exposures[exposure_idx].route != Some(Route::Water) {
            warn!(exposure_idx, "Continuous regimen is only available for water exposures; ignoring");
            return;
        }
        self.apply(|d| {
            let ev = &mut d.exposures[exposure_idx];
            let duration = match &ev.regimen {
                Regimen::Continuous { duration, .. } => *duration,
                _ => Default::default(),
            };
            ev.regimen = Regimen::Continuous { duration, pattern: None };
        });
    }

    /// Switch an exposure to a repeated regimen with a fresh dosing record.
    pub fn set_regimen_repeated(&mut self, exposure_idx: usize) {
        if !self.exposure_in_bounds(exposure_idx) {
            return;
        }
        self.apply(|d| {
            d.exposures[exposure_idx].regimen = Regimen::Repeated(RepeatedExposure::default());
        });
    }

    /// Back to no regimen: "not chosen yet" for water, "single occurrence"
    /// for the other routes.
    pub fn set_regimen_unspecified(&mut self, exposure_idx: usize) {
        if !self.exposure_in_bounds(exposure_idx) {
            return;
        }
        self.apply(|d| {
            d.exposures[exposure_idx].regimen = Regimen::Unspecified;
        });
    }

    // ── Other coupled-field operations ───────────────────────────────────────

    /// Toggle standard rearing; switching to standard clears the
    /// non-standard description.
    pub fn set_rearing_standard(&mut self, standard: bool) {
        self.apply(|d| {
            d.rearing.standard = standard;
            if standard {
                d.rearing.non_standard_notes = None;
            }
        });
    }

    /// Change the provenance source type; the stale value is cleared.
    pub fn set_source_type(&mut self, source_type: Option<SourceType>) {
        self.apply(|d| {
            d.provenance.source.source_type = source_type;
            d.provenance.source.value = None;
        });
    }

    /// Change a substance's identifier type; switching to `None` clears
    /// the identifier.
    pub fn set_substance_id_type(&mut self, exposure_idx: usize, id_type: IdType) {
        if !self.exposure_in_bounds(exposure_idx) {
            return;
        }
        self.apply(|d| {
            let substance = &mut d.exposures[exposure_idx].substance;
            substance.id_type = id_type;
            if id_type == IdType::None {
                substance.id = None;
            }
        });
    }

    /// Write (or clear) a phenotype item's controlled-vocabulary term.
    pub fn set_phenotype_term(&mut self, item_idx: usize, term: Option<PhenotypeTerm>) {
        if !self.phenotype_in_bounds(item_idx) {
            return;
        }
        self.apply(|d| {
            let item = &mut d.phenotype.items[item_idx];
            match term {
                Some(term) => {
                    item.term_id = Some(term.id);
                    item.term_label = term.label;
                }
                None => {
                    item.term_id = None;
                    item.term_label = None;
                }
            }
        });
    }

    // ── List operations ──────────────────────────────────────────────────────

    /// Append a fresh exposure row.
    pub fn add_exposure(&mut self) {
        self.apply(|d| d.exposures.push(ExposureEvent::default()));
    }

    /// Remove an exposure row. Removal that would leave the list empty is
    /// ignored; at least one exposure always exists.
    pub fn remove_exposure(&mut self, index: usize) {
        if !self.exposure_in_bounds(index) {
            return;
        }
        if self.current.exposures.len() == 1 {
            warn!("Refusing to remove the last exposure");
            return;
        }
        self.apply(|d| {
            d.exposures.remove(index);
        });
    }

    /// Append a fresh phenotype item.
    pub fn add_phenotype_item(&mut self) {
        self.apply(|d| d.phenotype.items.push(PhenotypeItem::default()));
    }

    /// Remove a phenotype item, with the same never-empty rule as exposures.
    pub fn remove_phenotype_item(&mut self, index: usize) {
        if !self.phenotype_in_bounds(index) {
            return;
        }
        if self.current.phenotype.items.len() == 1 {
            warn!("Refusing to remove the last phenotype item");
            return;
        }
        self.apply(|d| {
            d.phenotype.items.remove(index);
        });
    }

    fn exposure_in_bounds(&self, index: usize) -> bool {
        if index >= self.current.exposures.len() {
            warn!(index, len = self.current.exposures.len(), "Exposure index out of bounds; ignoring");
            return false;
        }
        true
    }

    fn phenotype_in_bounds(&self, index: usize) -> bool {
        if index >= self.current.phenotype.items.len() {
            warn!(index, len = self.current.phenotype.items.len(), "Phenotype index out of bounds; ignoring");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use zapp_model::{Duration, DurationUnit, Pattern};

    fn engine() -> FormEngine {
        FormEngine::new(ValidationOptions::default())
    }

    #[test]
    fn test_route_change_always_resets_regimen() {
        let mut engine = engine();
        engine.set_regimen_continuous(0);
        engine.apply(|d| {
            if let Regimen::Continuous { duration, pattern } = &mut d.exposures[0].regimen {
                *duration = Duration::new(Some(48.0), Some(DurationUnit::Hour));
                *pattern = Some(Pattern::Static);
            }
        });

        engine.set_route(0, Route::Injected);
        assert_eq!(engine.observation().exposures[0].regimen, Regimen::Unspecified);

        // And on the wire the flat fields come out null/empty.
        let v = serde_json::to_value(engine.observation()).unwrap();
        assert!(v["exposures"][0]["type"].is_null());
        assert!(v["exposures"][0]["pattern"].is_null());
        assert!(v["exposures"][0]["duration"]["value"].is_null());
        assert!(v["exposures"][0]["repeated"]["count"].is_null());
    }

    #[test]
    fn test_continuous_rejected_for_non_water_routes() {
        let mut engine = engine();
        engine.set_route(0, Route::Gavage);
        engine.set_regimen_continuous(0);
        assert_eq!(engine.observation().exposures[0].regimen, Regimen::Unspecified);
    }

    #[test]
    fn test_reselecting_continuous_keeps_duration_drops_pattern() {
        let mut engine = engine();
        engine.set_regimen_continuous(0);
        engine.apply(|d| {
            if let Regimen::Continuous { duration, pattern } = &mut d.exposures[0].regimen {
                *duration = Duration::new(Some(24.0), Some(DurationUnit::Hour));
                *pattern = Some(Pattern::FlowThrough);
            }
        });
        engine.set_regimen_continuous(0);
        match &engine.observation().exposures[0].regimen {
            Regimen::Continuous { duration, pattern } => {
                assert_eq!(duration.value, Some(24.0));
                assert_eq!(*pattern, None);
            }
            other => panic!("expected continuous, got {:?}", other),
        }
    }

    #[test]
    fn test_switching_to_repeated_starts_fresh() {
        let mut engine = engine();
        engine.set_regimen_repeated(0);
        engine.apply(|d| {
            if let Regimen::Repeated(rep) = &mut d.exposures[0].regimen {
                rep.count = Some(5);
            }
        });
        engine.set_regimen_repeated(0);
        match &engine.observation().exposures[0].regimen {
            Regimen::Repeated(rep) => assert!(rep.is_empty()),
            other => panic!("expected repeated, got {:?}", other),
        }
    }

    #[test]
    fn test_lists_never_empty() {
        let mut engine = engine();
        engine.remove_exposure(0);
        assert_eq!(engine.observation().exposures.len(), 1);

        engine.add_exposure();
        engine.add_exposure();
        engine.remove_exposure(1);
        engine.remove_exposure(1);
        engine.remove_exposure(0);
        assert_eq!(engine.observation().exposures.len(), 1);

        engine.remove_phenotype_item(0);
        assert_eq!(engine.observation().phenotype.items.len(), 1);
        engine.add_phenotype_item();
        engine.remove_phenotype_item(0);
        engine.remove_phenotype_item(0);
        assert_eq!(engine.observation().phenotype.items.len(), 1);
    }

    #[test]
    fn test_identity_transform_is_idempotent() {
        let mut engine = engine();
        engine.set_route(0, Route::Water);
        engine.set_regimen_continuous(0);
        let before = engine.observation().clone();
        engine.apply(|_| {});
        engine.apply(|_| {});
        assert_eq!(engine.observation(), &before);
        assert!(engine.errors().is_valid());
    }

    #[test]
    fn test_invalid_edit_is_held_and_flagged() {
        let mut engine = engine();
        engine.apply(|d| d.phenotype.items[0].prevalence_percent = Some(150.0));
        // Optimistic: the value is stored...
        assert_eq!(engine.observation().phenotype.items[0].prevalence_percent, Some(150.0));
        // ...and flagged.
        assert!(engine.errors().get("phenotype.items.0.prevalencePercent").is_some());

        engine.apply(|d| d.phenotype.items[0].prevalence_percent = Some(80.0));
        assert!(engine.errors().is_valid());
    }

    #[test]
    fn test_rearing_standard_clears_notes() {
        let mut engine = engine();
        engine.set_rearing_standard(false);
        engine.apply(|d| d.rearing.non_standard_notes = Some("28.5C, 14/10 light".to_string()));
        engine.set_rearing_standard(true);
        assert_eq!(engine.observation().rearing.non_standard_notes, None);
    }

    #[test]
    fn test_source_type_change_clears_value() {
        let mut engine = engine();
        engine.set_source_type(Some(SourceType::Pmid));
        engine.apply(|d| d.provenance.source.value = Some("12345678".to_string()));
        engine.set_source_type(Some(SourceType::Doi));
        assert_eq!(engine.observation().provenance.source.value, None);
    }

    #[test]
    fn test_id_type_none_clears_identifier() {
        let mut engine = engine();
        engine.set_substance_id_type(0, IdType::Cas);
        engine.apply(|d| d.exposures[0].substance.id = Some("50-00-0".to_string()));
        engine.set_substance_id_type(0, IdType::None);
        assert_eq!(engine.observation().exposures[0].substance.id, None);
    }

    #[test]
    fn test_observer_sees_every_applied_edit() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_by_observer = Rc::clone(&seen);
        let mut engine = engine();
        engine.set_observer(move |obs, report| {
            seen_by_observer.borrow_mut().push((obs.exposures.len(), report.is_valid()));
        });

        engine.add_exposure();
        engine.apply(|d| d.exposures[0].concentration.value = Some(-1.0));
        assert_eq!(seen.borrow().as_slice(), &[(2, true), (2, false)]);
    }
}
