//! End-to-end edit session over the update engine, checked against the
//! boundary validator at every step.

use zapp_form::FormEngine;
use zapp_model::{
    validate_json, Duration, DurationUnit, Observation, Regimen, Route, ValidationOptions,
};

fn wire(engine: &FormEngine) -> serde_json::Value {
    serde_json::to_value(engine.observation()).unwrap()
}

#[test]
fn test_injected_repeated_session() {
    let opts = ValidationOptions::default();
    let mut engine = FormEngine::new(opts.clone());

    engine.set_route(0, Route::Injected);
    let v = wire(&engine);
    assert!(v["exposures"][0]["pattern"].is_null());
    assert!(v["exposures"][0]["duration"]["value"].is_null());
    assert!(v["exposures"][0]["duration"]["unit"].is_null());

    engine.set_regimen_repeated(0);
    engine.apply(|d| {
        if let Regimen::Repeated(rep) = &mut d.exposures[0].regimen {
            rep.count = Some(3);
            rep.interval_between = Duration::new(Some(24.0), Some(DurationUnit::Hour));
        }
    });

    let v = wire(&engine);
    assert_eq!(v["exposures"][0]["type"], "repeated");
    assert_eq!(v["exposures"][0]["repeated"]["count"], 3);
    assert_eq!(v["exposures"][0]["repeated"]["interval_between"]["value"], 24.0);
    // Continuous-only fields stay null through the whole session.
    assert!(v["exposures"][0]["pattern"].is_null());
    assert!(v["exposures"][0]["duration"]["value"].is_null());
    assert!(v["exposures"][0]["duration"]["unit"].is_null());

    // The serialized snapshot round-trips through the boundary validator...
    assert!(validate_json(&v, &opts).is_valid());
    // ...and back into an equal typed observation.
    let back: Observation = serde_json::from_value(v).unwrap();
    assert_eq!(&back, engine.observation());
}

#[test]
fn test_full_form_fill_is_valid() {
    let opts = ValidationOptions::default();
    let mut engine = FormEngine::new(opts.clone());

    engine.apply(|d| {
        d.provenance.annotator_orcid = Some("0000-0002-1825-0097".to_string());
        d.fish.strain_background = Some("AB".to_string());
        d.exposures[0].substance.name = Some("cadmium chloride".to_string());
        d.exposures[0].concentration.value = Some(10.0);
        d.phenotype.observation_stage.value = Some(96.0);
        d.phenotype.items[0].term_label = Some("pericardial edema".to_string());
        d.phenotype.items[0].prevalence_percent = Some(80.0);
    });
    engine.set_regimen_continuous(0);
    engine.apply(|d| {
        if let Regimen::Continuous { duration, .. } = &mut d.exposures[0].regimen {
            *duration = Duration::new(Some(48.0), Some(DurationUnit::Hour));
        }
    });

    assert!(engine.errors().is_valid());
    assert!(validate_json(&wire(&engine), &opts).is_valid());
}
