//! Validation.
//!
//! Two layers:
//! - `validate_json` checks an untyped candidate (anything a client or a
//!   stored file hands us) against the full schema at the system boundary,
//!   producing a dot-joined field path → message map. This is the single
//!   centralized parse/validate step; nothing downstream trusts casts.
//! - `Observation::validate` re-checks a typed observation after every
//!   edit: only the constraints the type system cannot encode (ranges,
//!   non-empty lists, configured unit narrowing).
//!
//! Both are pure. Errors are advisory inside the update engine; the
//! submission client refuses to send an invalid snapshot.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::exposure::Regimen;
use crate::observation::Observation;
use crate::quantity::{Duration, DurationUnit};

/// Schema-generation knobs for validation.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Accepted duration units; earlier form generations allowed `{hour, min}` only.
    pub duration_units: Vec<DurationUnit>,
    /// When set, concentration units must be `uM` or `mg/L` instead of free text.
    pub restrict_concentration_units: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            duration_units: DurationUnit::ALL.to_vec(),
            restrict_concentration_units: false,
        }
    }
}

impl ValidationOptions {
    /// Build from the `[schema]` config section. Unknown unit names are
    /// skipped; an empty result falls back to the full unit set.
    pub fn from_schema_config(cfg: &zapp_common::config::SchemaConfig) -> Self {
        let mut units: Vec<DurationUnit> = cfg
            .duration_units
            .iter()
            .filter_map(|s| DurationUnit::parse(s))
            .collect();
        units.dedup();
        if units.is_empty() {
            tracing::warn!("No recognised duration units in config; falling back to full set");
            units = DurationUnit::ALL.to_vec();
        }
        Self {
            duration_units: units,
            restrict_concentration_units: cfg.restrict_concentration_units,
        }
    }

    fn duration_unit_names(&self) -> String {
        self.duration_units
            .iter()
            .map(|u| u.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn allows_duration_unit(&self, unit: DurationUnit) -> bool {
        self.duration_units.contains(&unit)
    }
}

/// Field-level validation outcome: dot-joined path → human-readable message.
/// Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(path.into(), message.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.errors.iter()
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }
}

// ── Boundary validation ──────────────────────────────────────────────────────

const ROUTE_NAMES: [&str; 4] = ["water", "injected", "ingested", "gavage"];
const REGIMEN_NAMES: [&str; 2] = ["continuous", "repeated"];
const PATTERN_NAMES: [&str; 3] = ["static", "static_renewal", "flow_through"];
const STAGE_UNIT_NAMES: [&str; 3] = ["hpf", "dpf", "month"];
const SEVERITY_NAMES: [&str; 3] = ["mild", "moderate", "severe"];
const ID_TYPE_NAMES: [&str; 4] = ["PubChem", "CAS", "ChEBI", "None"];
const SOURCE_TYPE_NAMES: [&str; 6] = [
    "PMID",
    "DOI",
    "Other publication",
    "Internal database",
    "Non-published experimental result",
    "Other",
];
const CONC_UNIT_NAMES: [&str; 2] = ["uM", "mg/L"];

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn as_object<'a>(report: &mut ValidationReport, v: &'a Value, path: &str) -> Option<&'a serde_json::Map<String, Value>> {
    match v.as_object() {
        Some(obj) => Some(obj),
        None => {
            report.insert(path, "must be an object");
            None
        }
    }
}

fn check_opt_string(report: &mut ValidationReport, obj: &serde_json::Map<String, Value>, path: &str, key: &str) {
    if let Some(v) = obj.get(key) {
        if !v.is_null() && !v.is_string() {
            report.insert(join(path, key), "must be a string");
        }
    }
}

/// Nullable non-negative number.
fn check_nonneg(report: &mut ValidationReport, v: &Value, path: &str) {
    if v.is_null() {
        return;
    }
    match v.as_f64() {
        Some(n) if n >= 0.0 => {}
        Some(_) => report.insert(path, "must be a non-negative number"),
        None => report.insert(path, "must be a number or null"),
    }
}

/// Nullable non-negative integer.
fn check_nonneg_int(report: &mut ValidationReport, v: &Value, path: &str) {
    if v.is_null() {
        return;
    }
    match v.as_f64() {
        Some(n) if n >= 0.0 && n.fract() == 0.0 => {}
        Some(_) => report.insert(path, "must be a non-negative integer"),
        None => report.insert(path, "must be an integer or null"),
    }
}

/// Nullable (or absent) enum literal.
fn check_enum(report: &mut ValidationReport, obj: &serde_json::Map<String, Value>, path: &str, key: &str, allowed: &[&str]) {
    let Some(v) = obj.get(key) else { return };
    if v.is_null() {
        return;
    }
    match v.as_str() {
        Some(s) if allowed.contains(&s) => {}
        _ => report.insert(join(path, key), format!("must be one of: {}", allowed.join(", "))),
    }
}

fn check_unit_quantity(
    report: &mut ValidationReport,
    v: &Value,
    path: &str,
    unit_names: &[&str],
) {
    let Some(obj) = as_object(report, v, path) else { return };
    if let Some(value) = obj.get("value") {
        check_nonneg(report, value, &join(path, "value"));
    }
    check_enum(report, obj, path, "unit", unit_names);
}

fn check_stage(report: &mut ValidationReport, v: &Value, path: &str) {
    check_unit_quantity(report, v, path, &STAGE_UNIT_NAMES);
}

fn check_duration(report: &mut ValidationReport, v: &Value, path: &str, opts: &ValidationOptions) {
    let mut names: Vec<&str> = opts.duration_units.iter().map(|u| u.as_str()).collect();
    // `min` stays a valid input spelling whenever minutes are accepted
    if opts.allows_duration_unit(DurationUnit::Minute) {
        names.push("min");
    }
    check_unit_quantity(report, v, path, &names);
}

fn check_concentration(report: &mut ValidationReport, v: &Value, path: &str, opts: &ValidationOptions) {
    let Some(obj) = as_object(report, v, path) else { return };
    if let Some(value) = obj.get("value") {
        check_nonneg(report, value, &join(path, "value"));
    }
    if opts.restrict_concentration_units {
        check_enum(report, obj, path, "unit", &CONC_UNIT_NAMES);
    } else {
        check_opt_string(report, obj, path, "unit");
    }
}

fn check_substance(report: &mut ValidationReport, v: &Value, path: &str) {
    let Some(obj) = as_object(report, v, path) else { return };
    check_opt_string(report, obj, path, "name");
    check_enum(report, obj, path, "idType", &ID_TYPE_NAMES);
    check_opt_string(report, obj, path, "id");
}

/// The repeated-dosing record, in either the canonical structured shape or
/// the legacy flat-hours one.
fn check_repeated(report: &mut ValidationReport, v: &Value, path: &str, opts: &ValidationOptions) {
    let Some(obj) = as_object(report, v, path) else { return };
    let legacy = obj.contains_key("duration_per_exposure_hours")
        || obj.contains_key("frequency_count")
        || obj.contains_key("interval_hours");
    if legacy {
        if let Some(v) = obj.get("duration_per_exposure_hours") {
            check_nonneg(report, v, &join(path, "duration_per_exposure_hours"));
        }
        if let Some(v) = obj.get("frequency_count") {
            check_nonneg_int(report, v, &join(path, "frequency_count"));
        }
        if let Some(v) = obj.get("interval_hours") {
            check_nonneg(report, v, &join(path, "interval_hours"));
        }
        return;
    }
    if let Some(v) = obj.get("count") {
        check_nonneg_int(report, v, &join(path, "count"));
    }
    for key in ["duration_per", "interval_between", "total_length"] {
        if let Some(v) = obj.get(key) {
            check_duration(report, v, &join(path, key), opts);
        }
    }
}

fn check_exposure(report: &mut ValidationReport, v: &Value, path: &str, opts: &ValidationOptions) {
    let Some(obj) = as_object(report, v, path) else { return };

    match obj.get("substance") {
        Some(s) => check_substance(report, s, &join(path, "substance")),
        None => report.insert(join(path, "substance"), "required field missing"),
    }
    match obj.get("concentration") {
        Some(c) => check_concentration(report, c, &join(path, "concentration"), opts),
        None => report.insert(join(path, "concentration"), "required field missing"),
    }
    check_enum(report, obj, path, "route", &ROUTE_NAMES);
    check_enum(report, obj, path, "type", &REGIMEN_NAMES);
    check_enum(report, obj, path, "pattern", &PATTERN_NAMES);
    if let Some(d) = obj.get("duration") {
        check_duration(report, d, &join(path, "duration"), opts);
    }
    if let Some(r) = obj.get("repeated") {
        check_repeated(report, r, &join(path, "repeated"), opts);
    }
    for key in ["start_stage", "end_stage"] {
        match obj.get(key) {
            Some(s) => check_stage(report, s, &join(path, key)),
            None => report.insert(join(path, key), "required field missing"),
        }
    }
    check_opt_string(report, obj, path, "textual_description");
    check_opt_string(report, obj, path, "additional_notes");
}

fn check_phenotype_item(report: &mut ValidationReport, v: &Value, path: &str) {
    let Some(obj) = as_object(report, v, path) else { return };
    check_opt_string(report, obj, path, "termId");
    check_opt_string(report, obj, path, "termLabel");
    if let Some(p) = obj.get("prevalencePercent") {
        if !p.is_null() {
            match p.as_f64() {
                Some(n) if (0.0..=100.0).contains(&n) => {}
                _ => report.insert(join(path, "prevalencePercent"), "must be between 0 and 100"),
            }
        }
    }
    check_enum(report, obj, path, "severity", &SEVERITY_NAMES);
}

/// Validate an untyped observation candidate against the full schema.
/// Pure; returns an empty report when the candidate is valid.
pub fn validate_json(value: &Value, opts: &ValidationOptions) -> ValidationReport {
    let mut report = ValidationReport::default();
    let Some(root) = as_object(&mut report, value, "") else {
        return report;
    };

    // provenance
    match root.get("provenance") {
        Some(p) => {
            if let Some(obj) = as_object(&mut report, p, "provenance") {
                check_opt_string(&mut report, obj, "provenance", "annotator_orcid");
                check_opt_string(&mut report, obj, "provenance", "additional_notes");
                if let Some(src) = obj.get("source") {
                    if let Some(src_obj) = as_object(&mut report, src, "provenance.source") {
                        check_enum(&mut report, src_obj, "provenance.source", "type", &SOURCE_TYPE_NAMES);
                        check_opt_string(&mut report, src_obj, "provenance.source", "value");
                    }
                }
            }
        }
        None => report.insert("provenance", "required field missing"),
    }

    // image
    match root.get("image") {
        Some(img) => {
            if let Some(obj) = as_object(&mut report, img, "image") {
                if let Some(file) = obj.get("file") {
                    if !file.is_null() {
                        if let Some(f) = as_object(&mut report, file, "image.file") {
                            check_opt_string(&mut report, f, "image.file", "name");
                            check_opt_string(&mut report, f, "image.file", "type");
                            if let Some(size) = f.get("size") {
                                check_nonneg(&mut report, size, "image.file.size");
                            }
                        }
                    }
                }
                check_opt_string(&mut report, obj, "image", "additional_notes");
            }
        }
        None => report.insert("image", "required field missing"),
    }

    // fish
    match root.get("fish") {
        Some(fish) => {
            if let Some(obj) = as_object(&mut report, fish, "fish") {
                check_opt_string(&mut report, obj, "fish", "strain_background");
                check_opt_string(&mut report, obj, "fish", "description");
                check_opt_string(&mut report, obj, "fish", "additional_notes");
            }
        }
        None => report.insert("fish", "required field missing"),
    }

    // rearing
    match root.get("rearing") {
        Some(r) => {
            if let Some(obj) = as_object(&mut report, r, "rearing") {
                match obj.get("standard") {
                    Some(s) if s.is_boolean() => {}
                    Some(_) => report.insert("rearing.standard", "must be a boolean"),
                    None => report.insert("rearing.standard", "required field missing"),
                }
                check_opt_string(&mut report, obj, "rearing", "non_standard_notes");
                check_opt_string(&mut report, obj, "rearing", "additional_notes");
            }
        }
        None => report.insert("rearing", "required field missing"),
    }

    // exposures
    match root.get("exposures") {
        Some(Value::Array(items)) => {
            if items.is_empty() {
                report.insert("exposures", "must contain at least one entry");
            }
            for (i, item) in items.iter().enumerate() {
                check_exposure(&mut report, item, &format!("exposures.{}", i), opts);
            }
        }
        Some(_) => report.insert("exposures", "must be an array"),
        None => report.insert("exposures", "required field missing"),
    }

    // phenotype
    match root.get("phenotype") {
        Some(p) => {
            if let Some(obj) = as_object(&mut report, p, "phenotype") {
                match obj.get("observation_stage") {
                    Some(s) => check_stage(&mut report, s, "phenotype.observation_stage"),
                    None => report.insert("phenotype.observation_stage", "required field missing"),
                }
                match obj.get("items") {
                    Some(Value::Array(items)) => {
                        if items.is_empty() {
                            report.insert("phenotype.items", "must contain at least one entry");
                        }
                        for (i, item) in items.iter().enumerate() {
                            check_phenotype_item(&mut report, item, &format!("phenotype.items.{}", i));
                        }
                    }
                    Some(_) => report.insert("phenotype.items", "must be an array"),
                    None => report.insert("phenotype.items", "required field missing"),
                }
                check_opt_string(&mut report, obj, "phenotype", "additional_notes");
            }
        }
        None => report.insert("phenotype", "required field missing"),
    }

    report
}

// ── Typed validation ─────────────────────────────────────────────────────────

fn check_typed_duration(report: &mut ValidationReport, d: &Duration, path: &str, opts: &ValidationOptions) {
    if let Some(v) = d.value {
        if v < 0.0 {
            report.insert(format!("{}.value", path), "must be a non-negative number");
        }
    }
    if let Some(unit) = d.unit {
        if !opts.allows_duration_unit(unit) {
            report.insert(
                format!("{}.unit", path),
                format!("must be one of: {}", opts.duration_unit_names()),
            );
        }
    }
}

impl Observation {
    /// Range and cardinality checks over an already-typed observation; the
    /// enum and shape constraints are carried by the types themselves.
    pub fn validate(&self, opts: &ValidationOptions) -> ValidationReport {
        let mut report = ValidationReport::default();

        if self.exposures.is_empty() {
            report.insert("exposures", "must contain at least one entry");
        }
        for (i, ev) in self.exposures.iter().enumerate() {
            let path = format!("exposures.{}", i);
            if let Some(v) = ev.concentration.value {
                if v < 0.0 {
                    report.insert(format!("{}.concentration.value", path), "must be a non-negative number");
                }
            }
            if opts.restrict_concentration_units {
                if let Some(unit) = ev.concentration.unit.as_deref() {
                    if !CONC_UNIT_NAMES.contains(&unit) {
                        report.insert(
                            format!("{}.concentration.unit", path),
                            format!("must be one of: {}", CONC_UNIT_NAMES.join(", ")),
                        );
                    }
                }
            }
            for (key, stage) in [("start_stage", &ev.start_stage), ("end_stage", &ev.end_stage)] {
                if let Some(v) = stage.value {
                    if v < 0.0 {
                        report.insert(format!("{}.{}.value", path, key), "must be a non-negative number");
                    }
                }
            }
            match &ev.regimen {
                Regimen::Unspecified => {}
                Regimen::Continuous { duration, .. } => {
                    check_typed_duration(&mut report, duration, &format!("{}.duration", path), opts);
                }
                Regimen::Repeated(rep) => {
                    check_typed_duration(&mut report, &rep.duration_per, &format!("{}.repeated.duration_per", path), opts);
                    check_typed_duration(&mut report, &rep.interval_between, &format!("{}.repeated.interval_between", path), opts);
                    check_typed_duration(&mut report, &rep.total_length, &format!("{}.repeated.total_length", path), opts);
                }
            }
        }

        if let Some(v) = self.phenotype.observation_stage.value {
            if v < 0.0 {
                report.insert("phenotype.observation_stage.value", "must be a non-negative number");
            }
        }
        if self.phenotype.items.is_empty() {
            report.insert("phenotype.items", "must contain at least one entry");
        }
        for (i, item) in self.phenotype.items.iter().enumerate() {
            if let Some(p) = item.prevalence_percent {
                if !(0.0..=100.0).contains(&p) {
                    report.insert(
                        format!("phenotype.items.{}.prevalencePercent", i),
                        "must be between 0 and 100",
                    );
                }
            }
        }

        report
    }
}
