//! Zapp — Zebrafish toxicology observation submission tool.
//! Entry point for the demo binary: fills a form through the update
//! engine, reports validation state, and submits when credentials are
//! provided.

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zapp_common::{CappedClient, Config};
use zapp_form::FormEngine;
use zapp_model::{Regimen, Route, Severity, SourceType, ValidationOptions};
use zapp_ontology::PhenotypePicker;
use zapp_submit::{Credentials, SubmitClient};
use zapp_substances::SubstanceCatalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("zapp=debug,info")),
        )
        .init();
    dotenvy::dotenv().ok();

    info!("🐟 Zapp starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match Config::load() {
        Ok(c) => {
            info!(
                "Configuration loaded. Endpoint: {}, catalog: {}",
                c.submission.endpoint, c.substances.catalog_uri
            );
            c
        }
        Err(e) => {
            warn!("Could not load zapp.toml: {e}");
            warn!("Falling back to built-in defaults.");
            Config::default()
        }
    };
    let opts = ValidationOptions::from_schema_config(&config.schema);
    let client = CappedClient::new()?;

    // Fill a form the way a session would, edit by edit
    let mut engine = FormEngine::new(opts.clone());
    engine.apply(|obs| {
        obs.provenance.source.source_type = Some(SourceType::Pmid);
        obs.provenance.source.value = Some("26097889".to_string());
        obs.fish.strain_background = Some("AB".to_string());
    });

    // Substance autocomplete, degraded to free text when the catalog is
    // unreachable
    let catalog = SubstanceCatalog::new(client.clone(), config.substances.clone());
    let suggestions = catalog.suggest("formalde").await;
    engine.apply(|obs| {
        obs.exposures[0].substance = match suggestions.first() {
            Some(record) => record.to_substance_id(),
            None => zapp_model::SubstanceId::named("formaldehyde"),
        };
    });
    if catalog.is_degraded() {
        warn!("Substance catalog unavailable, keeping free-text substance name");
    }

    // Exposure: injected route with a repeated regimen
    engine.set_route(0, Route::Injected);
    engine.set_regimen_repeated(0);
    engine.apply(|obs| {
        if let Regimen::Repeated(ref mut rep) = obs.exposures[0].regimen {
            rep.count = Some(3);
            rep.interval_between.value = Some(24.0);
        }
        obs.exposures[0].concentration.value = Some(5.0);
        obs.exposures[0].start_stage.value = Some(6.0);
        obs.exposures[0].end_stage.value = Some(96.0);
    });

    // Phenotype, via the ontology picker when the graphs are served
    let picker = PhenotypePicker::new(client.clone(), config.ontology.clone());
    match picker.ensure_loaded().await {
        Some(index) => {
            let root = index.anatomy_root();
            info!(
                "✅ Ontology loaded: {} top-level structures under {}",
                index.children_of(&root.id).len(),
                root.display_label()
            );
        }
        None => warn!("Ontology unavailable, phenotype terms stay free text"),
    }
    engine.apply(|obs| {
        obs.phenotype.observation_stage.value = Some(96.0);
        obs.phenotype.items[0].term_label = Some("pericardial edema".to_string());
        obs.phenotype.items[0].prevalence_percent = Some(80.0);
        obs.phenotype.items[0].severity = Some(Severity::Moderate);
    });

    if engine.errors().is_valid() {
        info!("✅ Observation is valid.");
    } else {
        for (path, message) in engine.errors().iter() {
            warn!("  {path}: {message}");
        }
    }
    println!("{}", serde_json::to_string_pretty(engine.observation())?);

    // Submit only when credentials are provided
    let username = std::env::var("ZAPP_USERNAME").ok();
    let password = std::env::var("ZAPP_PASSWORD").ok();
    match (username, password) {
        (Some(username), Some(password)) => {
            let submit = SubmitClient::new(client, config.submission.clone(), opts);
            let credentials = Credentials::new(username, password);
            let outcome = submit.submit(engine.observation(), None, &credentials).await?;
            info!("Server responded {}: {}", outcome.status, outcome.body);
        }
        _ => info!("ZAPP_USERNAME / ZAPP_PASSWORD not set, skipping submission."),
    }

    Ok(())
}
