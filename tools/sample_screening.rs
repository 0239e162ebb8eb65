//! Sample Screening Tool
//!
//! Generates randomized patient observations and runs them through the
//! inference engine against local artifacts. Smoke-tests a model export
//! without the web surface.

use anyhow::Result;
use ckd_screening::config::AppConfig;
use ckd_screening::model::{inference::InferenceEngine, manifest::FeatureManifest};
use ckd_screening::row_builder::RowBuilder;
use ckd_screening::types::observation::PatientObservation;
use ckd_screening::types::prediction::{PredictionResult, ScreeningOutcome};
use rand::Rng;
use tracing::{info, warn};

/// Observation generator for smoke testing
struct ObservationGenerator {
    rng: rand::rngs::ThreadRng,
}

impl ObservationGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Generate an observation in typical healthy ranges
    fn generate_typical(&mut self) -> PatientObservation {
        PatientObservation {
            bmi: self.rng.gen_range(18.5..27.0),
            smoking: 0,
            alcohol_consumption: self.rng.gen_range(0.0..3.0),
            physical_activity: self.rng.gen_range(3.0..10.0),
            diet_quality: self.rng.gen_range(5.0..10.0),
            family_history_kidney_disease: 0,
            antidiabetic_medications: 0,
            fatigue_levels: self.rng.gen_range(0.0..4.0),
        }
    }

    /// Generate an observation with elevated risk markers
    fn generate_high_risk(&mut self) -> PatientObservation {
        PatientObservation {
            bmi: self.rng.gen_range(32.0..45.0),
            smoking: 1,
            alcohol_consumption: self.rng.gen_range(8.0..15.0),
            physical_activity: self.rng.gen_range(0.0..2.0),
            diet_quality: self.rng.gen_range(0.0..3.0),
            family_history_kidney_disease: 1,
            antidiabetic_medications: 1,
            fatigue_levels: self.rng.gen_range(6.0..10.0),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_screening=info".parse()?)
                .add_directive("ckd_screening=info".parse()?),
        )
        .init();

    let count: usize = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(10);

    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Could not load config file, using defaults");
        AppConfig::default()
    });

    let manifest = FeatureManifest::load(&config.model.manifest_path)?;
    let builder = RowBuilder::new(manifest);
    let engine = InferenceEngine::new(&config)?;

    info!(count = count, "Running sample screenings");

    let mut generator = ObservationGenerator::new();
    let mut indicated = 0u64;
    let mut not_indicated = 0u64;

    for i in 0..count {
        // Alternate typical and high-risk profiles
        let observation = if i % 2 == 0 {
            generator.generate_typical()
        } else {
            generator.generate_high_risk()
        };

        let row = builder.build(&observation)?;
        let named_row = builder.build_named(&observation)?;
        let output = engine.predict(&row)?;
        let outcome = ScreeningOutcome::from_label(output.label)?;
        let result = PredictionResult::new(outcome, output.probabilities, named_row);

        match outcome {
            ScreeningOutcome::CkdIndicated => indicated += 1,
            ScreeningOutcome::NotIndicated => not_indicated += 1,
        }

        info!(
            sample = i + 1,
            outcome = ?outcome,
            confidence = %result.confidence_percent(),
            bmi = observation.bmi,
            smoking = observation.smoking,
            "Sample classified"
        );
    }

    info!(
        total = count,
        ckd_indicated = indicated,
        not_indicated = not_indicated,
        "Sample screening complete"
    );

    Ok(())
}
