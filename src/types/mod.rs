//! Type definitions for the CKD screening service

pub mod observation;
pub mod prediction;

pub use observation::PatientObservation;
pub use prediction::{PredictionResult, ScreeningOutcome};
