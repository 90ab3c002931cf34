pub mod config;
pub mod manager;
pub mod types;

pub use config::{ClientConfig, FhirTestConfig, FhirVersion};
pub use manager::FhirTestManager;
pub use types::*;
