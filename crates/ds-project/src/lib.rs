//! ds-project: dwelling document format, validation and model building.

pub mod build;
pub mod schema;
pub mod validate;

pub use build::{InternalGains, Model, VentilationModel, ZoneModel, build_model};
pub use schema::*;
pub use validate::{ValidationError, validate_dwelling};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] ds_core::CoreError),

    #[error(transparent)]
    Controls(#[from] ds_controls::ControlError),

    #[error(transparent)]
    Climate(#[from] ds_climate::ClimateError),

    #[error(transparent)]
    Fabric(#[from] ds_fabric::FabricError),

    #[error(transparent)]
    Airflow(#[from] ds_airflow::AirflowError),

    #[error(transparent)]
    Zone(#[from] ds_zone::ZoneError),
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<Dwelling> {
    let content = std::fs::read_to_string(path)?;
    let dwelling: Dwelling = serde_yaml::from_str(&content)?;
    validate_dwelling(&dwelling)?;
    Ok(dwelling)
}

pub fn save_yaml(path: &std::path::Path, dwelling: &Dwelling) -> ProjectResult<()> {
    validate_dwelling(dwelling)?;
    let content = serde_yaml::to_string(dwelling)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<Dwelling> {
    let content = std::fs::read_to_string(path)?;
    let dwelling: Dwelling = serde_json::from_str(&content)?;
    validate_dwelling(&dwelling)?;
    Ok(dwelling)
}

pub fn save_json(path: &std::path::Path, dwelling: &Dwelling) -> ProjectResult<()> {
    validate_dwelling(dwelling)?;
    let content = serde_json::to_string_pretty(dwelling)?;
    std::fs::write(path, content)?;
    Ok(())
}
