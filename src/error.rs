use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid world dimensions {width}x{height}")]
    InvalidWorld { width: f64, height: f64 },
    #[error("Invalid physics setting {name}: {value}")]
    InvalidPhysics { name: &'static str, value: f64 },
    #[error("Invalid terrain settings: {0}")]
    InvalidTerrain(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Error while opening file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Json error: {0}")]
    Json(#[from] json::Error),
}
