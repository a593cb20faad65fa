pub mod config;
pub mod error;
pub mod lab;
pub mod telemetry;

pub use config::AppConfig;
pub use error::AppError;
