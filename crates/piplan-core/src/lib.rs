pub mod config;
pub mod correlation;
pub mod error;
pub mod result;

pub use config::AppConfig;
pub use correlation::CorrelationId;
pub use error::PlanningError;
pub use result::PlanningResult;
