pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod server;

pub use config::AppConfig;
pub use error::ServiceError;
pub use model::{GenerationRequest, GenerationResponse};
pub use provider::{ImageProvider, ProviderKind, build_provider};
pub use server::build_router;
