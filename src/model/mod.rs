mod types;

pub use types::{Diagnostics, GenerationRequest, GenerationResponse};
