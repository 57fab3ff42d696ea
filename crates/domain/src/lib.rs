//! eightify domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `prompt`: Prompt and response-schema construction
//! - `response`: Parsing of structured LLM output
//! - `usecases`: Orchestration and rendering

pub mod model;
pub mod ports;
pub mod prompt;
pub mod response;
pub mod usecases;

pub use model::*;
pub use ports::*;
pub use prompt::{InferenceRequest, ResponseSchema};
