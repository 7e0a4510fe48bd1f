pub mod config;
pub mod error;
pub mod extraction;
pub mod genai;
pub mod intent;
pub mod models;
pub mod present;
pub mod prompt;
pub mod service;
pub mod session;
pub mod staging;
pub mod steps;
pub mod testing;
pub mod upload;
pub mod view;
pub mod workflow;

pub use config::Config;
pub use error::{AppError, ExtractionError};
pub use genai::{GeminiClient, GenerativeBackend};
pub use models::*;
pub use service::{AppState, build_router, create_app};
pub use workflow::{CycleRunner, Interaction, build_page_pipeline};
