pub mod accept_upload;
pub mod build_prompt;
pub mod collect_intent;
pub mod run_extraction;

pub use accept_upload::AcceptUploadStep;
pub use build_prompt::BuildPromptStep;
pub use collect_intent::CollectIntentStep;
pub use run_extraction::RunExtractionStep;
