// Résumé coaching: one request in, scored feedback plus a Markdown report out.
// The model is reached only through llm_client::CompletionModel.

pub mod artifact;
pub mod handlers;
pub mod normalizer;
pub mod orchestrator;
pub mod prompts;
pub mod renderer;
