//! Keyword-overlap retrieval: score stored chunks against a question and
//! assemble a bounded grounding context from the winners.

pub mod context;
pub mod scorer;

pub use context::assemble_context;
pub use scorer::find_relevant_chunks;

/// Default number of top-scoring chunks fed to the model.
pub const DEFAULT_TOP_K: usize = 3;

/// Default hard cap on the grounding context, in characters.
pub const DEFAULT_CONTEXT_LIMIT: usize = 2000;
