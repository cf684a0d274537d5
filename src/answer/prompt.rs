//! Grounding-prompt template and answer languages.

use serde::{Deserialize, Serialize};

/// The exact refusal sentence the model is instructed to emit when the
/// answer is not present in the grounding context.
pub const REFUSAL_SENTENCE: &str = "I could not find this information on the website.";

/// Languages the assistant can be instructed to answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Te,
}

impl Language {
    /// Parse a request-supplied code. Unknown codes fall back to English.
    pub fn from_code(code: &str) -> Self {
        match code {
            "hi" => Self::Hi,
            "te" => Self::Te,
            _ => Self::En,
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            Self::En => "Respond in English.",
            Self::Hi => "Respond in Hindi (हिन्दी में जवाब दें).",
            Self::Te => "Respond in Telugu (తెలుగులో సమాధానం ఇవ్వండి).",
        }
    }
}

/// Render the fixed grounding prompt: rules, website URL, context block,
/// question. The context is the only permitted source of factual claims.
pub fn build_grounding_prompt(
    question: &str,
    url: Option<&str>,
    language: Language,
    context: &str,
) -> String {
    format!(
        "You are a helpful AI assistant that answers questions based on website content.\n\
         \n\
         RULES:\n\
         1. Use information from the provided website content\n\
         2. If the answer is NOT found, say: \"{refusal}\"\n\
         3. Be concise and helpful\n\
         4. {instruction}\n\
         \n\
         WEBSITE: {website}\n\
         \n\
         CONTENT:\n\
         {context}\n\
         \n\
         Question: {question}",
        refusal = REFUSAL_SENTENCE,
        instruction = language.instruction(),
        website = url.unwrap_or("Unknown"),
    )
}
