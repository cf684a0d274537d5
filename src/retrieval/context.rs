//! Grounding-context assembly.

/// Separator between chunks inside the grounding context.
pub const CHUNK_SEPARATOR: &str = "\n\n---\n\n";

/// Build the grounding context for one question.
///
/// Relevant chunks are joined with [`CHUNK_SEPARATOR`] and hard-truncated to
/// `limit` characters; when scoring found nothing, the full extracted text is
/// truncated instead. There is no error path — absence of matches never
/// blocks answer generation.
pub fn assemble_context(relevant: &[&str], full_content: &str, limit: usize) -> String {
    if relevant.is_empty() {
        truncate_chars(full_content, limit).to_string()
    } else {
        let joined = relevant.join(CHUNK_SEPARATOR);
        truncate_chars(&joined, limit).to_string()
    }
}

/// Hard cut after `limit` characters. Not word-boundary aware, but always
/// char-boundary safe.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
