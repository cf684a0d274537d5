//! Keyword-overlap chunk scoring.

/// Rank `chunks` against `question` and return up to `top_k` of them, best
/// first. Chunks that match nothing are dropped entirely.
///
/// Scoring: each question token (lowercased, longer than two characters) that
/// appears as a substring of the chunk scores one point. Whenever a token
/// matches *and* the chunk also contains the entire lowercased question, five
/// bonus points are added — the bonus is evaluated inside the token loop, so
/// a chunk holding the full question scores six points per matching token.
/// Ties keep the original document order (the sort is stable).
pub fn find_relevant_chunks<'a>(
    question: &str,
    chunks: &'a [String],
    top_k: usize,
) -> Vec<&'a str> {
    let question_lower = question.to_lowercase();
    let tokens: Vec<&str> = question_lower
        .split_whitespace()
        .filter(|token| token.len() > 2)
        .collect();

    if tokens.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(&'a str, u32)> = chunks
        .iter()
        .map(|chunk| {
            let chunk_lower = chunk.to_lowercase();
            let mut score = 0u32;
            for token in &tokens {
                if chunk_lower.contains(token) {
                    score += 1;
                    if chunk_lower.contains(&question_lower) {
                        score += 5;
                    }
                }
            }
            (chunk.as_str(), score)
        })
        .collect();

    scored.retain(|(_, score)| *score > 0);
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(top_k);
    scored.into_iter().map(|(chunk, _)| chunk).collect()
}
