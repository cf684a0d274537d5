//! Sentence-respecting chunk splitting.
//!
//! Chunks are the unit of relevance scoring: bounded-size, contiguous spans
//! of the extracted text, in document order.

/// Split cleaned text into chunks of at most `chunk_size` characters.
///
/// Sentences are accumulated greedily and never split mid-sentence, so a
/// single sentence longer than `chunk_size` becomes its own oversized chunk —
/// that is the one documented exception to the size bound.
pub fn split_into_chunks(text: &str, chunk_size: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        if sentence.is_empty() {
            continue;
        }
        if current.is_empty() {
            current.push_str(sentence);
        } else if current.len() + 1 + sentence.len() <= chunk_size {
            current.push(' ');
            current.push_str(sentence);
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(sentence);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Split on sentence boundaries: a `.`, `!`, or `?` followed by whitespace.
/// The terminator stays on the preceding sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if matches!(bytes[i], b'.' | b'!' | b'?')
            && i + 1 < bytes.len()
            && bytes[i + 1].is_ascii_whitespace()
        {
            sentences.push(&text[start..=i]);
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            start = i;
        } else {
            i += 1;
        }
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(split_into_chunks("", 1000).is_empty());
        assert!(split_into_chunks("   ", 1000).is_empty());
    }

    #[test]
    fn single_short_sentence_is_one_chunk() {
        let chunks = split_into_chunks("We sell widgets.", 1000);
        assert_eq!(chunks, vec!["We sell widgets.".to_string()]);
    }

    #[test]
    fn three_400_char_sentences_make_two_chunks_at_1000() {
        let sentence = |c: char| {
            let mut s: String = std::iter::repeat_n(c, 399).collect();
            s.push('.');
            s
        };
        let text = format!("{} {} {}", sentence('a'), sentence('b'), sentence('c'));

        let chunks = split_into_chunks(&text, 1000);
        assert_eq!(chunks.len(), 2);
        // First chunk holds sentences 1-2 (801 chars with the joining space).
        assert_eq!(chunks[0].len(), 801);
        assert!(chunks[0].starts_with('a'));
        assert!(chunks[0].contains(". b"));
        // Second chunk is sentence 3 alone.
        assert_eq!(chunks[1].len(), 400);
        assert!(chunks[1].starts_with('c'));
    }

    #[test]
    fn chunks_respect_size_bound() {
        let text = "One sentence here. Another sentence follows! A third? And a fourth.";
        for chunk in split_into_chunks(text, 30) {
            assert!(chunk.len() <= 30, "chunk too long: {chunk:?}");
        }
    }

    #[test]
    fn oversized_sentence_kept_intact() {
        let long: String = std::iter::repeat_n('x', 50).collect();
        let text = format!("Short one. {long}. Tail.");
        let chunks = split_into_chunks(&text, 20);
        assert_eq!(chunks[0], "Short one.");
        assert_eq!(chunks[1].len(), 51);
        assert_eq!(chunks[2], "Tail.");
    }

    #[test]
    fn terminator_stays_on_preceding_sentence() {
        let chunks = split_into_chunks("Really? Yes! Good.", 7);
        assert_eq!(chunks, vec!["Really?", "Yes!", "Good."]);
    }

    #[test]
    fn concatenated_chunks_preserve_document_order() {
        let text = "Alpha one. Beta two. Gamma three. Delta four. Epsilon five.";
        let chunks = split_into_chunks(text, 25);
        let rejoined = chunks.join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn text_without_terminators_is_one_chunk() {
        let chunks = split_into_chunks("no terminators at all", 1000);
        assert_eq!(chunks, vec!["no terminators at all".to_string()]);
    }

    #[test]
    fn period_without_following_whitespace_does_not_split() {
        let chunks = split_into_chunks("Version 2.5 is out. Yes.", 1000);
        assert_eq!(chunks, vec!["Version 2.5 is out. Yes.".to_string()]);
    }
}
