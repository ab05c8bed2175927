//! Greedy paragraph accumulation under the token budget.

use super::types::Chunk;

/// Paragraph separator the chunker splits and rejoins on.
pub(crate) const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Cheap token estimate: ceil(chars / 4).
///
/// Not a real tokenizer — callers may rely only on monotonicity (more
/// characters never estimates fewer tokens).
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

fn estimate_from_chars(chars: usize) -> usize {
    chars.div_ceil(4)
}

/// Split `text` into paragraph-aligned chunks, each at or under
/// `max_tokens_per_chunk` estimated tokens.
///
/// Paragraphs are accumulated greedily; the current chunk is closed when
/// appending the next paragraph would push the estimate over the budget
/// and the chunk is non-empty. A single paragraph over the budget still
/// becomes its own chunk — never dropped, never split mid-paragraph. Pure
/// and deterministic; paragraphs keep their original order, blank ones
/// included, so rejoining the chunks on the separator reproduces the
/// input byte for byte. Entirely blank input yields no chunks.
pub fn split_into_chunks(text: &str, max_tokens_per_chunk: usize) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut contents: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut started = false;
    let mut current_chars = 0usize;

    for paragraph in text.split(PARAGRAPH_SEPARATOR) {
        let paragraph_chars = paragraph.chars().count();

        if !started {
            current.push_str(paragraph);
            current_chars = paragraph_chars;
            started = true;
            continue;
        }

        // Estimate of the chunk as it would look with this paragraph
        // appended (separator included).
        let appended_chars = current_chars + PARAGRAPH_SEPARATOR.len() + paragraph_chars;
        if estimate_from_chars(appended_chars) > max_tokens_per_chunk {
            contents.push(std::mem::take(&mut current));
            current.push_str(paragraph);
            current_chars = paragraph_chars;
        } else {
            current.push_str(PARAGRAPH_SEPARATOR);
            current.push_str(paragraph);
            current_chars = appended_chars;
        }
    }

    contents.push(current);

    let total = contents.len();
    contents
        .into_iter()
        .enumerate()
        .map(|(index, content)| Chunk {
            index,
            total,
            content,
        })
        .collect()
}
