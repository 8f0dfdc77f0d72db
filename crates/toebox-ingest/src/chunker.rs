//! Fixed-size chunking with overlap.
//!
//! Chunk size and overlap are fixed constants: they exist to keep
//! embedding calls within per-call size limits while preserving
//! cross-chunk context, and are not user-tunable at this layer.

/// Target chunk size in characters.
pub const CHUNK_SIZE: usize = 1000;

/// Overlap between consecutive chunks in characters.
pub const CHUNK_OVERLAP: usize = 200;

/// Split text into overlapping windows, preferring paragraph and sentence
/// boundaries near the window end.
pub fn split_text(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![];
    }

    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let step = CHUNK_SIZE.saturating_sub(CHUNK_OVERLAP).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < total {
        let target_end = (start + CHUNK_SIZE).min(total);
        let end = find_break_point(&chars, start, target_end, total);

        let chunk: String = chars[start..end].iter().collect();
        if !chunk.trim().is_empty() {
            chunks.push(chunk);
        }

        if end >= total {
            break;
        }
        start += step;
    }

    chunks
}

/// Find a good break point near the target end position.
fn find_break_point(chars: &[char], start: usize, target_end: usize, total: usize) -> usize {
    if target_end >= total {
        return total;
    }

    let search_start = target_end.saturating_sub((target_end - start) / 5);
    let search_end = (target_end + (target_end - start) / 10).min(total);

    // Prefer double newline (paragraph break)
    for i in (search_start..search_end).rev() {
        if i + 1 < total && chars[i] == '\n' && chars[i + 1] == '\n' {
            return i + 2;
        }
    }

    // Then single newline
    for i in (search_start..search_end).rev() {
        if chars[i] == '\n' {
            return i + 1;
        }
    }

    // Then sentence end
    for i in (search_start..search_end).rev() {
        if (chars[i] == '.' || chars[i] == '!' || chars[i] == '?')
            && i + 1 < total
            && chars[i + 1].is_whitespace()
        {
            return i + 1;
        }
    }

    target_end
}
