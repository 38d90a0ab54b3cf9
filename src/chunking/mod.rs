//! Fixed-size character chunking with overlap.
//!
//! Windows are measured in Unicode scalar values, not bytes, so a chunk
//! never splits a multi-byte character. No attempt is made to respect
//! line or token boundaries.

/// Split `text` into windows of at most `chunk_size` characters, each
/// starting `chunk_size - chunk_overlap` characters after the previous one.
///
/// A window is emitted for every start offset inside the text, so a window
/// that already reaches the end can be followed by a shorter one repeating
/// its tail.
pub fn chunk_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let stride = chunk_size.saturating_sub(chunk_overlap).max(1);

    // Byte offset of every char plus the end of the string, so windows can
    // be sliced without copying the text into a Vec<char>.
    let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    bounds.push(text.len());
    let char_count = bounds.len() - 1;

    let mut chunks = Vec::with_capacity(char_count / stride + 1);
    let mut start = 0usize;

    while start < char_count {
        let end = (start + chunk_size).min(char_count);
        chunks.push(text[bounds[start]..bounds[end]].to_string());
        start += stride;
    }

    chunks
}
