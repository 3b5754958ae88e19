use crate::error::GroupingError;
use framer_protocol::Sentence;
use rayon::prelude::*;
use tracing::debug;

pub type Vector = Vec<f32>;

/// Black-box encoder producing fixed-length vectors.
///
/// Calls are independent of each other, so implementations must be `Sync`
/// to be driven from a thread pool.
pub trait Embedder: Sync {
    /// Summary vector for the whole sentence.
    fn embed_sentence(&self, text: &str) -> Result<Vector, GroupingError>;

    /// Contextual vector of the sub-word whose character span contains
    /// `char_offset`. Falls back to the summary vector when no span does.
    fn embed_token(&self, text: &str, char_offset: usize) -> Result<Vector, GroupingError>;
}

/// Character index of the first case-insensitive occurrence of `needle`.
pub fn find_char_offset(text: &str, needle: &str) -> Option<usize> {
    let hay: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = needle.chars().collect();

    if pattern.is_empty() || pattern.len() > hay.len() {
        return None;
    }

    (0..=hay.len() - pattern.len()).find(|&start| {
        hay[start..start + pattern.len()]
            .iter()
            .zip(&pattern)
            .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()))
    })
}

/// Index of the first sub-word whose `[start, end)` character span contains
/// `char_offset`. Special tokens have empty spans and never match. Position 0
/// (the summary token) is the fallback, e.g. when the offset was truncated away.
pub fn subword_position(offsets: &[(usize, usize)], char_offset: usize) -> usize {
    offsets
        .iter()
        .position(|&(start, end)| start <= char_offset && char_offset < end)
        .unwrap_or(0)
}

/// Vector of the verb occurrence in `sentence`.
///
/// `Ok(None)` is the sentinel: the sentence has no anchor for `verb`, or the
/// anchor's surface form cannot be located in the sentence text.
pub fn verb_vector<E: Embedder + ?Sized>(
    embedder: &E,
    sentence: &Sentence,
    verb: &str,
) -> Result<Option<Vector>, GroupingError> {
    let Some(anchor) = sentence.verb_anchor(verb) else {
        debug!(sentence = %sentence.id, "No verb anchor, no vector");
        return Ok(None);
    };

    let Some(offset) = find_char_offset(&sentence.text, &anchor.form) else {
        debug!(sentence = %sentence.id, form = %anchor.form, "Verb form not found in text, no vector");
        return Ok(None);
    };

    embedder.embed_token(&sentence.text, offset).map(Some)
}

/// Summary vectors in input order. The first failure aborts the batch.
pub fn sentence_vectors<E: Embedder + ?Sized>(
    embedder: &E,
    sentences: &[&Sentence],
) -> Result<Vec<Option<Vector>>, GroupingError> {
    sentences
        .par_iter()
        .map(|s| embedder.embed_sentence(&s.text).map(Some))
        .collect()
}

/// Verb vectors in input order, sentinels kept in place.
pub fn verb_vectors<E: Embedder + ?Sized>(
    embedder: &E,
    sentences: &[&Sentence],
    verb: &str,
) -> Result<Vec<Option<Vector>>, GroupingError> {
    sentences
        .par_iter()
        .map(|s| verb_vector(embedder, s, verb))
        .collect()
}
