pub mod arguments;
pub mod assembler;
pub mod embedding;
pub mod error;
pub mod similarity;

#[cfg(feature = "bert")]
pub mod bert;

pub use arguments::{extract_frame, is_core_role, ArgumentFrame};
pub use assembler::{assemble_frames, assemble_groups};
pub use embedding::{Embedder, Vector};
pub use error::GroupingError;
pub use similarity::{cosine_similarity, group_connected, group_greedy, validate_threshold};

use framer_protocol::{GroupingMethod, RolesetMap, Sentence};
use std::num::NonZeroUsize;
use tracing::info;

/// Every token must carry id, form, lemma and UPOS before any grouping starts.
fn validate_tokens(sentences: &[&Sentence]) -> Result<(), GroupingError> {
    for sentence in sentences {
        for token in &sentence.tokens {
            token.validate()?;
        }
    }
    Ok(())
}

/// Heuristic grouping: sentences sharing a role signature share a roleset.
pub fn group_by_arguments(
    sentences: &[&Sentence],
    verb: &str,
    max_per_roleset: Option<NonZeroUsize>,
    consider_modifiers: bool,
) -> Result<RolesetMap, GroupingError> {
    validate_tokens(sentences)?;

    let frames = sentences
        .iter()
        .map(|s| extract_frame(s, verb, consider_modifiers));
    let map = assemble_frames(frames, max_per_roleset)?;

    info!(
        sentences = sentences.len(),
        rolesets = map.len(),
        consider_modifiers,
        "Grouped by arguments"
    );
    Ok(map)
}

/// Greedy grouping over whole-sentence vectors.
pub fn group_by_sentence_embedding<E: Embedder + ?Sized>(
    embedder: &E,
    sentences: &[&Sentence],
    max_per_roleset: Option<NonZeroUsize>,
    threshold: f32,
) -> Result<RolesetMap, GroupingError> {
    validate_threshold(threshold)?;
    validate_tokens(sentences)?;

    let vectors = embedding::sentence_vectors(embedder, sentences)?;
    let groups = group_greedy(&vectors, threshold)?;
    let map = assemble_groups(&groups, sentences, max_per_roleset, GroupingMethod::SentenceEmbedding)?;

    info!(
        sentences = sentences.len(),
        rolesets = map.len(),
        threshold,
        "Grouped by sentence embedding"
    );
    Ok(map)
}

/// Transitive grouping over the vector of the verb occurrence itself.
/// Sentences whose verb cannot be located are left out of every roleset.
pub fn group_by_verb_token_embedding<E: Embedder + ?Sized>(
    embedder: &E,
    sentences: &[&Sentence],
    verb: &str,
    max_per_roleset: Option<NonZeroUsize>,
    threshold: f32,
) -> Result<RolesetMap, GroupingError> {
    validate_threshold(threshold)?;
    validate_tokens(sentences)?;

    let vectors = embedding::verb_vectors(embedder, sentences, verb)?;
    let excluded = vectors.iter().filter(|v| v.is_none()).count();
    let groups = group_connected(&vectors, threshold)?;
    let map = assemble_groups(&groups, sentences, max_per_roleset, GroupingMethod::VerbEmbedding)?;

    info!(
        sentences = sentences.len(),
        excluded,
        rolesets = map.len(),
        threshold,
        "Grouped by verb token embedding"
    );
    Ok(map)
}
