use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};

/// Universal POS tag that marks a verb occurrence.
pub const VERB_UPOS: &str = "VERB";

/// One row of an annotated sentence. Mirrors the ten CoNLL-U columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Sentence-local ordinal. Kept as text: ranges ("1-2") and empty nodes ("3.1") occur.
    pub id: String,
    pub form: String,
    pub lemma: String,
    pub upos: String,
    pub xpos: String,
    pub feats: String,
    pub head: String,
    pub deprel: String,
    pub deps: String,
    /// Free annotation field. Semantic roles are encoded as `Label:HeadId` segments joined by `|`.
    pub misc: String,
}

impl Token {
    /// Checks the fields every downstream stage relies on.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let required = [
            ("id", &self.id),
            ("form", &self.form),
            ("lemma", &self.lemma),
            ("upos", &self.upos),
        ];

        for (field, value) in required {
            if value.is_empty() {
                return Err(ProtocolError::MissingField {
                    field,
                    token: self.describe(),
                });
            }
        }
        Ok(())
    }

    /// True when this token is a VERB whose lemma matches `lemma` ignoring case.
    pub fn is_verb_of(&self, lemma: &str) -> bool {
        self.upos == VERB_UPOS && self.lemma.to_lowercase() == lemma.to_lowercase()
    }

    /// Iterates the `(label, head)` pairs of the misc field.
    /// Segments without a `:` are not role attachments and are skipped.
    pub fn role_attachments(&self) -> impl Iterator<Item = (&str, &str)> {
        self.misc.split('|').filter_map(|segment| {
            let mut parts = segment.split(':');
            let label = parts.next()?;
            let head = parts.next()?;
            Some((label, head))
        })
    }

    fn describe(&self) -> String {
        if self.id.is_empty() {
            self.form.clone()
        } else {
            format!("{} {}", self.id, self.form)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub id: String,
    pub text: String,
    pub tokens: Vec<Token>,
}

impl Sentence {
    /// The verb anchor: first VERB token with the given lemma.
    pub fn verb_anchor(&self, lemma: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.is_verb_of(lemma))
    }

    pub fn contains_verb(&self, lemma: &str) -> bool {
        self.verb_anchor(lemma).is_some()
    }
}

/// Outcome of filtering a corpus by verb lemma.
#[derive(Debug)]
pub enum VerbSelection<'a> {
    /// No sentence has a VERB token with that lemma.
    NoMatch,
    Matched(Vec<&'a Sentence>),
}

impl<'a> VerbSelection<'a> {
    pub fn sentences(&self) -> &[&'a Sentence] {
        match self {
            VerbSelection::NoMatch => &[],
            VerbSelection::Matched(sentences) => sentences,
        }
    }
}

/// All sentences read from one input file. Read-only after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    sentences: Vec<Sentence>,
}

impl Corpus {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Keeps the sentences that use `lemma` as a verb, in corpus order.
    pub fn select_verb(&self, lemma: &str) -> VerbSelection<'_> {
        let matched: Vec<&Sentence> = self
            .sentences
            .iter()
            .filter(|s| s.contains_verb(lemma))
            .collect();

        if matched.is_empty() {
            VerbSelection::NoMatch
        } else {
            VerbSelection::Matched(matched)
        }
    }
}
