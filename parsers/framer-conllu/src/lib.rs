pub mod error;
pub mod line;

pub use error::ConlluError;

use framer_protocol::{Corpus, Sentence, Token};
use line::{classify, Line, COLUMNS};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Sentence being accumulated between blank lines.
#[derive(Default)]
struct Pending {
    id: Option<String>,
    text: Option<String>,
    tokens: Vec<Token>,
    first_line: usize,
}

/// Reads a CoNLL-U document into a corpus.
///
/// Short token lines and sentences without a `# text` comment are skipped
/// with a warning. A token with an empty id, form, lemma or UPOS column is
/// a hard error.
pub fn parse_str(input: &str) -> Result<Corpus, ConlluError> {
    let mut sentences = Vec::new();
    let mut pending = Pending::default();

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;

        match classify(raw.trim()) {
            Line::Blank => close(&mut pending, &mut sentences),
            Line::SentId(id) => pending.id = Some(id.to_string()),
            Line::Text(text) => pending.text = Some(text.to_string()),
            Line::Comment => {}
            Line::Token(cols) => {
                if cols.len() < COLUMNS {
                    warn!(line = line_no, columns = cols.len(), "Skipping short token line");
                    continue;
                }

                let token = token_from_columns(&cols);
                token
                    .validate()
                    .map_err(|source| ConlluError::Token { line: line_no, source })?;

                if pending.tokens.is_empty() {
                    pending.first_line = line_no;
                }
                pending.tokens.push(token);
            }
        }
    }
    close(&mut pending, &mut sentences);

    debug!(sentences = sentences.len(), "Parsed CoNLL-U input");
    Ok(Corpus::new(sentences))
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<Corpus, ConlluError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConlluError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&content)
}

fn token_from_columns(cols: &[&str]) -> Token {
    Token {
        id: cols[0].to_string(),
        form: cols[1].to_string(),
        lemma: cols[2].to_string(),
        upos: cols[3].to_string(),
        xpos: cols[4].to_string(),
        feats: cols[5].to_string(),
        head: cols[6].to_string(),
        deprel: cols[7].to_string(),
        deps: cols[8].to_string(),
        misc: cols[9].to_string(),
    }
}

fn close(pending: &mut Pending, sentences: &mut Vec<Sentence>) {
    let current = std::mem::take(pending);
    if current.tokens.is_empty() {
        return;
    }

    let Some(text) = current.text else {
        warn!(line = current.first_line, "Skipping sentence without '# text' comment");
        return;
    };

    let id = current
        .id
        .unwrap_or_else(|| format!("s{}", sentences.len() + 1));

    sentences.push(Sentence {
        id,
        text,
        tokens: current.tokens,
    });
}
