use framer_protocol::{Example, Sentence, REL_LABEL};
use std::collections::BTreeSet;
use tracing::debug;

/// Marker every semantic-role label carries (Arg0, ArgM-loc, ...).
const ROLE_MARKER: &str = "Arg";
/// Length of the prefix stripped before checking for a numbered role.
const ROLE_PREFIX_LEN: usize = 3;

/// Per-sentence output of the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentFrame {
    /// Sorted role labels. Empty when the verb has no qualifying roles.
    pub signature: Vec<String>,
    pub example: Example,
}

/// `Arg0`, `Arg12`: the label minus its prefix is a non-empty run of digits.
pub fn is_core_role(label: &str) -> bool {
    label
        .get(ROLE_PREFIX_LEN..)
        .map_or(false, |rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Collects the roles attached to the first `verb` anchor of `sentence`.
///
/// Every role attached to the anchor goes into the example. Core roles always
/// shape the signature; modifier roles only when `consider_modifiers` is set.
pub fn extract_frame(sentence: &Sentence, verb: &str, consider_modifiers: bool) -> ArgumentFrame {
    let mut roles = BTreeSet::new();
    let mut example = Example::new(sentence.text.clone());

    let Some(anchor) = sentence.verb_anchor(verb) else {
        debug!(sentence = %sentence.id, "No verb anchor, empty signature");
        return ArgumentFrame {
            signature: Vec::new(),
            example,
        };
    };
    debug!(sentence = %sentence.id, anchor = %anchor.id, "Verb anchor found");

    example
        .arguments
        .insert(REL_LABEL.to_string(), anchor.form.clone());

    for token in &sentence.tokens {
        for (label, head) in token.role_attachments() {
            // Head must be the anchor id exactly
            if head != anchor.id || !label.contains(ROLE_MARKER) {
                continue;
            }

            if is_core_role(label) {
                roles.insert(label.to_string());
            } else {
                debug!(sentence = %sentence.id, label, "Modifier role");
                if consider_modifiers {
                    roles.insert(label.to_string());
                }
            }
            example
                .arguments
                .insert(label.to_string(), token.form.clone());
        }
    }

    let signature: Vec<String> = roles.into_iter().collect();
    debug!(sentence = %sentence.id, ?signature, "Derived signature");

    ArgumentFrame { signature, example }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framer_protocol::Token;

    fn t(id: &str, form: &str, lemma: &str, upos: &str, misc: &str) -> Token {
        Token {
            id: id.to_string(),
            form: form.to_string(),
            lemma: lemma.to_string(),
            upos: upos.to_string(),
            xpos: "_".to_string(),
            feats: "_".to_string(),
            head: "_".to_string(),
            deprel: "_".to_string(),
            deps: "_".to_string(),
            misc: misc.to_string(),
        }
    }

    fn gato_comeu() -> Sentence {
        Sentence {
            id: "s1".to_string(),
            text: "O gato comeu o peixe.".to_string(),
            tokens: vec![
                t("1", "O", "o", "DET", "_"),
                t("2", "comeu", "comer", "VERB", "_"),
                t("3", "peixe", "peixe", "NOUN", "Arg1:2"),
            ],
        }
    }

    #[test]
    fn test_core_role_detection() {
        assert!(is_core_role("Arg0"));
        assert!(is_core_role("Arg12"));
        assert!(!is_core_role("Arg"));
        assert!(!is_core_role("ArgM-loc"));
        assert!(!is_core_role("Arg1a"));
    }

    #[test]
    fn test_single_core_role() {
        let frame = extract_frame(&gato_comeu(), "comer", false);

        assert_eq!(frame.signature, vec!["Arg1".to_string()]);
        assert_eq!(frame.example.sentence, "O gato comeu o peixe.");
        assert_eq!(frame.example.arguments.len(), 2);
        assert_eq!(frame.example.arguments.get("Rel").map(String::as_str), Some("comeu"));
        assert_eq!(frame.example.arguments.get("Arg1").map(String::as_str), Some("peixe"));
    }

    #[test]
    fn test_modifiers_only_shape_signature_on_request() {
        let sentence = Sentence {
            id: "s2".to_string(),
            text: "Ontem o gato comeu em casa.".to_string(),
            tokens: vec![
                t("1", "Ontem", "ontem", "ADV", "ArgM-tmp:4"),
                t("3", "gato", "gato", "NOUN", "Arg0:4"),
                t("4", "comeu", "comer", "VERB", "_"),
                t("6", "casa", "casa", "NOUN", "ArgM-loc:4"),
            ],
        };

        let plain = extract_frame(&sentence, "comer", false);
        assert_eq!(plain.signature, vec!["Arg0".to_string()]);
        // Modifiers still land in the example
        assert_eq!(plain.example.arguments.get("ArgM-loc").map(String::as_str), Some("casa"));
        assert_eq!(plain.example.arguments.get("ArgM-tmp").map(String::as_str), Some("Ontem"));

        let with_mods = extract_frame(&sentence, "comer", true);
        assert_eq!(with_mods.signature, vec!["Arg0", "ArgM-loc", "ArgM-tmp"]);
    }

    #[test]
    fn test_roles_of_other_heads_are_ignored() {
        // "comeu" (2) and "dormiu" (5): peixe belongs to 2, gato to 5 only
        let sentence = Sentence {
            id: "s3".to_string(),
            text: "Comeu o peixe e o gato dormiu.".to_string(),
            tokens: vec![
                t("1", "Comeu", "comer", "VERB", "_"),
                t("3", "peixe", "peixe", "NOUN", "Arg1:1"),
                t("6", "gato", "gato", "NOUN", "Arg0:7|Arg0:17"),
                t("7", "dormiu", "dormir", "VERB", "_"),
            ],
        };

        let frame = extract_frame(&sentence, "comer", false);
        assert_eq!(frame.signature, vec!["Arg1".to_string()]);
        assert!(!frame.example.arguments.contains_key("Arg0"));
    }

    #[test]
    fn test_no_anchor_gives_empty_signature() {
        let frame = extract_frame(&gato_comeu(), "beber", true);
        assert!(frame.signature.is_empty());
        assert!(frame.example.arguments.is_empty());
    }

    #[test]
    fn test_verb_matches_case_insensitively() {
        let frame = extract_frame(&gato_comeu(), "COMER", false);
        assert_eq!(frame.signature, vec!["Arg1".to_string()]);
    }
}
