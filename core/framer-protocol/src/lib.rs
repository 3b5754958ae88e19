pub mod corpus;
pub mod error;
pub mod ids;
pub mod roleset;

// Re-export core types for convenience
pub use corpus::{Corpus, Sentence, Token, VerbSelection, VERB_UPOS};
pub use error::ProtocolError;
pub use ids::RolesetId;
pub use roleset::{Example, GroupingMethod, Roleset, RolesetMap, Signature, REL_LABEL};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(id: &str, form: &str, lemma: &str, upos: &str, misc: &str) -> Token {
        Token {
            id: id.to_string(),
            form: form.to_string(),
            lemma: lemma.to_string(),
            upos: upos.to_string(),
            xpos: "_".to_string(),
            feats: "_".to_string(),
            head: "0".to_string(),
            deprel: "_".to_string(),
            deps: "_".to_string(),
            misc: misc.to_string(),
        }
    }

    fn sentence(id: &str, text: &str, tokens: Vec<Token>) -> Sentence {
        Sentence {
            id: id.to_string(),
            text: text.to_string(),
            tokens,
        }
    }

    #[test]
    fn test_token_validation() {
        assert!(t("1", "gato", "gato", "NOUN", "_").validate().is_ok());

        let err = t("1", "gato", "", "NOUN", "_").validate().unwrap_err();
        assert_eq!(
            err,
            ProtocolError::MissingField {
                field: "lemma",
                token: "1 gato".to_string()
            }
        );
    }

    #[test]
    fn test_role_attachments() {
        let token = t("5", "peixe", "peixe", "NOUN", "Arg1:2|SpaceAfter=No|ArgM-loc:7");
        let pairs: Vec<_> = token.role_attachments().collect();
        assert_eq!(pairs, vec![("Arg1", "2"), ("ArgM-loc", "7")]);
    }

    #[test]
    fn test_verb_anchor_is_first_match() {
        // "Comeu e comeu." - two occurrences, the first one anchors
        let s = sentence(
            "s1",
            "Comeu e comeu.",
            vec![
                t("1", "Comeu", "COMER", "VERB", "_"),
                t("2", "e", "e", "CCONJ", "_"),
                t("3", "comeu", "comer", "VERB", "_"),
            ],
        );

        assert_eq!(s.verb_anchor("comer").map(|t| t.id.as_str()), Some("1"));
        // AUX with the same lemma is not a verb anchor
        let aux = sentence("s2", "Tinha.", vec![t("1", "Tinha", "ter", "AUX", "_")]);
        assert!(!aux.contains_verb("ter"));
    }

    #[test]
    fn test_select_verb_no_match() {
        let corpus = Corpus::new(vec![sentence(
            "s1",
            "O gato dorme.",
            vec![t("1", "dorme", "dormir", "VERB", "_")],
        )]);

        assert!(matches!(corpus.select_verb("comer"), VerbSelection::NoMatch));
        assert_eq!(corpus.select_verb("DORMIR").sentences().len(), 1);
    }

    #[test]
    fn test_ids_assigned_sequentially() {
        let mut map = RolesetMap::new(GroupingMethod::Arguments);
        let a = map.insert(Signature::Roles(vec!["Arg0".into()]), vec!["Arg0".into()]).unwrap();
        let b = map.insert(Signature::Roles(vec![]), vec![]).unwrap();
        let again = map.insert(Signature::Roles(vec!["Arg0".into()]), vec![]).unwrap();

        assert_eq!(a, RolesetId(1));
        assert_eq!(b, RolesetId(2));
        assert_eq!(again, a);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_create_empty_roleset() {
        let mut empty = RolesetMap::default();
        assert_eq!(empty.create_empty_roleset(), Ok(RolesetId(1)));

        let mut map = RolesetMap::new(GroupingMethod::SentenceEmbedding);
        map.insert(Signature::cluster(1), vec![]).unwrap();
        map.insert(Signature::cluster(2), vec![]).unwrap();
        let added = map.create_empty_roleset().unwrap();

        assert_eq!(added, RolesetId(3));
        assert_eq!(map.get(added).map(|r| r.signature.clone()), Some(Signature::Added(added)));
        assert!(map.get(added).map_or(false, |r| r.examples.is_empty()));
    }

    #[test]
    fn test_push_example() {
        let mut map = RolesetMap::new(GroupingMethod::Arguments);
        let id = map.insert(Signature::Roles(vec![]), vec![]).unwrap();

        let example = Example::new("O gato comeu.").with_argument(REL_LABEL, "comeu");
        map.push_example(id, example.clone()).unwrap();

        let roleset = map.get(id).unwrap();
        assert_eq!(roleset.examples, vec![example]);
        assert_eq!(roleset.example_count, 1);

        let err = map.push_example(RolesetId(9), Example::new("x")).unwrap_err();
        assert_eq!(err, ProtocolError::UnknownRoleset(RolesetId(9)));
    }

    #[test]
    fn test_snapshot_roundtrip_rebuilds_index() {
        let mut map = RolesetMap::new(GroupingMethod::Arguments);
        let sig = Signature::Roles(vec!["Arg0".into(), "Arg1".into()]);
        let id = map.insert(sig.clone(), vec!["Arg0".into(), "Arg1".into()]).unwrap();
        map.push_example(id, Example::new("A").with_argument("Arg0", "a")).unwrap();

        let json = serde_json::to_string(&map).unwrap();
        let restored: RolesetMap = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, map);
        assert_eq!(restored.lookup(&sig), Some(id));
        assert_eq!(restored.method(), Some(GroupingMethod::Arguments));
    }

    #[test]
    fn test_snapshot_rejects_duplicate_ids() {
        let json = r#"{
            "method": "verb-embedding",
            "rolesets": [
                {"id": 1, "signature": {"cluster": "cluster-1"}, "roles": [], "examples": [], "example_count": 0},
                {"id": 1, "signature": {"cluster": "cluster-2"}, "roles": [], "examples": [], "example_count": 0}
            ]
        }"#;

        let err = serde_json::from_str::<RolesetMap>(json).unwrap_err();
        assert!(err.to_string().contains("appears more than once"));
    }

    #[test]
    fn test_create_empty_roleset_after_loaded_added_signature() {
        // Roleset 1 was itself added by hand as "added 2" in an earlier session
        let json = r#"{
            "method": "arguments",
            "rolesets": [
                {"id": 1, "signature": {"added": 2}, "roles": [], "examples": [], "example_count": 0}
            ]
        }"#;
        let mut map: RolesetMap = serde_json::from_str(json).unwrap();

        let added = map.create_empty_roleset().unwrap();
        assert_eq!(added, RolesetId(2));
        assert_eq!(map.len(), 2);
        assert_eq!(map.ids().collect::<Vec<_>>(), vec![RolesetId(1), RolesetId(2)]);
        assert_eq!(map.get(added).map(|r| r.signature.clone()), Some(Signature::Added(added)));

        let next = map.create_empty_roleset().unwrap();
        assert_eq!(next, RolesetId(3));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_ids_exhausted() {
        let json = format!(
            r#"{{"method": null, "rolesets": [{{"id": {}, "signature": {{"added": 7}}, "roles": [], "examples": [], "example_count": 0}}]}}"#,
            u32::MAX
        );
        let mut map: RolesetMap = serde_json::from_str(&json).unwrap();

        let last = RolesetId(u32::MAX);
        assert_eq!(last.checked_next(), None);
        assert_eq!(map.next_id(), Err(ProtocolError::RolesetIdsExhausted(last)));
        assert_eq!(map.create_empty_roleset(), Err(ProtocolError::RolesetIdsExhausted(last)));
        assert_eq!(
            map.insert(Signature::cluster(1), vec![]),
            Err(ProtocolError::RolesetIdsExhausted(last))
        );
        assert_eq!(map.len(), 1);
    }

    proptest! {
        #[test]
        fn test_next_id_never_reuses(count in 0usize..20, extra in 0usize..5) {
            let mut map = RolesetMap::new(GroupingMethod::SentenceEmbedding);
            for n in 1..=count {
                map.insert(Signature::cluster(n), vec![]).unwrap();
            }
            let mut seen: Vec<RolesetId> = map.ids().collect();
            for _ in 0..extra {
                let id = map.create_empty_roleset().unwrap();
                prop_assert!(!seen.contains(&id));
                seen.push(id);
            }
            prop_assert_eq!(map.len(), count + extra);
        }
    }
}
