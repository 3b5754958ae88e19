use crate::arguments::ArgumentFrame;
use framer_protocol::{Example, GroupingMethod, ProtocolError, Roleset, RolesetMap, Sentence, Signature};
use std::num::NonZeroUsize;

fn has_room(roleset: &Roleset, cap: Option<NonZeroUsize>) -> bool {
    cap.map_or(true, |cap| roleset.examples.len() < cap.get())
}

/// Builds a map from per-sentence frames, in sentence order.
///
/// The first frame with a given signature opens a roleset; later ones add
/// examples until `cap` is reached. Frames over the cap are still counted.
pub fn assemble_frames<I>(frames: I, cap: Option<NonZeroUsize>) -> Result<RolesetMap, ProtocolError>
where
    I: IntoIterator<Item = ArgumentFrame>,
{
    let mut map = RolesetMap::new(GroupingMethod::Arguments);

    for ArgumentFrame { signature, example } in frames {
        let id = map.insert(Signature::Roles(signature.clone()), signature)?;

        if let Some(roleset) = map.get_mut(id) {
            roleset.example_count += 1;
            if has_room(roleset, cap) {
                roleset.examples.push(example);
            }
        }
    }
    Ok(map)
}

/// Builds a map from index groups over `sentences`.
///
/// Each group becomes one roleset labelled `cluster-<n>` with no roles. Only
/// the first `cap` members are stored, with empty argument maps.
pub fn assemble_groups(
    groups: &[Vec<usize>],
    sentences: &[&Sentence],
    cap: Option<NonZeroUsize>,
    method: GroupingMethod,
) -> Result<RolesetMap, ProtocolError> {
    let mut map = RolesetMap::new(method);

    for (ordinal, group) in groups.iter().enumerate() {
        let id = map.insert(Signature::cluster(ordinal + 1), Vec::new())?;
        let Some(roleset) = map.get_mut(id) else { continue };

        let limit = cap.map_or(group.len(), NonZeroUsize::get);
        roleset.example_count = group.len();
        roleset.examples = group
            .iter()
            .filter_map(|&i| sentences.get(i))
            .take(limit)
            .map(|s| Example::new(s.text.clone()))
            .collect();
    }
    Ok(map)
}
