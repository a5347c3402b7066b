use crate::conversations::Message;

/// Messages in `fetched` whose timestamp does not appear in `stored`.
///
/// Keeps the order of `fetched`. Matching is on exact timestamp equality, so a
/// message whose timestamp was regenerated upstream counts as new.
pub fn new_messages<'a>(fetched: &'a [Message], stored: &[Message]) -> Vec<&'a Message> {
    fetched
        .iter()
        .filter(|message| !stored.iter().any(|seen| seen.ts == message.ts))
        .collect()
}
