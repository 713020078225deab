//! Identifier remapping for import.
//!
//! An imported transcript must not collide with the transcript it was
//! exported from, so every `id`, `streamId` and `parentId` is replaced.
//! One [`IdRemapper`] is used for a whole pass: the same original id always
//! maps to the same fresh id within that pass, which keeps every
//! `parentId -> id` link intact. A new pass starts from an empty table.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::transcript::types::{Envelope, Message};

type Generator = Box<dyn FnMut() -> String>;

/// Assigns fresh identifiers, consistently, for the lifetime of one pass.
pub struct IdRemapper {
    table: HashMap<String, String>,
    issued: HashSet<String>,
    generate: Generator,
}

impl IdRemapper {
    /// Remapper issuing random UUID v4 identifiers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_generator(|| Uuid::new_v4().to_string())
    }

    /// Remapper drawing fresh identifiers from `generate`.
    ///
    /// Values the generator repeats are discarded and drawn again, so the
    /// generator must eventually produce unused values.
    #[must_use]
    pub fn with_generator(generate: impl FnMut() -> String + 'static) -> Self {
        Self {
            table: HashMap::new(),
            issued: HashSet::new(),
            generate: Box::new(generate),
        }
    }

    /// Number of distinct identifiers mapped so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The fresh identifier for `id`, generated on first use.
    pub fn remap_id(&mut self, id: &str) -> String {
        if let Some(fresh) = self.table.get(id) {
            return fresh.clone();
        }
        let fresh = loop {
            let candidate = (self.generate)();
            if self.issued.insert(candidate.clone()) {
                break candidate;
            }
        };
        self.table.insert(id.to_string(), fresh.clone());
        fresh
    }

    /// Remap an optional identifier; `None` stays `None`.
    pub fn remap(&mut self, id: Option<&str>) -> Option<String> {
        id.map(|id| self.remap_id(id))
    }

    /// A copy of `message` with `id`, `streamId` and `parentId` remapped.
    ///
    /// Every other field, content included, is copied unchanged.
    pub fn remap_message(&mut self, message: &Message) -> Message {
        let envelope = message.envelope();
        let remapped = Envelope {
            id: self.remap_id(&envelope.id),
            stream_id: self.remap_id(&envelope.stream_id),
            parent_id: self.remap(envelope.parent_id.as_deref()),
            ..envelope.clone()
        };
        message.with_envelope(remapped)
    }

    /// Remap a whole stream in order.
    pub fn remap_all(&mut self, messages: &[Message]) -> Vec<Message> {
        let remapped: Vec<Message> = messages.iter().map(|m| self.remap_message(m)).collect();
        tracing::debug!(
            messages = remapped.len(),
            identifiers = self.len(),
            "remapped identifiers"
        );
        remapped
    }
}

impl Default for IdRemapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, parent: Option<&str>) -> Message {
        Message::from_value(json!({
            "type": "assistant",
            "id": id,
            "streamId": "stream-1",
            "timestamp": "2025-01-20T10:00:00Z",
            "parentId": parent,
            "snapshot": {"reasoning": null, "entries": [{"role": "assistant", "text": id}]}
        }))
        .unwrap()
    }

    #[test]
    fn test_remap_none_is_none() {
        let mut remapper = IdRemapper::new();
        assert_eq!(remapper.remap(None), None);
        assert!(remapper.is_empty());
    }

    #[test]
    fn test_remap_is_deterministic_within_a_pass() {
        let mut remapper = IdRemapper::new();
        let first = remapper.remap_id("x");
        let second = remapper.remap_id("x");
        let other = remapper.remap_id("y");

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_ne!(first, "x");
        assert_eq!(remapper.len(), 2);
    }

    #[test]
    fn test_separate_passes_do_not_share_ids() {
        let a = IdRemapper::new().remap_id("x");
        let b = IdRemapper::new().remap_id("x");
        assert_ne!(a, b);
    }

    #[test]
    fn test_repeated_generator_values_are_redrawn() {
        let mut values = vec!["dup", "dup", "dup", "fresh"].into_iter();
        let mut remapper =
            IdRemapper::with_generator(move || values.next().unwrap_or("end").to_string());

        assert_eq!(remapper.remap_id("a"), "dup");
        assert_eq!(remapper.remap_id("b"), "fresh");
    }

    #[test]
    fn test_reference_forest_survives() {
        // Two roots, one with a branch.
        let input = vec![
            record("r1", None),
            record("c1", Some("r1")),
            record("c2", Some("c1")),
            record("b1", Some("c1")),
            record("r2", None),
            record("c3", Some("r2")),
        ];

        let mut remapper = IdRemapper::new();
        let output = remapper.remap_all(&input);

        let stream = output[0].stream_id();
        assert_ne!(stream, "stream-1");
        for (before, after) in input.iter().zip(&output) {
            assert_ne!(before.id(), after.id());
            assert_eq!(after.stream_id(), stream);
            assert_eq!(before.parent_id().is_none(), after.parent_id().is_none());

            if let Some(parent) = before.parent_id() {
                let parent_index = input.iter().position(|m| m.id() == parent).unwrap();
                assert_eq!(after.parent_id(), Some(output[parent_index].id()));
            }
        }
    }

    #[test]
    fn test_remap_message_copies_content() {
        let input = record("m1", Some("m0"));
        let output = IdRemapper::new().remap_message(&input);

        let mut expected_envelope = input.envelope().clone();
        expected_envelope.id = output.id().to_string();
        expected_envelope.stream_id = output.stream_id().to_string();
        expected_envelope.parent_id = output.parent_id().map(str::to_string);
        assert_eq!(input.with_envelope(expected_envelope), output);
        assert_eq!(input.id(), "m1");
    }
}
