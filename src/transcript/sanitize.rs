//! Content sanitization for export.
//!
//! Every record is mapped to a new record; the input slice is never
//! modified. Identity fields (`id`, `parentId`, `streamId`) and message
//! order are left exactly as they were.
//!
//! Per record kind:
//! - user: `workingDirectory` made base-relative
//! - assistant, legacy layout: `reasoning` cleared, entry text path-rewritten and redacted
//! - assistant, block layout: reasoning blocks removed, text blocks path-rewritten
//!   and redacted, all other blocks passed through untouched
//! - file snapshot: every tracked path made base-relative

use serde::Serialize;

use crate::transcript::paths::PathRewriter;
use crate::transcript::redact;
use crate::transcript::types::{
    AssistantContent, AssistantRecord, BlockResponse, ContentBlock, LegacyContent, LegacyEntry,
    Message, SnapshotRecord, TextBlock, TrackedFile, UserRecord,
};

/// Counts of what a sanitization pass changed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizeSummary {
    /// Messages processed.
    pub messages: usize,
    /// Legacy records whose reasoning field was cleared.
    pub reasoning_cleared: usize,
    /// Reasoning blocks removed from block-layout records.
    pub reasoning_blocks_removed: usize,
    /// Secrets replaced with a redaction marker.
    pub secrets_redacted: usize,
}

/// Base path for a stream: the `workingDirectory` of its first user record.
///
/// Later user records never override the first one.
#[must_use]
pub fn infer_base_path(messages: &[Message]) -> Option<&str> {
    messages.iter().find_map(|message| match message {
        Message::User(user) => Some(user.working_directory.as_str()),
        _ => None,
    })
}

/// Per-record sanitizer bound to one base path, tallying what it changed.
pub struct Sanitizer {
    paths: PathRewriter,
    summary: SanitizeSummary,
}

impl Sanitizer {
    /// Sanitizer for an explicit base path (empty disables path rewriting).
    #[must_use]
    pub fn new(base_path: &str) -> Self {
        Self {
            paths: PathRewriter::new(base_path),
            summary: SanitizeSummary::default(),
        }
    }

    /// Sanitizer for a stream, inferring the base path when none is given.
    #[must_use]
    pub fn for_stream(messages: &[Message], base_path: Option<&str>) -> Self {
        let base = base_path.or_else(|| infer_base_path(messages)).unwrap_or("");
        tracing::debug!(base, "sanitizing transcript");
        Self::new(base)
    }

    #[must_use]
    pub fn into_summary(self) -> SanitizeSummary {
        self.summary
    }

    /// Sanitize one record into a new record.
    pub fn sanitize_message(&mut self, message: &Message) -> Message {
        self.summary.messages += 1;
        match message {
            Message::User(record) => Message::User(self.user(record)),
            Message::Assistant(record) => Message::Assistant(self.assistant(record)),
            Message::Snapshot(record) => Message::Snapshot(self.snapshot(record)),
        }
    }

    fn user(&self, record: &UserRecord) -> UserRecord {
        UserRecord {
            working_directory: self.paths.rewrite_path(&record.working_directory),
            ..record.clone()
        }
    }

    fn assistant(&mut self, record: &AssistantRecord) -> AssistantRecord {
        let content = match &record.content {
            AssistantContent::Legacy(legacy) => AssistantContent::Legacy(self.legacy(legacy)),
            AssistantContent::Blocks(response) => AssistantContent::Blocks(self.blocks(response)),
        };
        AssistantRecord {
            envelope: record.envelope.clone(),
            content,
            extra: record.extra.clone(),
        }
    }

    fn legacy(&mut self, legacy: &LegacyContent) -> LegacyContent {
        if legacy.reasoning.is_some() {
            self.summary.reasoning_cleared += 1;
        }
        LegacyContent {
            reasoning: None,
            entries: legacy
                .entries
                .iter()
                .map(|entry| LegacyEntry {
                    text: self.clean_text(&entry.text),
                    ..entry.clone()
                })
                .collect(),
            extra: legacy.extra.clone(),
        }
    }

    fn blocks(&mut self, response: &BlockResponse) -> BlockResponse {
        let mut blocks = Vec::with_capacity(response.blocks.len());
        for block in &response.blocks {
            match block {
                ContentBlock::Reasoning(_) => self.summary.reasoning_blocks_removed += 1,
                ContentBlock::Text(text) => blocks.push(ContentBlock::Text(TextBlock {
                    text: self.clean_text(&text.text),
                    extra: text.extra.clone(),
                })),
                ContentBlock::Other(_) => blocks.push(block.clone()),
            }
        }
        BlockResponse {
            blocks,
            ..response.clone()
        }
    }

    fn snapshot(&self, record: &SnapshotRecord) -> SnapshotRecord {
        let mut copy = record.clone();
        copy.snapshot.entries = record
            .snapshot
            .entries
            .iter()
            .map(|file| TrackedFile {
                path: self.paths.rewrite_path(&file.path),
                extra: file.extra.clone(),
            })
            .collect();
        copy
    }

    fn clean_text(&mut self, text: &str) -> String {
        let redaction = redact::scan(&self.paths.rewrite_text(text));
        self.summary.secrets_redacted += redaction.findings.len();
        redaction.text
    }
}

/// Sanitize a whole stream, returning new records and a summary.
///
/// With `base_path` set to `None` the base is inferred with
/// [`infer_base_path`].
#[must_use]
pub fn sanitize_with_summary(
    messages: &[Message],
    base_path: Option<&str>,
) -> (Vec<Message>, SanitizeSummary) {
    let mut sanitizer = Sanitizer::for_stream(messages, base_path);
    let sanitized = messages
        .iter()
        .map(|message| sanitizer.sanitize_message(message))
        .collect();
    (sanitized, sanitizer.into_summary())
}

/// Sanitize a whole stream.
#[must_use]
pub fn sanitize(messages: &[Message], base_path: Option<&str>) -> Vec<Message> {
    sanitize_with_summary(messages, base_path).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn message(value: Value) -> Message {
        Message::from_value(value).unwrap()
    }

    fn user(id: &str, cwd: &str) -> Message {
        message(json!({
            "type": "user",
            "id": id,
            "streamId": "s1",
            "timestamp": "t",
            "parentId": null,
            "message": {"role": "user", "content": "look at /base/proj/secret.txt"},
            "workingDirectory": cwd,
            "clientVersion": "1.0"
        }))
    }

    fn legacy(reasoning: Value, text: &str) -> Message {
        message(json!({
            "type": "assistant",
            "id": "a1",
            "streamId": "s1",
            "timestamp": "t",
            "parentId": "u1",
            "snapshot": {"reasoning": reasoning, "entries": [{"role": "assistant", "text": text}]}
        }))
    }

    fn legacy_content(msg: &Message) -> &LegacyContent {
        match msg {
            Message::Assistant(AssistantRecord {
                content: AssistantContent::Legacy(legacy),
                ..
            }) => legacy,
            other => panic!("expected legacy assistant, got {other:?}"),
        }
    }

    fn block_content(msg: &Message) -> &BlockResponse {
        match msg {
            Message::Assistant(AssistantRecord {
                content: AssistantContent::Blocks(response),
                ..
            }) => response,
            other => panic!("expected block assistant, got {other:?}"),
        }
    }

    #[test]
    fn test_legacy_reasoning_cleared_and_text_cleaned() {
        let input = vec![legacy(
            json!("secret plan"),
            r#"/base/proj/src/a.ts contains api_key: "abcdef12345678""#,
        )];

        let (output, summary) = sanitize_with_summary(&input, Some("/base/proj"));
        let content = legacy_content(&output[0]);

        assert_eq!(content.reasoning, None);
        assert_eq!(
            content.entries[0].text,
            r#"src/a.ts contains api_key: "[REDACTED]""#
        );
        assert_eq!(summary.reasoning_cleared, 1);
        assert_eq!(summary.secrets_redacted, 1);

        // The input is untouched.
        assert_eq!(legacy_content(&input[0]).reasoning.as_deref(), Some("secret plan"));
    }

    #[test]
    fn test_empty_reasoning_becomes_null() {
        let output = sanitize(&[legacy(json!(""), "hi")], None);
        assert_eq!(legacy_content(&output[0]).reasoning, None);

        let encoded = serde_json::to_value(&output[0]).unwrap();
        assert_eq!(encoded["snapshot"]["reasoning"], Value::Null);
    }

    #[test]
    fn test_reasoning_blocks_are_removed() {
        let input = vec![message(json!({
            "type": "assistant",
            "id": "a1",
            "streamId": "s1",
            "timestamp": "t",
            "parentId": null,
            "response": {
                "model": "m",
                "id": "r1",
                "blocks": [{"tag": "reasoning", "text": "plan"}, {"tag": "text", "text": "hello"}]
            }
        }))];

        let output = sanitize(&input, Some("/base/proj"));
        let blocks = &block_content(&output[0]).blocks;
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0], ContentBlock::text("hello"));
    }

    #[test]
    fn test_only_reasoning_leaves_empty_block_list() {
        let input = vec![message(json!({
            "type": "assistant",
            "id": "a1",
            "streamId": "s1",
            "response": {"blocks": [{"tag": "reasoning", "text": "plan"}]}
        }))];

        let output = sanitize(&input, None);
        assert!(block_content(&output[0]).blocks.is_empty());
    }

    #[test]
    fn test_tool_blocks_pass_through_unchanged() {
        let tool_result = json!({
            "tag": "tool-result",
            "output": "read /base/proj/.env: API_TOKEN=abcdefghijklmnop",
        });
        let input = vec![message(json!({
            "type": "assistant",
            "id": "a1",
            "streamId": "s1",
            "response": {"blocks": [tool_result.clone(), {"tag": "text", "text": "/base/proj/x"}]}
        }))];

        let output = sanitize(&input, Some("/base/proj"));
        let blocks = &block_content(&output[0]).blocks;
        assert_eq!(blocks[0], ContentBlock::Other(tool_result));
        assert_eq!(blocks[1], ContentBlock::text("x"));
    }

    #[test]
    fn test_user_working_directory_and_snapshot_paths() {
        let snapshot = message(json!({
            "type": "file-snapshot",
            "id": "f1",
            "streamId": "s1",
            "timestamp": "t",
            "parentId": "u1",
            "isUpdate": false,
            "snapshot": {"entries": [{"path": "/base/proj/src/a.ts"}, {"path": "/etc/hosts"}]}
        }));
        let input = vec![user("u1", "/base/proj"), snapshot];

        let output = sanitize(&input, None);

        let Message::User(user) = &output[0] else { panic!("expected user") };
        assert_eq!(user.working_directory, ".");
        // User content is not rewritten.
        assert_eq!(user.message.content, "look at /base/proj/secret.txt");

        let Message::Snapshot(snapshot) = &output[1] else { panic!("expected snapshot") };
        let paths: Vec<_> = snapshot.snapshot.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["src/a.ts", "/etc/hosts"]);
    }

    #[test]
    fn test_first_user_record_wins_for_base_path() {
        let input = vec![user("u1", "/base/proj"), user("u2", "/elsewhere")];
        assert_eq!(infer_base_path(&input), Some("/base/proj"));

        let output = sanitize(&input, None);
        let Message::User(second) = &output[1] else { panic!("expected user") };
        assert_eq!(second.working_directory, "/elsewhere");
    }

    #[test]
    fn test_no_user_record_means_no_rewriting() {
        let input = vec![legacy(Value::Null, "/base/proj/a.ts")];
        assert_eq!(infer_base_path(&input), None);

        let output = sanitize(&input, None);
        assert_eq!(legacy_content(&output[0]).entries[0].text, "/base/proj/a.ts");
    }

    #[test]
    fn test_identity_and_order_untouched() {
        let input = vec![user("u1", "/base/proj"), legacy(json!("x"), "y")];
        let output = sanitize(&input, None);
        for (before, after) in input.iter().zip(&output) {
            assert_eq!(before.envelope(), after.envelope());
        }
    }

    #[test]
    fn test_clean_content_is_lossless() {
        let input = vec![user("u1", "proj"), legacy(Value::Null, "nothing sensitive here")];
        let output = sanitize(&input, None);
        assert_eq!(output, input);
    }
}
