// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! End-to-end conversations through the chat service with a scripted model.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use codesmith::chat::{ChatService, Inbound, Reply, ReplyPolicy};
use codesmith::codegen::{BEGIN_BASE_MARKER, END_BASE_MARKER, SYSTEM_INSTRUCTION};
use codesmith::error::ProviderError;
use codesmith::generator::Generator;
use codesmith::session::ModelPolicy;
use codesmith::store::{ConversationId, VersionStore};
use codesmith::types::{CodeModel, CompletionRequest, CompletionResponse};

// ============================================================================
// Scripted model
// ============================================================================

/// Returns queued responses in order and records every request.
#[derive(Default)]
struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    fn push(&self, response: &str) {
        self.responses.lock().unwrap().push_back(response.to_string());
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeModel for ScriptedModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .map(CompletionResponse::text)
            .ok_or_else(|| ProviderError::api("no scripted response", 500))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct Harness {
    temp: TempDir,
    model: Arc<ScriptedModel>,
    service: ChatService,
}

impl Harness {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let model = Arc::new(ScriptedModel::default());
        let generator = Generator::new(model.clone(), VersionStore::new(temp.path()));
        let service = ChatService::new(generator, ModelPolicy::open("gpt-5"), ReplyPolicy::default());
        Self { temp, model, service }
    }

    async fn send(&self, conversation: &ConversationId, text: &str) -> Vec<Reply> {
        self.service.handle(conversation, Inbound::text(text)).await
    }

    fn conversation_files(&self, conversation: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.temp.path().join(conversation))
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

// ============================================================================
// Create, then edit
// ============================================================================

#[tokio::test]
async fn test_create_hello_py() {
    let h = Harness::new();
    let c = ConversationId::from(42);
    h.model.push("Sure!\n```python\nprint(\"hello\")\n```\nEnjoy.");

    let replies = h.send(&c, "filename: hello.py\nlanguage: python\nPrint hello world").await;

    assert_eq!(replies.len(), 1);
    match &replies[0] {
        Reply::File { name, content, .. } => {
            assert_eq!(name, "hello.py");
            assert_eq!(content, "print(\"hello\")");
        }
        other => panic!("expected file reply, got {other:?}"),
    }

    let requests = h.model.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "gpt-5");
    assert_eq!(requests[0].instructions, SYSTEM_INSTRUCTION);
    assert!(requests[0].input.starts_with("Language: python\n"));
    assert!(!requests[0].input.contains(BEGIN_BASE_MARKER));

    let files = h.conversation_files("42");
    assert_eq!(files.len(), 2);
    assert!(files.contains(&"latest-hello.py".to_string()));
    assert!(files.iter().any(|f| f.ends_with("-hello.py") && f != "latest-hello.py"));
    assert_eq!(
        std::fs::read_to_string(h.temp.path().join("42").join("latest-hello.py")).unwrap(),
        "print(\"hello\")"
    );
}

#[tokio::test]
async fn test_edit_hello_py_reports_diff() {
    let h = Harness::new();
    let c = ConversationId::from(42);
    h.model.push("```python\nprint(\"hello\")\n```");
    h.model.push("```python\nprint(\"hello\")\nprint(\"goodbye\")\n```");

    h.send(&c, "filename: hello.py\nlanguage: python\nPrint hello world").await;
    h.send(&c, "/file hello.py").await;
    let replies = h.send(&c, "Add a second print for goodbye").await;

    let prompt = &h.model.requests()[1].input;
    let begin = prompt
        .find("<<BEGIN_BASE_CODE filename=hello.py version=latest>>")
        .expect("begin marker");
    let end = prompt.find(END_BASE_MARKER).expect("end marker");
    assert!(begin < end);
    assert!(prompt[begin..end].contains("```python\nprint(\"hello\")\n```"));

    assert_eq!(replies.len(), 2);
    match &replies[0] {
        Reply::File { name, content, caption } => {
            assert_eq!(name, "hello.py");
            assert_eq!(content, "print(\"hello\")\nprint(\"goodbye\")");
            assert_eq!(caption.as_deref(), Some("✅ Done (+1 -0)"));
        }
        other => panic!("expected file reply, got {other:?}"),
    }
    assert_eq!(
        replies[1].as_text(),
        Some("Changes:\n--- before.py\n+++ after.py\n@@ -1 +1,2 @@\n print(\"hello\")\n+print(\"goodbye\")")
    );

    let versions = h
        .service
        .generator()
        .store()
        .history(&c, "hello.py")
        .await
        .unwrap();
    assert_eq!(versions.len(), 2);
    assert!(versions[0].stamp < versions[1].stamp);
}

#[tokio::test]
async fn test_header_filename_is_not_sticky() {
    let h = Harness::new();
    let c = ConversationId::from(42);
    h.model.push("```python\nprint(\"hello\")\n```");
    h.model.push("```python\nprint(1)\n```");

    h.send(&c, "filename: hello.py\nPrint hello world").await;
    let replies = h.send(&c, "Print one").await;

    match &replies[0] {
        Reply::File { name, .. } => assert_eq!(name, "code.py"),
        other => panic!("expected file reply, got {other:?}"),
    }
    assert!(!h.model.requests()[1].input.contains(BEGIN_BASE_MARKER));
}

// ============================================================================
// Failures and isolation
// ============================================================================

#[tokio::test]
async fn test_empty_model_output_keeps_latest() {
    let h = Harness::new();
    let c = ConversationId::from(42);
    h.model.push("```python\nx = 1\n```");
    h.model.push("I cannot help with that.\n```\n```");

    h.send(&c, "filename: x.py\nSet x").await;
    h.send(&c, "/file x.py").await;
    let replies = h.send(&c, "Break it").await;

    assert_eq!(replies, vec![Reply::text("Generation failed: Model returned an empty artifact.")]);
    assert_eq!(
        std::fs::read_to_string(h.temp.path().join("42").join("latest-x.py")).unwrap(),
        "x = 1"
    );
}

#[tokio::test]
async fn test_conversations_do_not_share_state() {
    let h = Harness::new();
    let a = ConversationId::from(1);
    let b = ConversationId::from(2);
    h.model.push("```python\na = 1\n```");
    h.model.push("```python\nb = 1\n```");

    h.send(&a, "/model gpt-5-mini").await;
    h.send(&a, "/file shared.py").await;
    h.send(&a, "make a").await;
    h.send(&b, "filename: shared.py\nmake b").await;

    let requests = h.model.requests();
    assert_eq!(requests[0].model, "gpt-5-mini");
    assert_eq!(requests[1].model, "gpt-5");
    // b has no history of its own, so no base is embedded
    assert!(!requests[1].input.contains(BEGIN_BASE_MARKER));

    assert_eq!(
        std::fs::read_to_string(h.temp.path().join("1").join("latest-shared.py")).unwrap(),
        "a = 1"
    );
    assert_eq!(
        std::fs::read_to_string(h.temp.path().join("2").join("latest-shared.py")).unwrap(),
        "b = 1"
    );
}

#[tokio::test]
async fn test_document_upload_with_embedded_base() {
    let h = Harness::new();
    let c = ConversationId::from(9);
    h.model.push("```rust\nfn main() { println!(\"hi\"); }\n```");

    let prompt = "filename: src/main.rs\nlanguage: rust\nMake it print hi\n```rust\nfn main() {}\n```";
    let replies = h
        .service
        .handle(&c, Inbound::document("request.txt", prompt.as_bytes().to_vec()))
        .await;

    assert_eq!(replies.len(), 2);
    match &replies[0] {
        Reply::File { name, .. } => assert_eq!(name, "main.rs"),
        other => panic!("expected file reply, got {other:?}"),
    }
    let diff = replies[1].as_text().unwrap();
    assert!(diff.contains("--- before.rs\n+++ after.rs\n"));
    assert!(diff.contains("-fn main() {}"));
    assert!(h.model.requests()[0].input.contains("<<BEGIN_BASE_CODE filename=main.rs version=latest>>"));
}
