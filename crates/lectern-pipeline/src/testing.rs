//! Scripted stand-in for the generative service, used across pipeline tests.

use async_trait::async_trait;
use lectern_gemini::{FileHandle, GeminiError, GeminiResult, GenerativeModel, Part};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

/// Calls observed by the double, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Upload(String),
    Generate,
    GenerateStructured,
}

/// Replays queued replies to generate calls and records every call made.
///
/// Uploads always succeed and never consume a reply; generate calls pop the
/// queue front. Running out of replies yields an error, which keeps a test
/// that scripts too little from hanging on plausible data.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<GeminiResult<String>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply.
    pub fn push_text(&self, text: &str) {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
    }

    /// Queue a failed reply.
    pub fn push_failure(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(GeminiError::ApiError {
                status: 503,
                message: message.to_string(),
            }));
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_reply(&self) -> GeminiResult<String> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GeminiError::EmptyResponse))
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn upload(&self, path: &Path) -> GeminiResult<FileHandle> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        self.record(Call::Upload(name.clone()));
        Ok(FileHandle {
            uri: format!("files/{}", name),
            mime_type: "text/plain".to_string(),
        })
    }

    async fn generate(&self, _model: &str, _parts: &[Part]) -> GeminiResult<String> {
        self.record(Call::Generate);
        self.next_reply()
    }

    async fn generate_structured(
        &self,
        _model: &str,
        _parts: &[Part],
        _schema: &serde_json::Value,
    ) -> GeminiResult<String> {
        self.record(Call::GenerateStructured);
        self.next_reply()
    }
}
