//! Feature hooks: per-capability `{result, is_loading, error}` state.
//!
//! A hook runs the minimal pre-flight guard, calls its endpoint and records
//! the outcome. State is published on a [`watch`] channel so any number of
//! views can follow it. Every hook can be reset from any state.

use crate::client::ApiClient;
use crate::endpoints;
use crate::error::ApiError;
use crate::types::{
    CompareTextsRequest, DocumentInput, EntitiesRequest, FileUpload, KeywordsRequest,
    QuestionRequest, SummarizeRequest, SummarizeResponse, SummaryType, TextToBulletsRequest,
    TopicModelingRequest, COMPARE_TEXTS_RANGE, DEFAULT_NUM_TOPICS,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

pub const MSG_NEED_INPUT: &str = "Provide text or a file";
pub const MSG_NEED_FILE: &str = "Select a file to summarize";
pub const MSG_NEED_QUESTION: &str = "Provide both the context and the question";
pub const MSG_COMPARE_TOO_FEW: &str = "Provide at least 2 texts to compare";
pub const MSG_COMPARE_TOO_MANY: &str = "Compare at most 5 texts";

/// What a hook does when triggered while its previous call is still in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// Calls overlap and whichever finishes last owns the state
    #[default]
    LastWriteWins,
    /// A trigger while loading fails with [`HookError::Busy`]
    Reject,
    /// Calls overlap but only the newest one may write; completions that
    /// were superseded by a newer trigger or a reset are dropped
    LatestOnly,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// Pre-flight guard failed; no request was made
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("a request is already in progress")]
    Busy,
}

/// Coarse view of a hook's state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HookState<T> {
    pub result: Option<T>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl<T> Default for HookState<T> {
    fn default() -> Self {
        Self {
            result: None,
            is_loading: false,
            error: None,
        }
    }
}

impl<T> HookState<T> {
    fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.is_loading, &self.result, &self.error) {
            (true, _, _) => Phase::Loading,
            (false, _, Some(_)) => Phase::Error,
            (false, Some(_), None) => Phase::Success,
            (false, None, None) => Phase::Idle,
        }
    }
}

/// State container shared by all capability hooks.
pub struct Hook<T> {
    state: watch::Sender<HookState<T>>,
    policy: OverlapPolicy,
    generation: AtomicU64,
    default_error: &'static str,
}

impl<T: Clone> Hook<T> {
    /// `default_error` is shown when the backend error carries no message
    pub fn new(policy: OverlapPolicy, default_error: &'static str) -> Self {
        let (state, _) = watch::channel(HookState::default());
        Self {
            state,
            policy,
            generation: AtomicU64::new(0),
            default_error,
        }
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// Snapshot of the current state
    pub fn state(&self) -> HookState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<HookState<T>> {
        self.state.subscribe()
    }

    /// Back to idle from any state
    pub fn reset(&self) {
        self.state.send_modify(|s| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *s = HookState::default();
        });
    }

    /// Record a failed pre-flight guard without touching the network
    pub fn fail_validation(&self, message: &str) -> HookError {
        debug!(reason = message, "pre-flight validation failed");
        self.state.send_modify(|s| {
            s.result = None;
            s.error = Some(message.to_string());
        });
        HookError::Validation(message.to_string())
    }

    /// Enter loading, await `call`, then store its result or error.
    pub async fn run<F, Fut>(&self, call: F) -> Result<T, HookError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let policy = self.policy;
        let mut generation = None;
        // Loading and the generation are taken together under the watch lock
        self.state.send_if_modified(|s| {
            if policy == OverlapPolicy::Reject && s.is_loading {
                return false;
            }
            *s = HookState::loading();
            generation = Some(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
            true
        });
        let Some(generation) = generation else {
            debug!("trigger ignored while loading");
            return Err(HookError::Busy);
        };

        let outcome = call().await;

        let next = match &outcome {
            Ok(value) => HookState {
                result: Some(value.clone()),
                is_loading: false,
                error: None,
            },
            Err(err) => HookState {
                result: None,
                is_loading: false,
                error: Some(err.message_or(self.default_error).to_string()),
            },
        };
        // Checked under the same lock a newer trigger or reset would take
        let published = self.state.send_if_modified(|s| {
            if policy == OverlapPolicy::LatestOnly
                && self.generation.load(Ordering::SeqCst) != generation
            {
                return false;
            }
            *s = next;
            true
        });
        if !published {
            debug!("dropping superseded result");
        }

        outcome.map_err(HookError::Api)
    }
}

macro_rules! capability_hook {
    ($(#[$meta:meta])* $name:ident, $result:ty, $default_error:expr) => {
        $(#[$meta])*
        pub struct $name {
            client: ApiClient,
            hook: Hook<$result>,
        }

        impl $name {
            pub fn new(client: ApiClient, policy: OverlapPolicy) -> Self {
                Self {
                    client,
                    hook: Hook::new(policy, $default_error),
                }
            }

            pub fn state(&self) -> HookState<$result> {
                self.hook.state()
            }

            pub fn subscribe(&self) -> watch::Receiver<HookState<$result>> {
                self.hook.subscribe()
            }

            pub fn reset(&self) {
                self.hook.reset()
            }
        }
    };
}

capability_hook!(
    /// Document summarization; keeps the whole structured response
    SummarizeHook,
    SummarizeResponse,
    "Failed to process the document"
);
capability_hook!(KeywordsHook, String, "Failed to extract keywords");
capability_hook!(EntitiesHook, String, "Failed to extract entities");
capability_hook!(CompareHook, String, "Failed to compare texts");
capability_hook!(QuestionHook, String, "Failed to answer the question");
capability_hook!(TopicsHook, String, "Failed to analyze topics");
capability_hook!(BulletsHook, String, "Failed to convert to bullets");

impl SummarizeHook {
    pub async fn summarize(
        &self,
        file: Option<FileUpload>,
        summary_type: SummaryType,
        max_tokens: u32,
    ) -> Result<SummarizeResponse, HookError> {
        let Some(file) = file else {
            return Err(self.hook.fail_validation(MSG_NEED_FILE));
        };
        let request = SummarizeRequest::new(file)
            .summary_type(summary_type)
            .max_tokens(max_tokens);
        self.hook
            .run(|| endpoints::summarize_document(&self.client, &request))
            .await
    }
}

impl KeywordsHook {
    pub async fn extract(
        &self,
        text: Option<String>,
        file: Option<FileUpload>,
    ) -> Result<String, HookError> {
        let Some(input) = DocumentInput::from_parts(text, file) else {
            return Err(self.hook.fail_validation(MSG_NEED_INPUT));
        };
        let request = KeywordsRequest { input };
        self.hook
            .run(|| async {
                endpoints::extract_keywords(&self.client, &request)
                    .await
                    .map(|r| r.result)
            })
            .await
    }
}

impl EntitiesHook {
    pub async fn extract(
        &self,
        text: Option<String>,
        file: Option<FileUpload>,
    ) -> Result<String, HookError> {
        let Some(input) = DocumentInput::from_parts(text, file) else {
            return Err(self.hook.fail_validation(MSG_NEED_INPUT));
        };
        let request = EntitiesRequest { input };
        self.hook
            .run(|| async {
                endpoints::extract_entities(&self.client, &request)
                    .await
                    .map(|r| r.result)
            })
            .await
    }
}

impl CompareHook {
    /// Blank entries are dropped before counting
    pub async fn compare(&self, texts: Vec<String>) -> Result<String, HookError> {
        let texts: Vec<String> = texts
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .collect();
        if texts.len() < *COMPARE_TEXTS_RANGE.start() {
            return Err(self.hook.fail_validation(MSG_COMPARE_TOO_FEW));
        }
        if texts.len() > *COMPARE_TEXTS_RANGE.end() {
            return Err(self.hook.fail_validation(MSG_COMPARE_TOO_MANY));
        }
        let request = CompareTextsRequest { texts };
        self.hook
            .run(|| async {
                endpoints::compare_texts(&self.client, &request)
                    .await
                    .map(|r| r.result)
            })
            .await
    }
}

impl QuestionHook {
    pub async fn ask(
        &self,
        text: Option<String>,
        file: Option<FileUpload>,
        question: &str,
    ) -> Result<String, HookError> {
        let input = DocumentInput::from_parts(text, file);
        let (Some(input), false) = (input, question.trim().is_empty()) else {
            return Err(self.hook.fail_validation(MSG_NEED_QUESTION));
        };
        let request = QuestionRequest {
            input,
            question: question.trim().to_string(),
        };
        self.hook
            .run(|| async {
                endpoints::ask_question(&self.client, &request)
                    .await
                    .map(|r| r.result)
            })
            .await
    }
}

impl TopicsHook {
    /// `num_topics` defaults to 3 and is clamped to 1..=10
    pub async fn analyze(
        &self,
        text: Option<String>,
        file: Option<FileUpload>,
        num_topics: Option<u32>,
    ) -> Result<String, HookError> {
        let Some(input) = DocumentInput::from_parts(text, file) else {
            return Err(self.hook.fail_validation(MSG_NEED_INPUT));
        };
        let request =
            TopicModelingRequest::new(input, num_topics.unwrap_or(DEFAULT_NUM_TOPICS));
        self.hook
            .run(|| async {
                endpoints::analyze_topics(&self.client, &request)
                    .await
                    .map(|r| r.result)
            })
            .await
    }
}

impl BulletsHook {
    pub async fn convert(
        &self,
        text: Option<String>,
        file: Option<FileUpload>,
    ) -> Result<String, HookError> {
        let Some(input) = DocumentInput::from_parts(text, file) else {
            return Err(self.hook.fail_validation(MSG_NEED_INPUT));
        };
        let request = TextToBulletsRequest { input };
        self.hook
            .run(|| async {
                endpoints::text_to_bullets(&self.client, &request)
                    .await
                    .map(|r| r.result)
            })
            .await
    }
}
