//! One async function per backend capability.
//!
//! Each builds the multipart body for its request record and hands it to the
//! [`ApiClient`]. Errors come back already normalized.

use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;
use crate::types::{
    CompareTextsRequest, DocumentInput, EntitiesRequest, FileUpload, HealthResponse,
    KeywordsRequest, MarkdownResponse, QuestionRequest, SummarizeRequest, SummarizeResponse,
    TextToBulletsRequest, TopicModelingRequest,
};
use reqwest::multipart::{Form, Part};
use std::time::Duration;

/// Summarizing long documents can take minutes on the backend
pub const SUMMARIZE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

pub const PATH_HEALTH: &str = "/";
pub const PATH_SUMMARIZE: &str = "/api/summarize";
pub const PATH_KEYWORDS: &str = "/api/extract-keywords";
pub const PATH_ENTITIES: &str = "/api/extract-entities";
pub const PATH_COMPARE: &str = "/api/compare-texts";
pub const PATH_QUESTION: &str = "/api/question";
pub const PATH_TOPICS: &str = "/api/topic-modeling";
pub const PATH_BULLETS: &str = "/api/text-to-bullets";

fn file_part(file: &FileUpload) -> Result<Part, ApiError> {
    Part::bytes(file.bytes.clone())
        .file_name(file.filename.clone())
        .mime_str(file.mime_type())
        .map_err(|e| ApiError::from_transport(&e))
}

fn with_input(form: Form, input: &DocumentInput) -> Result<Form, ApiError> {
    Ok(match input {
        DocumentInput::Text(text) => form.text("text", text.clone()),
        DocumentInput::File(file) => form.part("file", file_part(file)?),
    })
}

/// `GET /`
pub async fn health_check(client: &ApiClient) -> Result<HealthResponse, ApiError> {
    client.get_json(PATH_HEALTH).await
}

/// `POST /api/summarize` with the extended timeout
pub async fn summarize_document(
    client: &ApiClient,
    request: &SummarizeRequest,
) -> Result<SummarizeResponse, ApiError> {
    let form = Form::new()
        .part("file", file_part(&request.file)?)
        .text("summary_type", request.summary_type.as_str())
        .text("max_tokens", request.max_tokens.to_string());

    client
        .post_form(
            PATH_SUMMARIZE,
            form,
            RequestOptions::with_timeout(SUMMARIZE_TIMEOUT),
        )
        .await
}

/// `POST /api/extract-keywords`
pub async fn extract_keywords(
    client: &ApiClient,
    request: &KeywordsRequest,
) -> Result<MarkdownResponse, ApiError> {
    let form = with_input(Form::new(), &request.input)?;
    client
        .post_form(PATH_KEYWORDS, form, RequestOptions::default())
        .await
}

/// `POST /api/extract-entities`
pub async fn extract_entities(
    client: &ApiClient,
    request: &EntitiesRequest,
) -> Result<MarkdownResponse, ApiError> {
    let form = with_input(Form::new(), &request.input)?;
    client
        .post_form(PATH_ENTITIES, form, RequestOptions::default())
        .await
}

/// `POST /api/compare-texts`, one `texts` field per entry
pub async fn compare_texts(
    client: &ApiClient,
    request: &CompareTextsRequest,
) -> Result<MarkdownResponse, ApiError> {
    let form = request
        .texts
        .iter()
        .fold(Form::new(), |form, text| form.text("texts", text.clone()));
    client
        .post_form(PATH_COMPARE, form, RequestOptions::default())
        .await
}

/// `POST /api/question`
pub async fn ask_question(
    client: &ApiClient,
    request: &QuestionRequest,
) -> Result<MarkdownResponse, ApiError> {
    let form = with_input(Form::new(), &request.input)?.text("question", request.question.clone());
    client
        .post_form(PATH_QUESTION, form, RequestOptions::default())
        .await
}

/// `POST /api/topic-modeling`
pub async fn analyze_topics(
    client: &ApiClient,
    request: &TopicModelingRequest,
) -> Result<MarkdownResponse, ApiError> {
    let form = with_input(Form::new(), &request.input)?
        .text("num_topics", request.num_topics.to_string());
    client
        .post_form(PATH_TOPICS, form, RequestOptions::default())
        .await
}

/// `POST /api/text-to-bullets`
pub async fn text_to_bullets(
    client: &ApiClient,
    request: &TextToBulletsRequest,
) -> Result<MarkdownResponse, ApiError> {
    let form = with_input(Form::new(), &request.input)?;
    client
        .post_form(PATH_BULLETS, form, RequestOptions::default())
        .await
}
