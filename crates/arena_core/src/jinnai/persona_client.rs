//! Remote persona client for the hosted generative-language API.
//!
//! # Responsibility
//! - Build `generateContent` requests carrying the persona prompt and book context.
//! - Extract the single reply text from responses.
//! - Degrade every failure to a local canned reply.
//!
//! # Invariants
//! - Without a credential no request is sent.
//! - Public entry points return text, never errors.
//! - No retries; one request per call.

use crate::config::ArenaConfig;
use crate::jinnai::conversation::{ConversationTurn, TurnRole};
use crate::model::book::Book;
use log::{error, warn};
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default `generateContent` endpoint.
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-preview-05-20:generateContent";

/// Fixed character prompt sent as the system instruction.
pub const PERSONA_SYSTEM_PROMPT: &str = "あなたは「陣内」という名前の読書メンターです。

性格: 厳しいが愛のある先輩。悪魔の代弁者(Devil's Advocate)として、ユーザーの考えに挑戦し、深く考えさせる。

口調: タメ口で「俺/お前」を使う。簡潔で鋭い。

役割:
- ユーザーの考えの矛盾や弱点を指摘する
- 抽象的な考えには具体的な行動を要求する
- 一見関係なさそうな分野と結びつけ、新しい視点を提供する
- 厳しいが、ユーザーの成長を心から願っている

回答は短く（1-3文）、鋭く、挑発的に。長々とした説明は不要。";

/// Reply used when no credential is configured.
pub const MISSING_CREDENTIAL_REPLY: &str = "API keyが設定されてないな。環境変数GEMINI_API_KEYを設定しろ。それまではこういう手抜き返答で我慢しろ。";

pub const ANALYSIS_UNAVAILABLE_REPLY: &str =
    "API keyが設定されていないか、本が少なすぎるぜ。もっと読め。";
pub const ANALYSIS_EMPTY_REPLY: &str = "おい、APIが黙りやがった。もう一回試せ。";
pub const ANALYSIS_FAILED_REPLY: &str = "API呼び出しでエラーだ。ネット環境か、APIキーを確認しろ。";

const NOTES_CONTEXT_CHARS: usize = 500;
const MAX_CONTEXT_INSIGHTS: usize = 3;
const MAX_HISTORY_TURNS: usize = 10;
const TEMPERATURE: f32 = 0.9;
const CHAT_MAX_OUTPUT_TOKENS: u32 = 200;
const ANALYSIS_MAX_OUTPUT_TOKENS: u32 = 300;

const FALLBACK_RULES: &[(&[&str], &str)] = &[
    (&["計画", "予定"], "で、いつやるんだ？具体的な日付を決めろ。"),
    (
        &["重要", "大切"],
        "なぜそれが重要なんだ？お前の都合のいい解釈じゃないのか？",
    ),
    (
        &["成長", "学び"],
        "学んだだけで満足か？行動に移さなきゃ意味ないぞ。",
    ),
    (
        &["難しい", "困難"],
        "難しいって言い訳だろ。何が具体的に難しいんだ？分解して考えろ。",
    ),
];

/// Failure modes of one remote call.
#[derive(Debug)]
pub enum PersonaError {
    /// Network or client-construction failure.
    Transport(reqwest::Error),
    /// Non-success HTTP status. `Display` omits the body.
    Status { code: u16, body: String },
    /// Response body is not JSON.
    Decode(serde_json::Error),
    /// Response carries no reply text.
    EmptyPayload,
}

impl Display for PersonaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "persona transport failed: {err}"),
            Self::Status { code, body } => {
                write!(f, "persona API error {code} (body_bytes={})", body.len())
            }
            Self::Decode(err) => write!(f, "persona response is not JSON: {err}"),
            Self::EmptyPayload => write!(f, "persona response has no text"),
        }
    }
}

impl Error for PersonaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Status { .. } | Self::EmptyPayload => None,
        }
    }
}

impl From<reqwest::Error> for PersonaError {
    /// Drops the request URL; it carries the API key as a query parameter.
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.without_url())
    }
}

impl From<serde_json::Error> for PersonaError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextPart {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub role: TurnRole,
    pub parts: Vec<TextPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<TextPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Body of one `generateContent` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub system_instruction: SystemInstruction,
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

impl GenerateRequest {
    fn new(contents: Vec<Content>, max_output_tokens: u32) -> Self {
        Self {
            system_instruction: SystemInstruction {
                parts: vec![TextPart {
                    text: PERSONA_SYSTEM_PROMPT.to_string(),
                }],
            },
            contents,
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens,
            },
        }
    }
}

/// HTTP seam; production uses [`ReqwestTransport`].
pub trait PersonaTransport {
    /// Sends one request and returns the decoded JSON body.
    fn send(
        &self,
        endpoint: &str,
        api_key: &str,
        request: &GenerateRequest,
    ) -> Result<Value, PersonaError>;
}

/// Blocking `reqwest` transport.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, PersonaError> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self { client })
    }
}

impl PersonaTransport for ReqwestTransport {
    fn send(
        &self,
        endpoint: &str,
        api_key: &str,
        request: &GenerateRequest,
    ) -> Result<Value, PersonaError> {
        let response = self
            .client
            .post(endpoint)
            .query(&[("key", api_key)])
            .json(request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(PersonaError::Status {
                code: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Context bundle accompanying one user utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonaContext {
    pub book_title: Option<String>,
    pub notes: Option<String>,
    pub insights: Vec<String>,
    pub history: Vec<ConversationTurn>,
}

impl PersonaContext {
    /// Builds context from the active book and prior turns.
    pub fn from_book(book: &Book, history: Vec<ConversationTurn>) -> Self {
        Self {
            book_title: Some(book.title.clone()),
            notes: Some(book.notes.clone()).filter(|notes| !notes.is_empty()),
            insights: book.insight_texts().map(str::to_string).collect(),
            history,
        }
    }
}

/// Persona client over an injectable transport.
pub struct PersonaClient<T: PersonaTransport> {
    transport: T,
    api_key: Option<String>,
    endpoint: String,
}

impl PersonaClient<ReqwestTransport> {
    /// Production client from resolved configuration.
    pub fn from_config(config: &ArenaConfig) -> Result<Self, PersonaError> {
        Ok(Self::new(
            ReqwestTransport::new()?,
            config.gemini_api_key.clone(),
            config.gemini_api_url.clone(),
        ))
    }
}

impl<T: PersonaTransport> PersonaClient<T> {
    pub fn new(transport: T, api_key: Option<String>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            endpoint: endpoint.into(),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a short persona reply to `user_message`.
    pub fn get_jinnai_response(&self, user_message: &str, context: &PersonaContext) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("event=persona_reply module=jinnai status=skipped reason=missing_credential");
            return MISSING_CREDENTIAL_REPLY.to_string();
        };

        let request = build_chat_request(user_message, context);
        match self.call(api_key, &request) {
            Ok(text) => text,
            Err(err) => {
                error!(
                    "event=persona_reply module=jinnai status=error error_code=remote_failed error={}",
                    err
                );
                fallback_reply(user_message).to_string()
            }
        }
    }

    /// Asks the remote model for patterns across books' insights.
    pub fn analyze_books(&self, books: &[Book]) -> String {
        let with_insights: Vec<&Book> = books
            .iter()
            .filter(|book| !book.insights.is_empty())
            .collect();
        let Some(api_key) = self.api_key.as_deref() else {
            return ANALYSIS_UNAVAILABLE_REPLY.to_string();
        };
        if with_insights.len() < 2 {
            return ANALYSIS_UNAVAILABLE_REPLY.to_string();
        }

        let request = build_analysis_request(&with_insights);
        match self.call(api_key, &request) {
            Ok(text) => text,
            Err(PersonaError::EmptyPayload) => ANALYSIS_EMPTY_REPLY.to_string(),
            Err(err) => {
                error!(
                    "event=persona_analyze module=jinnai status=error error_code=remote_failed error={}",
                    err
                );
                ANALYSIS_FAILED_REPLY.to_string()
            }
        }
    }

    fn call(&self, api_key: &str, request: &GenerateRequest) -> Result<String, PersonaError> {
        let body = self.transport.send(&self.endpoint, api_key, request)?;
        extract_reply_text(&body).ok_or(PersonaError::EmptyPayload)
    }
}

/// Builds the chat request: last turns plus the augmented user turn.
pub fn build_chat_request(user_message: &str, context: &PersonaContext) -> GenerateRequest {
    let mut context_text = String::new();
    if let Some(title) = context.book_title.as_deref() {
        context_text.push_str(&format!("\n\n【読んでいる本】{title}"));
    }
    if let Some(notes) = context.notes.as_deref().filter(|notes| !notes.is_empty()) {
        let truncated: String = notes.chars().take(NOTES_CONTEXT_CHARS).collect();
        context_text.push_str(&format!("\n\n【ユーザーのメモ】\n{truncated}"));
    }
    if !context.insights.is_empty() {
        let insights = context
            .insights
            .iter()
            .take(MAX_CONTEXT_INSIGHTS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        context_text.push_str(&format!("\n\n【気づき】\n{insights}"));
    }

    let skip = context.history.len().saturating_sub(MAX_HISTORY_TURNS);
    let mut contents: Vec<Content> = context
        .history
        .iter()
        .skip(skip)
        .map(|turn| text_content(turn.role, turn.text.clone()))
        .collect();
    contents.push(text_content(
        TurnRole::User,
        format!("{user_message}{context_text}"),
    ));

    GenerateRequest::new(contents, CHAT_MAX_OUTPUT_TOKENS)
}

fn build_analysis_request(books: &[&Book]) -> GenerateRequest {
    let digest = books
        .iter()
        .map(|book| {
            let insights = book
                .insight_texts()
                .take(MAX_CONTEXT_INSIGHTS)
                .collect::<Vec<_>>()
                .join("\n");
            format!("【{}】\n{}", book.title, insights)
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    let prompt = format!(
        "以下は複数の本から得た気づきだ。共通点、矛盾、パターンを見つけて、鋭く指摘しろ。\n\n{digest}"
    );
    GenerateRequest::new(
        vec![text_content(TurnRole::User, prompt)],
        ANALYSIS_MAX_OUTPUT_TOKENS,
    )
}

fn text_content(role: TurnRole, text: String) -> Content {
    Content {
        role,
        parts: vec![TextPart { text }],
    }
}

/// Reads `candidates[0].content.parts[0].text`; empty text counts as absent.
pub fn extract_reply_text(body: &Value) -> Option<String> {
    body.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Local reply chosen by trigger phrases, used when the remote call fails.
pub fn fallback_reply(user_message: &str) -> &'static str {
    let folded = user_message.to_lowercase();
    FALLBACK_RULES
        .iter()
        .find(|(triggers, _)| triggers.iter().any(|trigger| folded.contains(trigger)))
        .map(|(_, reply)| *reply)
        .unwrap_or(MISSING_CREDENTIAL_REPLY)
}
