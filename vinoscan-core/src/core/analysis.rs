//! Label analysis: one image in, structured wine attributes out.
//!
//! The catalog only ever sees the [`LabelAnalyzer`] trait, so workflows are
//! testable without a network. [`GeminiAnalyzer`] is the production
//! implementation over the Gemini `generateContent` REST endpoint.

use crate::{AiWineResponse, WineType};
use serde::{Deserialize, Serialize};

/// Model used for label extraction.
const GEMINI_MODEL: &str = "gemini-3-flash-preview";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const PROMPT: &str = "Analyze this wine label. Extract the following information in JSON \
format: name of the wine, the maker/winery, the vintage year, the type (categorize as \
exactly one of: Red, White, Rosé, Champagne/Sparkling, or Other), and a brief professional \
tasting description.";

/// Classified failure modes of a label analysis call. Each maps to a
/// distinct user-facing message via [`user_message`](AnalysisError::user_message).
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("API key is not configured")]
    MissingApiKey,

    #[error("network failure: {0}")]
    Network(String),

    #[error("provider returned an empty response")]
    EmptyResponse,

    #[error("could not parse provider response: {0}")]
    MalformedResponse(String),

    #[error("provider error: {0}")]
    Provider(String),
}

impl AnalysisError {
    /// The message shown to the user under the "Analysis Failed" title.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingApiKey => {
                "Missing Gemini API key. Please ensure the environment is configured correctly."
                    .to_string()
            }
            Self::Network(_) => {
                "Network error: Could not reach the AI service. Please check your internet connection."
                    .to_string()
            }
            Self::EmptyResponse => {
                "The AI returned an empty response. The label might be too blurry or not visible."
                    .to_string()
            }
            Self::MalformedResponse(_) => {
                "Failed to process the AI response. Try taking a clearer photo.".to_string()
            }
            Self::Provider(msg) => {
                if msg.is_empty() {
                    "An unexpected error occurred during wine label analysis.".to_string()
                } else {
                    msg.clone()
                }
            }
        }
    }
}

/// The external analysis boundary: send one encoded image, receive
/// structured attributes or a classified failure. Stateless per call.
pub trait LabelAnalyzer {
    /// Analyzes a single label image, given as a base64 data URL (or bare
    /// base64 payload).
    fn analyze(&self, image: &str) -> Result<AiWineResponse, AnalysisError>;
}

/// Production analyzer backed by the Gemini API.
///
/// Uses a blocking HTTP client; the surrounding workflow allows only one
/// analysis in flight at a time. No request timeout is configured, so a
/// hung call blocks until the transport gives up.
pub struct GeminiAnalyzer {
    api_key: String,
    client: reqwest::blocking::Client,
}

impl GeminiAnalyzer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Reads the key from `GEMINI_API_KEY`, falling back to `API_KEY`. A
    /// missing key is not an error until [`analyze`](LabelAnalyzer::analyze)
    /// is called.
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .unwrap_or_default();
        Self::new(api_key)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Attribute payload as the provider returns it, before coercion. All
/// fields optional; the schema asks for them but the provider may omit.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAttributes {
    #[serde(default)]
    name: String,
    #[serde(default)]
    maker: String,
    #[serde(default)]
    year: String,
    #[serde(rename = "type", default)]
    wine_type: String,
    #[serde(default)]
    description: String,
}

/// Applies the safe placeholder defaults: unknown fields become
/// "Unknown Wine" / "Unknown Maker" / "N/V", and a type outside the closed
/// set is coerced to `Other`.
fn coerce(raw: RawAttributes) -> AiWineResponse {
    AiWineResponse {
        name: non_empty_or(raw.name, "Unknown Wine"),
        maker: non_empty_or(raw.maker, "Unknown Maker"),
        year: non_empty_or(raw.year, "N/V"),
        wine_type: WineType::parse(&raw.wine_type).unwrap_or(WineType::Other),
        description: raw.description,
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "maker": { "type": "STRING" },
            "year": { "type": "STRING" },
            "type": {
                "type": "STRING",
                "description": "Must be one of: Red, White, Rosé, Champagne/Sparkling, Other"
            },
            "description": { "type": "STRING" }
        },
        "required": ["name", "maker", "year", "type", "description"]
    })
}

fn classify_transport(e: reqwest::Error) -> AnalysisError {
    if e.is_connect() || e.is_timeout() {
        AnalysisError::Network(e.to_string())
    } else {
        AnalysisError::Provider(e.to_string())
    }
}

impl LabelAnalyzer for GeminiAnalyzer {
    fn analyze(&self, image: &str) -> Result<AiWineResponse, AnalysisError> {
        if self.api_key.is_empty() {
            return Err(AnalysisError::MissingApiKey);
        }

        // Accept full data URLs and bare base64 payloads alike.
        let payload = image.split_once(',').map_or(image, |(_, rest)| rest);

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart {
                        text: Some(PROMPT.to_string()),
                        inline_data: None,
                    },
                    RequestPart {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: "image/jpeg".to_string(),
                            data: payload.to_string(),
                        }),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        };

        let url = format!("{GEMINI_ENDPOINT}/{GEMINI_MODEL}:generateContent");
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Provider(format!(
                "AI service returned status {status}"
            )));
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .map(|p| p.text.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }

        let raw: RawAttributes = serde_json::from_str(&text)
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;
        Ok(coerce(raw))
    }
}
