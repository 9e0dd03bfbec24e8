use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, AniburnError};
use super::TranslationProvider;

const GOOGLE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
const MYMEMORY_ENDPOINT: &str = "https://api.mymemory.translated.net/get";

fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .expect("HTTP client creation should not fail")
}

/// Primary provider: the public Google translate web endpoint.
///
/// The response is a nested JSON array whose first element lists translated
/// chunks; the translation is the concatenation of each chunk's first field.
pub struct GoogleWebTranslator {
    client: Client,
}

impl GoogleWebTranslator {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
        }
    }
}

#[async_trait]
impl TranslationProvider for GoogleWebTranslator {
    fn name(&self) -> &'static str {
        "google-web"
    }

    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        debug!("Sending translation request to {}", GOOGLE_ENDPOINT);

        let response = self
            .client
            .get(GOOGLE_ENDPOINT)
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| AniburnError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AniburnError::Translation(format!(
                "Google web endpoint returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AniburnError::Translation(format!("Failed to parse response: {}", e)))?;

        let chunks = body
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| AniburnError::Translation("Unexpected response shape".to_string()))?;

        let translated: String = chunks
            .iter()
            .filter_map(|chunk| chunk.get(0).and_then(Value::as_str))
            .collect();

        if translated.is_empty() {
            return Err(AniburnError::Translation(
                "Empty translation received".to_string(),
            ));
        }

        Ok(translated)
    }
}

#[derive(Debug, Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseData")]
    response_data: MyMemoryData,
    #[serde(rename = "responseStatus")]
    response_status: Value,
}

#[derive(Debug, Deserialize)]
struct MyMemoryData {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Fallback provider: the MyMemory translation memory API.
pub struct MyMemoryTranslator {
    client: Client,
}

impl MyMemoryTranslator {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
        }
    }
}

#[async_trait]
impl TranslationProvider for MyMemoryTranslator {
    fn name(&self) -> &'static str {
        "mymemory"
    }

    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        debug!("Sending translation request to {}", MYMEMORY_ENDPOINT);

        let langpair = format!("{}|{}", source_lang, target_lang);
        let response = self
            .client
            .get(MYMEMORY_ENDPOINT)
            .query(&[("q", text), ("langpair", &langpair)])
            .send()
            .await
            .map_err(|e| AniburnError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AniburnError::Translation(format!(
                "MyMemory endpoint returned {}",
                response.status()
            )));
        }

        let body: MyMemoryResponse = response
            .json()
            .await
            .map_err(|e| AniburnError::Translation(format!("Failed to parse response: {}", e)))?;

        // The API reports errors with a 200 transport status and a non-200
        // body status, sometimes as a string.
        let ok = match &body.response_status {
            Value::Number(n) => n.as_i64() == Some(200),
            Value::String(s) => s == "200",
            _ => false,
        };
        if !ok {
            return Err(AniburnError::Translation(format!(
                "MyMemory error status: {}",
                body.response_status
            )));
        }

        let translated = body.response_data.translated_text.trim().to_string();
        if translated.is_empty() {
            return Err(AniburnError::Translation(
                "Empty translation received".to_string(),
            ));
        }

        Ok(translated)
    }
}
