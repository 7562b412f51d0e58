//! AI transcription client for handwritten shift-count PDFs.
//!
//! One HTTP call per PDF; the reply is expected to be the date-keyed JSON
//! shape that `parsers::shift_counts` understands. Anything that goes wrong
//! on the way (HTTP failure, empty reply, unusable JSON) yields `Ok(None)`
//! so the driver can record the file for manual review and keep going.
//! Rate limiting between calls is the driver's job, not this client's.

use anyhow::{Context, Result, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use krume_core::ShiftReport;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;

use crate::parsers::shift_counts::parse_report_json;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const PROMPT: &str = r#"Extract the data from this German bakery shift report (Mengenliste) PDF and reply with JSON only.

The document has a header "Backtag [DAY] (für [DAY])" and a table with the
columns Mengenliste | Aktuelle Menge | Retoure | Ausverkauft/Notizen.

Rules:
- Extract product names exactly as written.
- Aktuelle Menge: whole integers only.
- Retoure: only clear integers; ignore -, 0, O, checkmarks and other symbols.
- Ausverkauft/Notizen: only times in HH:MM format, ignore other text.
- Skip unclear or illegible entries instead of guessing.
- Ignore the footer (weather, staff names).
- Use null for missing fields, never an empty string.
- Determine the sales date from the document, falling back to the filename date.

Reply with exactly this shape:
{
  "YYYY-MM-DD": {
    "production_day": "day named after Backtag",
    "sales_day": "day named after für",
    "articles": [
      {"article_name": "...", "stock": 0, "leftover": 0, "sold_out": "HH:MM"}
    ]
  }
}"#;

pub struct TranscriptionClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl TranscriptionClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Build a client from the `GEMINI_API_KEY` environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .context("GEMINI_API_KEY is not set; the transcription service needs it")?;
        Ok(Self::new(api_key))
    }

    /// Transcribe one count-sheet PDF into a shift report.
    ///
    /// `Ok(None)` means the service gave nothing usable for this file; only
    /// local problems (unreadable PDF) surface as errors.
    pub async fn transcribe_pdf(&self, path: &Path) -> Result<Option<ShiftReport>> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading PDF {}", path.display()))?;

        let reply = match self.generate(&bytes).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                warn!("empty transcription reply for {}", path.display());
                return Ok(None);
            }
            Err(err) => {
                warn!("transcription request for {} failed: {err:#}", path.display());
                return Ok(None);
            }
        };

        match parse_report_json(strip_fences(&reply)) {
            Ok(report) => {
                debug!("transcribed {} -> {}", path.display(), report.report_date);
                Ok(Some(report))
            }
            Err(err) => {
                warn!("unusable transcription for {}: {err:#}", path.display());
                Ok(None)
            }
        }
    }

    async fn generate(&self, pdf_bytes: &[u8]) -> Result<Option<String>> {
        let body = json!({
            "contents": [{
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": "application/pdf",
                            "data": BASE64.encode(pdf_bytes),
                        }
                    },
                    {"text": PROMPT},
                ]
            }]
        });

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.model, self.api_key
        );
        let resp = self.client.post(&url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            bail!("generateContent returned {status}: {detail}");
        }

        #[derive(Deserialize)]
        struct Resp {
            candidates: Option<Vec<Candidate>>,
        }
        #[derive(Deserialize)]
        struct Candidate {
            content: Option<Content>,
        }
        #[derive(Deserialize)]
        struct Content {
            parts: Option<Vec<Part>>,
        }
        #[derive(Deserialize)]
        struct Part {
            text: Option<String>,
        }

        let parsed: Resp = resp.json().await.context("decoding generateContent response")?;
        let text: String = parsed
            .candidates
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts.unwrap_or_default())
            .filter_map(|p| p.text)
            .collect();

        Ok(if text.trim().is_empty() { None } else { Some(text) })
    }
}

/// Models tend to wrap JSON in markdown fences; peel them off
fn strip_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_plain_text() {
        assert_eq!(strip_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_fences_json_fence() {
        assert_eq!(strip_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_fenced_reply_parses_as_report() {
        let reply = "```json\n{\"2024-04-11\": {\"production_day\": \"Do\", \"sales_day\": \"Do\", \"articles\": []}}\n```";
        let report = parse_report_json(strip_fences(reply)).unwrap();
        assert_eq!(report.production_day, "Do");
    }
}
