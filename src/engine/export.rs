//! Export and summarization
//!
//! The payload is a snapshot of the registry taken when export is requested,
//! so marks added or removed while a request is in flight do not change it.
//! Performing the request is left to a `Summarizer`; the engine only builds
//! the body and interprets the reply.

use crate::errors::ExportError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Sentence end followed by whitespace
static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\s+").expect("sentence break pattern is valid"));

/// Text handed to the summarization service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPayload {
    /// Annotation texts joined in creation order
    pub text: String,
    /// Number of annotations in the payload
    pub count: usize,
    pub endpoint: String,
}

impl ExportPayload {
    pub fn new(texts: &[String], separator: &str, endpoint: &str) -> Result<Self, ExportError> {
        let text = texts.join(separator);
        if text.is_empty() {
            return Err(ExportError::NothingMarked);
        }
        Ok(Self {
            text,
            count: texts.len(),
            endpoint: endpoint.to_string(),
        })
    }

    pub fn request(&self) -> SummaryRequest {
        SummaryRequest {
            html: self.text.clone(),
        }
    }
}

/// Body of the summarize request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub html: String,
}

impl SummaryRequest {
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    resumo_coeso: Option<String>,
}

/// A generated summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub text: String,
}

impl Summary {
    /// Parse the service's JSON reply
    pub fn from_response(body: &str) -> Result<Self, ExportError> {
        let response: SummaryResponse = serde_json::from_str(body)
            .map_err(|e| ExportError::MalformedResponse(e.to_string()))?;

        match response.resumo_coeso {
            Some(text) if !text.trim().is_empty() => Ok(Self { text }),
            _ => Err(ExportError::MalformedResponse(
                "missing resumo_coeso".to_string(),
            )),
        }
    }

    /// Split into display paragraphs after each sentence-ending period
    pub fn paragraphs(&self) -> Vec<String> {
        let mut paragraphs = Vec::new();
        let mut last = 0;
        for m in SENTENCE_BREAK.find_iter(&self.text) {
            paragraphs.push(self.text[last..m.start() + 1].trim().to_string());
            last = m.end();
        }
        paragraphs.push(self.text[last..].trim().to_string());
        paragraphs.retain(|p| !p.is_empty());
        paragraphs
    }
}

/// The external summarization service
pub trait Summarizer {
    fn summarize(&self, request: &SummaryRequest) -> Result<Summary, ExportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_joins_in_order() {
        let texts = vec!["fox".to_string(), "The".to_string()];
        let payload = ExportPayload::new(&texts, "\n", "http://localhost").unwrap();
        assert_eq!(payload.text, "fox\nThe");
        assert_eq!(payload.count, 2);
        assert_eq!(payload.request().to_json().unwrap(), r#"{"html":"fox\nThe"}"#);
    }

    #[test]
    fn test_empty_payload_is_nothing_marked() {
        let err = ExportPayload::new(&[], "\n", "http://localhost").unwrap_err();
        assert_eq!(err, ExportError::NothingMarked);
    }

    #[test]
    fn test_response_parsing() {
        let summary = Summary::from_response(r#"{"resumo_coeso":"One. Two."}"#).unwrap();
        assert_eq!(summary.text, "One. Two.");

        assert!(matches!(
            Summary::from_response(r#"{"resumo":"x"}"#),
            Err(ExportError::MalformedResponse(_))
        ));
        assert!(matches!(
            Summary::from_response("<html>"),
            Err(ExportError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_paragraphs_split_after_periods() {
        let summary = Summary {
            text: "First sentence.  Second one.\nThird without end".to_string(),
        };
        assert_eq!(
            summary.paragraphs(),
            vec!["First sentence.", "Second one.", "Third without end"]
        );
    }

    #[test]
    fn test_paragraphs_keep_decimal_numbers() {
        let summary = Summary {
            text: "Costs rose 2.5 percent. Done.".to_string(),
        };
        assert_eq!(summary.paragraphs(), vec!["Costs rose 2.5 percent.", "Done."]);
    }
}
