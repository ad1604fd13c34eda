//! Question and answer payloads.

use base64::Engine;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Body of `POST /nova_questao`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestionRequest {
    pub ano: u8,
    pub email_responsavel: String,
}

/// A multiple-choice question.
///
/// `options` is kept as raw JSON: the generator emits either a list of
/// labelled strings or a letter → text map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub options: Value,
    pub answer: String,
    #[serde(default)]
    pub disponivel: Option<bool>,
    #[serde(default)]
    pub audio_path: Option<String>,
}

impl Question {
    /// Options as `(letter, text)` pairs in presentation order.
    pub fn option_entries(&self) -> Vec<(String, String)> {
        match &self.options {
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| (key.clone(), value_text(value)))
                .collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, value)| (option_letter(index), value_text(value)))
                .collect(),
            Value::Null => Vec::new(),
            other => vec![(option_letter(0), value_text(other))],
        }
    }

    /// Backend audio path with placeholder values filtered out.
    pub fn narration_path(&self) -> Option<&str> {
        self.audio_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty() && path.ends_with(".mp3"))
    }
}

fn option_letter(index: usize) -> String {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i).to_string())
        .unwrap_or_else(|| (index + 1).to_string())
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Body of `POST /responder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub id: i64,
    pub resposta: String,
    pub email_responsavel: String,
}

/// Grading result of `POST /responder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub correta: bool,
    pub feedback: String,
    /// Base64 MP3 of the narrated feedback; empty when generation failed.
    #[serde(default)]
    pub audio: String,
    #[serde(default)]
    pub saved: bool,
}

impl AnswerResult {
    /// Decode the narrated feedback clip, if any.
    pub fn audio_bytes(&self) -> Result<Option<Vec<u8>>, ApiError> {
        let encoded = self.audio.trim();
        if encoded.is_empty() {
            return Ok(None);
        }
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map(Some)
            .map_err(|e| ApiError::Decoding(format!("feedback audio is not valid base64: {e}")))
    }
}

/// Response of `GET /questoes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionsPage {
    pub questions: Vec<StoredQuestion>,
}

/// A question as stored by the backend, including its target grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQuestion {
    pub id: i64,
    pub question: String,
    pub options: Value,
    pub answer: String,
    #[serde(default)]
    pub ano_ideal: Option<u8>,
    #[serde(default)]
    pub audio_path: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(options: Value) -> Question {
        Question {
            id: 1,
            question: "Qual letra começa LEÃO?".to_string(),
            options,
            answer: "B".to_string(),
            disponivel: Some(true),
            audio_path: None,
        }
    }

    #[test]
    fn list_options_get_sequential_letters() {
        let q = question(json!(["A) M", "B) L", "C) P"]));
        let entries = q.option_entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1], ("B".to_string(), "B) L".to_string()));
    }

    #[test]
    fn map_options_keep_their_keys() {
        let q = question(json!({"A": "M", "B": "L"}));
        assert_eq!(
            q.option_entries(),
            vec![
                ("A".to_string(), "M".to_string()),
                ("B".to_string(), "L".to_string())
            ]
        );
    }

    #[test]
    fn narration_path_ignores_placeholders() {
        let mut q = question(json!([]));
        q.audio_path = Some("Sem áudio".to_string());
        assert_eq!(q.narration_path(), None);
        q.audio_path = Some("audios/questao_7.mp3".to_string());
        assert_eq!(q.narration_path(), Some("audios/questao_7.mp3"));
    }

    #[test]
    fn feedback_audio_decodes_base64() {
        let result = AnswerResult {
            correta: true,
            feedback: "Muito bem!".to_string(),
            audio: "SUQz".to_string(),
            saved: true,
        };
        assert_eq!(result.audio_bytes().unwrap(), Some(b"ID3".to_vec()));
    }

    #[test]
    fn empty_feedback_audio_is_none_and_garbage_is_an_error() {
        let mut result = AnswerResult {
            correta: false,
            feedback: String::new(),
            audio: String::new(),
            saved: true,
        };
        assert_eq!(result.audio_bytes().unwrap(), None);
        result.audio = "***".to_string();
        assert!(matches!(result.audio_bytes(), Err(ApiError::Decoding(_))));
    }
}
