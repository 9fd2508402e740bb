//! Conversational assistant over patient snapshots.
//!
//! Mock mode produces a deterministic structured answer straight from
//! the snapshot. Ollama mode forwards the caller's prompt plus the
//! snapshot JSON to a local model; any generation failure falls back
//! to the mock answer so the endpoint still returns something useful.

mod ollama;

pub use ollama::OllamaClient;

use serde::Serialize;
use serde_json::{json, Value};

use crate::snapshot::{Row, Snapshot};

const SYSTEM_PROMPT: &str = "You are a clinical assistant. Use ONLY the provided patient \
snapshot to answer. If data is missing, say so and propose safe next steps.";

/// Ceiling for one local generation. Local models can take minutes on
/// modest hardware.
pub const DEFAULT_GENERATE_TIMEOUT_SECS: u64 = 300;

/// Errors from the LLM backend. These never escape the assistant:
/// generation failures degrade to the mock answer.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("cannot reach assistant backend at {0}")]
    Connection(String),
    #[error("assistant request timed out after {0}s")]
    Timeout(u64),
    #[error("assistant request failed: {0}")]
    Http(String),
    #[error("assistant backend returned {status}: {body}")]
    Generation { status: u16, body: String },
    #[error("assistant response parsing failed: {0}")]
    Decode(String),
}

/// Which path produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplyMode {
    Mock,
    Ollama,
    ErrorFallbackMock,
    MockDirect,
}

/// An assistant reply, always carrying the snapshot it was built from.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub mode: ReplyMode,
    pub answer: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub snapshot: Snapshot,
}

/// The configured assistant backend.
pub enum Assistant {
    Mock,
    Ollama { client: OllamaClient, model: String },
}

impl Assistant {
    /// Build the assistant from startup configuration. No Ollama URL
    /// means mock mode.
    pub fn from_config(
        ollama_base_url: Option<&str>,
        model: &str,
        timeout_secs: u64,
    ) -> Self {
        match ollama_base_url {
            Some(base_url) => Self::Ollama {
                client: OllamaClient::new(base_url, timeout_secs),
                model: model.to_string(),
            },
            None => Self::Mock,
        }
    }

    /// Answer a prompt against a snapshot using the configured
    /// backend.
    pub async fn answer(&self, prompt: &str, snapshot: Snapshot) -> ChatReply {
        match self {
            Self::Mock => ChatReply {
                mode: ReplyMode::Mock,
                answer: mock_answer(&snapshot),
                error: None,
                snapshot,
            },
            Self::Ollama { client, model } => {
                let full_prompt = build_prompt(prompt, &snapshot);
                match client.generate(model, &full_prompt, SYSTEM_PROMPT).await {
                    Ok(text) => ChatReply {
                        mode: ReplyMode::Ollama,
                        answer: Value::String(text),
                        error: None,
                        snapshot,
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "assistant generation failed, serving mock answer");
                        ChatReply {
                            mode: ReplyMode::ErrorFallbackMock,
                            answer: mock_answer(&snapshot),
                            error: Some(e.to_string()),
                            snapshot,
                        }
                    }
                }
            }
        }
    }

    /// The deterministic template answer, regardless of configured
    /// backend.
    pub fn mock_reply(&self, snapshot: Snapshot) -> ChatReply {
        ChatReply {
            mode: ReplyMode::MockDirect,
            answer: mock_answer(&snapshot),
            error: None,
            snapshot,
        }
    }
}

fn build_prompt(prompt: &str, snapshot: &Snapshot) -> String {
    let snapshot_json = serde_json::to_string(snapshot).unwrap_or_default();
    format!("User prompt: {prompt}\n\nPatient snapshot (JSON): {snapshot_json}\n")
}

/// Template answer built from the newest record in each category.
fn mock_answer(snapshot: &Snapshot) -> Value {
    let latest_history = snapshot.medical_history.first();
    let latest_diagnosis = snapshot.diagnoses.first();
    let latest_medication = snapshot.medications.first();
    let latest_lab = snapshot.labs.first();

    let recent_lab = match latest_lab {
        Some(lab) => json!({
            "test_type": field(lab, "test_type"),
            "result": field(lab, "result"),
            "date": field(lab, "test_date"),
        }),
        None => Value::Null,
    };

    json!({
        "summary": {
            "patient_id": snapshot.patient_id,
            "recent_condition": latest_history.map(|r| field(r, "condition")).unwrap_or(Value::Null),
            "recent_diagnosis": latest_diagnosis.map(|r| field(r, "diagnosis_description")).unwrap_or(Value::Null),
            "recent_medication": latest_medication.map(|r| field(r, "medicine_name")).unwrap_or(Value::Null),
            "recent_lab": recent_lab,
        },
        "clarifying_questions": [
            "When did the current symptoms start?",
            "Any allergies or recent medication changes?"
        ],
        "next_steps": [
            "Review vitals and recent labs",
            "Schedule follow-up if symptoms persist or worsen"
        ]
    })
}

fn field(row: &Row, name: &str) -> Value {
    row.get(name).cloned().unwrap_or(Value::Null)
}
