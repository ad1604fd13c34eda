//! Child registration payloads.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Body of `POST /register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub nome: String,
    pub ano: u8,
    pub email_responsavel: String,
}

/// A registered child as echoed back by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub id: i64,
    pub nome: String,
    pub ano: u8,
    pub email_responsavel: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Response of `POST /register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub ok: bool,
    #[serde(default)]
    pub child: Option<Child>,
}

/// Response of `GET /criancas`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildrenPage {
    pub children: Vec<Child>,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}
