//! Typed wrappers over the backend routes.

use tracing::info;

use super::ApiClient;
use crate::error::ApiError;
use crate::types::{
    parse_grade, AnswerRequest, AnswerResult, ChildrenPage, HealthStatus, NewQuestionRequest,
    Question, QuestionsPage, RegisterRequest, RegisterResponse, Report, ResponsesPage,
};

impl ApiClient {
    /// Register (or update) a child.
    ///
    /// `grade_label` is free text from the UI, e.g. `"3º Ano"`; the numeric
    /// grade is derived from it and clamped to the configured maximum.
    pub async fn register_child(
        &self,
        nome: &str,
        grade_label: &str,
        email_responsavel: &str,
    ) -> Result<RegisterResponse, ApiError> {
        let request = RegisterRequest {
            nome: required("nome", nome)?,
            ano: parse_grade(grade_label, self.grade_max()),
            email_responsavel: required("email_responsavel", email_responsavel)?,
        };
        self.register(&request).await
    }

    /// `POST /register` with an already-built body.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        let response: RegisterResponse = self.post("/register", request).await?.decode("/register")?;
        info!(nome = %request.nome, ano = request.ano, ok = response.ok, "Child registered");
        Ok(response)
    }

    pub async fn request_new_question(
        &self,
        ano: u8,
        email_responsavel: &str,
    ) -> Result<Question, ApiError> {
        let request = NewQuestionRequest {
            ano,
            email_responsavel: required("email_responsavel", email_responsavel)?,
        };
        self.post("/nova_questao", &request)
            .await?
            .decode("/nova_questao")
    }

    pub async fn submit_answer(
        &self,
        question_id: i64,
        resposta: &str,
        email_responsavel: &str,
    ) -> Result<AnswerResult, ApiError> {
        let request = AnswerRequest {
            id: question_id,
            resposta: required("resposta", resposta)?,
            email_responsavel: required("email_responsavel", email_responsavel)?,
        };
        self.post("/responder", &request).await?.decode("/responder")
    }

    pub async fn get_report(&self, email_responsavel: &str) -> Result<Report, ApiError> {
        let email = required("email_responsavel", email_responsavel)?;
        self.get_segments(&["relatorio", email.as_str()])
            .await?
            .decode("/relatorio")
    }

    pub async fn get_responses(&self, email_responsavel: &str) -> Result<ResponsesPage, ApiError> {
        let email = required("email_responsavel", email_responsavel)?;
        self.get_segments(&["respostas", email.as_str()])
            .await?
            .decode("/respostas")
    }

    pub async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        self.get("/health").await?.decode("/health")
    }

    pub async fn list_children(&self) -> Result<ChildrenPage, ApiError> {
        self.get("/criancas").await?.decode("/criancas")
    }

    pub async fn list_questions(&self) -> Result<QuestionsPage, ApiError> {
        self.get("/questoes").await?.decode("/questoes")
    }
}

fn required(field: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidArgument(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}
