//! Backend request and response payloads.

pub mod child;
pub mod grade;
pub mod question;
pub mod report;

pub use child::{Child, ChildrenPage, HealthStatus, RegisterRequest, RegisterResponse};
pub use grade::parse_grade;
pub use question::{
    AnswerRequest, AnswerResult, NewQuestionRequest, Question, QuestionsPage, StoredQuestion,
};
pub use report::{
    ChildInfo, FullReport, PendingReport, PerformanceSummary, Report, ResponseRecord,
    ResponsesPage, TemporalAnalysis,
};
