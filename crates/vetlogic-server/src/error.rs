//! Error types for the proxy API.
//!
//! [`ServerError`] converts into an Axum response whose body is
//! `{"error": ..., "message": ...}`. The `error` string is the
//! player-facing summary; `message` carries the underlying cause when
//! there is one.
//!
//! Game actions map [`SessionError`] onto statuses: a concurrent request
//! is 409, a rule rejection is 409 (or 404 for an unknown id), a missing
//! activity is 400.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use vetlogic_core::{CollabError, SessionError};
use vetlogic_engine::EngineError;

/// Errors returned by the proxy endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A required field was missing or malformed.
    #[error("{0}")]
    BadRequest(String),

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A collaborator call failed.
    #[error("{summary}: {source}")]
    Collaborator {
        /// Player-facing summary of the failed operation.
        summary: &'static str,
        /// The collaborator failure.
        source: CollabError,
    },

    /// A game action was rejected or failed.
    #[error(transparent)]
    Game(#[from] SessionError),
}

/// Player-facing summary of a game action failure.
const fn game_summary(err: &SessionError) -> &'static str {
    match err {
        SessionError::Busy => "操作进行中，请稍候",
        SessionError::NoActiveCase => "没有进行中的病例",
        SessionError::NoActiveExam => "没有进行中的考试",
        SessionError::NoActiveQualification => "没有进行中的资格考试",
        SessionError::NoQuestions => "暂无可用题目",
        SessionError::EmptySubmission => "缺少参数: diagnosis, plan",
        SessionError::QuestionIndex { .. } => "题号无效",
        SessionError::Rule(rule) => match rule {
            EngineError::InsufficientEnergy { .. } => "精力不足",
            EngineError::InsufficientFunds { .. } => "资金不足",
            EngineError::UnknownEquipment(_) => "设备不存在",
            EngineError::AlreadyOwned(_) => "设备已拥有",
            EngineError::UnknownTalent(_) => "天赋不存在",
            EngineError::TalentLocked { .. } => "天赋无法解锁",
            EngineError::NotEligible(_) => "尚未达到晋升条件",
            EngineError::AnswerCountMismatch { .. } => "答案数量与题目不符",
            _ => "游戏规则错误",
        },
        SessionError::Collaborator(_) => "AI 服务调用失败",
    }
}

const fn game_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::Busy
        | SessionError::Rule(
            EngineError::InsufficientEnergy { .. }
            | EngineError::InsufficientFunds { .. }
            | EngineError::AlreadyOwned(_)
            | EngineError::TalentLocked { .. }
            | EngineError::NotEligible(_),
        ) => StatusCode::CONFLICT,
        SessionError::NoActiveCase
        | SessionError::NoActiveExam
        | SessionError::NoActiveQualification
        | SessionError::EmptySubmission
        | SessionError::QuestionIndex { .. }
        | SessionError::Rule(EngineError::AnswerCountMismatch { .. }) => StatusCode::BAD_REQUEST,
        SessionError::Rule(EngineError::UnknownEquipment(_) | EngineError::UnknownTalent(_)) => {
            StatusCode::NOT_FOUND
        }
        SessionError::NoQuestions => StatusCode::SERVICE_UNAVAILABLE,
        SessionError::Rule(_) | SessionError::Collaborator(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl ServerError {
    /// Wrap a collaborator failure under `summary`.
    pub const fn collaborator(summary: &'static str, source: CollabError) -> Self {
        Self::Collaborator { summary, source }
    }

    /// A 400 naming the missing request fields.
    pub fn missing(fields: &str) -> Self {
        Self::BadRequest(format!("缺少参数: {fields}"))
    }

    /// The HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Collaborator { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Game(err) => game_status(err),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("请求体无效: {}", rejection.body_text()))
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::BadRequest(msg) | Self::NotFound(msg) => serde_json::json!({
                "error": msg,
            }),
            Self::Collaborator { summary, source } => {
                tracing::error!(error = %source, "{summary}");
                serde_json::json!({
                    "error": summary,
                    "message": source.to_string(),
                })
            }
            Self::Game(err) => {
                if status.is_server_error() {
                    tracing::error!(error = %err, "game action failed");
                } else {
                    tracing::debug!(error = %err, "game action rejected");
                }
                serde_json::json!({
                    "error": game_summary(err),
                    "message": err.to_string(),
                })
            }
        };
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(
            ServerError::BadRequest(String::new()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::NotFound(String::new()).status(),
            StatusCode::NOT_FOUND
        );
        let err = ServerError::collaborator("病例生成失败", CollabError::Unauthorized);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "病例生成失败: API key is invalid");
        assert_eq!(ServerError::missing("rank").to_string(), "缺少参数: rank");
    }

    #[test]
    fn game_errors_map_to_statuses() {
        let status = |err: SessionError| ServerError::from(err).status();
        assert_eq!(status(SessionError::Busy), StatusCode::CONFLICT);
        assert_eq!(status(SessionError::NoActiveExam), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(EngineError::InsufficientEnergy {
                required: 15,
                available: 3
            }
            .into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(EngineError::UnknownTalent("nope".to_owned()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(CollabError::Unauthorized.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(game_summary(&SessionError::NoQuestions), "暂无可用题目");
    }
}
