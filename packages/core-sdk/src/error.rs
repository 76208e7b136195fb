use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

pub const MESSAGE_MISSING: &str = "message fehlt/leer.";
pub const KEY_MISSING: &str = "OPENAI_API_KEY fehlt. Bitte in der Server-Umgebung setzen.";
pub const UPSTREAM_FAILED: &str = "Upstream-Fehler beim Sprachmodell.";
pub const NETWORK_FAILED: &str = "Sprachmodell nicht erreichbar.";
pub const BODY_REJECTED: &str = "Request-Body konnte nicht gelesen werden.";
pub const INTERNAL_FAILED: &str = "Interner Fehler in /api/chat";

/**
 * \brief 中继过程中可能出现的错误分类。
 */
#[derive(Debug, Error)]
pub enum RelayError {
    /** \brief 客户端输入缺失或非法，400 */
    #[error("validation error: {0}")]
    Validation(String),
    /** \brief 服务端未配置凭据，500 */
    #[error("configuration error: {0}")]
    Configuration(String),
    /** \brief Provider 返回非 2xx，502 */
    #[error("upstream returned {status}: {detail}")]
    Upstream { status: u16, detail: String },
    /** \brief 请求体无法读取（如超出上限），沿用对应状态码 */
    #[error("request body rejected ({status}): {message}")]
    Body { status: u16, message: String },
    /** \brief 连接失败或超时，502 */
    #[error("network error: {0}")]
    Network(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            RelayError::Configuration(_) | RelayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::Upstream { .. } | RelayError::Network(_) => StatusCode::BAD_GATEWAY,
            RelayError::Body { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
        }
    }

    /**
     * \brief 附加请求 ID，得到可直接作为 HTTP 响应的失败结果。
     */
    pub fn with_request_id(self, request_id: impl Into<String>) -> Failure {
        Failure {
            error: self,
            request_id: Some(request_id.into()),
        }
    }
}

/**
 * \brief 带关联 ID 的失败结果，对应一次请求的错误响应。
 */
#[derive(Debug)]
pub struct Failure {
    pub error: RelayError,
    pub request_id: Option<String>,
}

impl From<RelayError> for Failure {
    fn from(error: RelayError) -> Self {
        Failure {
            error,
            request_id: None,
        }
    }
}

impl Failure {
    /**
     * \brief 生成错误响应体 `{error, detail?, requestId?}`。
     */
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        match &self.error {
            RelayError::Validation(msg) => {
                body.insert("error".into(), json!(msg));
            }
            RelayError::Configuration(msg) => {
                body.insert("error".into(), json!(msg));
            }
            RelayError::Body { message, .. } => {
                body.insert("error".into(), json!(BODY_REJECTED));
                body.insert("detail".into(), json!(message));
            }
            RelayError::Upstream { status, detail } => {
                let parsed = serde_json::from_str::<Value>(detail)
                    .unwrap_or_else(|_| Value::String(detail.clone()));
                body.insert("error".into(), json!(UPSTREAM_FAILED));
                body.insert("detail".into(), json!({ "status": status, "body": parsed }));
            }
            RelayError::Network(msg) => {
                body.insert("error".into(), json!(NETWORK_FAILED));
                body.insert("detail".into(), json!(msg));
            }
            RelayError::Internal(msg) => {
                body.insert("error".into(), json!(INTERNAL_FAILED));
                body.insert("detail".into(), json!(msg));
            }
        }
        if let Some(id) = &self.request_id {
            body.insert("requestId".into(), json!(id));
        }
        Value::Object(body)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.error.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_and_network_map_to_bad_gateway() {
        let upstream = RelayError::Upstream {
            status: 429,
            detail: "slow down".into(),
        };
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            RelayError::Network("timeout".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            RelayError::Configuration(KEY_MISSING.into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_detail_embeds_parsed_json_when_possible() {
        let failure = RelayError::Upstream {
            status: 401,
            detail: r#"{"error":{"message":"bad key"}}"#.into(),
        }
        .with_request_id("req-1");
        let body = failure.body();
        assert_eq!(body["error"], UPSTREAM_FAILED);
        assert_eq!(body["detail"]["status"], 401);
        assert_eq!(body["detail"]["body"]["error"]["message"], "bad key");
        assert_eq!(body["requestId"], "req-1");
    }

    #[test]
    fn upstream_detail_falls_back_to_text() {
        let failure = Failure::from(RelayError::Upstream {
            status: 503,
            detail: "<html>down</html>".into(),
        });
        let body = failure.body();
        assert_eq!(body["detail"]["body"], "<html>down</html>");
        assert!(body.get("requestId").is_none());
    }

    #[test]
    fn body_rejection_keeps_status() {
        let failure = Failure::from(RelayError::Body {
            status: 413,
            message: "length limit exceeded".into(),
        });
        assert_eq!(failure.error.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = failure.body();
        assert_eq!(body["error"], BODY_REJECTED);
        assert_eq!(body["detail"], "length limit exceeded");
    }

    #[test]
    fn validation_body_carries_message_and_request_id() {
        let body = RelayError::Validation(MESSAGE_MISSING.into())
            .with_request_id("abc")
            .body();
        assert_eq!(body, json!({ "error": MESSAGE_MISSING, "requestId": "abc" }));
    }
}
