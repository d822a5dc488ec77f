use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use panel_core::PanelError;
use std::fmt;

/// API 错误类型
///
/// 响应体是纯文本消息，不包含请求之外的房间或控制组 ID。
#[derive(Debug)]
pub enum ApiError {
    /// 请求错误
    BadRequest(String),
    /// 内部错误
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) | ApiError::InternalError(msg) => {
                write!(f, "{}", msg)
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

impl From<PanelError> for ApiError {
    fn from(err: PanelError) -> Self {
        let message = err.public_message();
        match err {
            PanelError::Validation(_) => ApiError::BadRequest(message),
            _ => ApiError::InternalError(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
