//! 响应构建帮助函数

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use tracing::error;

use crate::errors::LinkcoreError;

/// 错误对应的 HTTP 状态码
pub fn status_for(err: &LinkcoreError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// 纯文本响应
pub fn text_response(status: StatusCode, body: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header(("Content-Type", "text/plain; charset=utf-8"))
        .body(body.into())
}

/// Client errors carry their message; server errors get a generic body and
/// the details only go to the log.
pub fn error_response(err: &LinkcoreError) -> HttpResponse {
    let status = status_for(err);
    if status.is_client_error() {
        text_response(status, err.message())
    } else {
        error!("Request failed: {}", err);
        text_response(status, "Internal Server Error")
    }
}
