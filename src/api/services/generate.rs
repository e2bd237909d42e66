use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, error::InternalError, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::errors::LinkcoreError;
use crate::services::{GenerateRequest, ShortenerEngine};

use super::helpers::{error_response, text_response};

/// POST /generate 请求体
#[derive(Deserialize, Debug, Clone)]
pub struct GenerateBody {
    /// 缺省视为空字符串，由引擎统一报 EmptyUrl
    #[serde(default)]
    pub original_url: String,
    pub custom_token: Option<String>,
    /// RFC3339
    pub expires_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenerateResponse {
    pub short_url: String,
}

/// 解析 RFC3339 过期时间，空字符串视为未设置
pub fn parse_expires_at(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, LinkcoreError> {
    match raw {
        Some(s) if !s.is_empty() => DateTime::parse_from_rfc3339(s)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|_| {
                LinkcoreError::date_parse(format!(
                    "Invalid expires_at '{}'. Use RFC3339 format, e.g. 2026-01-01T00:00:00Z",
                    s
                ))
            }),
        _ => Ok(None),
    }
}

pub struct GenerateService {}

impl GenerateService {
    pub async fn handle_generate(
        body: web::Json<GenerateBody>,
        engine: web::Data<Arc<ShortenerEngine>>,
    ) -> impl Responder {
        let body = body.into_inner();
        trace!("Generate request: {:?}", body);

        let expires_at = match parse_expires_at(body.expires_at.as_deref()) {
            Ok(t) => t,
            Err(e) => return error_response(&e),
        };

        let req = GenerateRequest {
            original_url: body.original_url,
            custom_token: body.custom_token,
            expires_at,
        };

        match engine.generate(req).await {
            Ok(token) => {
                debug!("Generated short url: {}", token);
                HttpResponse::Ok().json(GenerateResponse { short_url: token })
            }
            Err(e) => error_response(&e),
        }
    }
}

/// 畸形 JSON 统一返回 400
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = text_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", err),
        );
        InternalError::from_response(err, response).into()
    })
}

pub fn generate_routes() -> actix_web::Resource {
    web::resource("/generate")
        .app_data(json_config())
        .route(web::post().to(GenerateService::handle_generate))
}
