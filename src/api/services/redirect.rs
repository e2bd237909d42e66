use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::{debug, trace};

use crate::services::ShortenerEngine;

use super::helpers::{error_response, text_response};

pub struct RedirectService {}

impl RedirectService {
    pub async fn handle_redirect(
        path: web::Path<String>,
        engine: web::Data<Arc<ShortenerEngine>>,
    ) -> impl Responder {
        let token = path.into_inner();

        match engine.resolve(&token).await {
            Ok(Some(original_url)) => {
                trace!("Redirecting '{}' -> '{}'", token, original_url);
                HttpResponse::build(StatusCode::FOUND)
                    .insert_header(("Location", original_url))
                    .finish()
            }
            Ok(None) => {
                debug!("Short url not found: {}", token);
                Self::not_found_response()
            }
            Err(e) => error_response(&e),
        }
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        text_response(StatusCode::NOT_FOUND, "Not Found")
    }
}

pub fn redirect_routes() -> actix_web::Resource {
    web::resource("/{token}")
        .route(web::get().to(RedirectService::handle_redirect))
        .route(web::head().to(RedirectService::handle_redirect))
}
