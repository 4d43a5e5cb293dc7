mod auth;
mod delivery_info;
pub mod dto;
mod medicines;
mod orders;

use actix_web::{web, HttpRequest};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::health::health_handler;
use crate::metrics::metrics_handler;

pub use auth::JwtVerifier;

// ============================================================================
// HTTP API
// ============================================================================
//
// Routes that need a caller take a `Principal` extractor; medicine routes,
// /health and /metrics are public. Literal order paths (/latest, /doctor,
// /confirm ...) are registered before /{id} so they win the match.
//
// ============================================================================

/// Parse a UUID from the wire. Empty input means the field was omitted.
pub(crate) fn parse_id(raw: &str, what: &str) -> AppResult<Uuid> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::BadRequest(format!("{what} is required")));
    }
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("invalid {what}")))
}

fn json_error(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("invalid request body: {err}")).into()
}

fn query_error(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("invalid query string: {err}")).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .route("/health", web::get().to(health_handler))
        .route("/metrics", web::get().to(metrics_handler))
        .service(
            web::scope("/api/order/v1/orders")
                .service(
                    web::resource("")
                        .route(web::post().to(orders::create_order))
                        .route(web::put().to(orders::update_order))
                        .route(web::get().to(orders::get_order_history))
                        .route(web::delete().to(orders::cancel_order)),
                )
                .route("/latest", web::get().to(orders::get_latest_order))
                .route("/latest/{patient_id}", web::get().to(orders::get_latest_order_for_patient))
                .route("/confirm", web::post().to(orders::approve_order))
                .route("/reject", web::post().to(orders::reject_order))
                .route("/pay", web::post().to(orders::pay_order))
                .route("/doctor", web::get().to(orders::get_doctor_orders))
                .route("/doctor/history", web::get().to(orders::get_doctor_history))
                .route("/{id}", web::get().to(orders::get_order)),
        )
        .service(
            web::scope("/api/medicine/v1/medicines")
                .route("", web::get().to(medicines::list_medicines))
                .route("/{id}", web::get().to(medicines::get_medicine)),
        )
        .service(
            web::scope("/api/delivery-info/v1")
                .service(
                    web::resource("")
                        .route(web::post().to(delivery_info::create))
                        .route(web::put().to(delivery_info::update))
                        .route(web::delete().to(delivery_info::delete))
                        .route(web::get().to(delivery_info::get_all)),
                )
                .route("/user/{user_id}", web::get().to(delivery_info::get_by_user_id))
                .route("/{id}", web::get().to(delivery_info::get_by_id)),
        );
}

// ============================================================================
// HTTP Tests
// ============================================================================
