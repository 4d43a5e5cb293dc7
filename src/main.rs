use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod auth;
mod clients;
mod config;
mod db;
mod domain;
mod error;
mod health;
mod metrics;
mod services;
mod utils;

#[cfg(test)]
mod testing;

use api::JwtVerifier;
use clients::{HttpAppointmentClient, HttpUserClient};
use config::AppConfig;
use db::{
    Database, PgDeliveryInformationRepository, PgDeliveryRepository, PgMedicineRepository, PgOrderItemRepository,
    PgOrderRepository,
};
use health::HealthCheckable;
use services::{DeliveryService, MedicineService, OrderService};
use utils::CircuitBreaker;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments set the environment.
    dotenvy::dotenv().ok();

    // Default to INFO, override with RUST_LOG
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,medorder=debug")))
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        host = %config.http.host,
        port = config.http.port,
        "Starting medorder"
    );

    // === 1. Database ===
    let database = Database::connect(&config.database).await?;
    if config.run_migrations {
        database.migrate().await?;
        tracing::info!("Migrations applied");
    }

    // === 2. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!(
        families = metrics.registry().gather().len(),
        "Metrics registry created"
    );

    // === 3. Downstream clients, each behind its own circuit breaker ===
    let user_breaker = CircuitBreaker::new("user_service", config.circuit_breaker.clone())
        .with_gauge(metrics.circuit_breaker_gauge("user_service"));
    let appointment_breaker = CircuitBreaker::new("appointment_service", config.circuit_breaker.clone())
        .with_gauge(metrics.circuit_breaker_gauge("appointment_service"));

    let users = Arc::new(HttpUserClient::new(&config.user_service, user_breaker)?);
    let appointments = Arc::new(HttpAppointmentClient::new(
        &config.appointment_service,
        appointment_breaker,
    )?);

    // === 4. Services ===
    let order_service = Arc::new(OrderService::new(
        Arc::new(PgOrderRepository::new(database.clone())),
        Arc::new(PgOrderItemRepository::new(database.clone())),
        Arc::new(PgMedicineRepository::new(database.clone())),
        Arc::new(PgDeliveryRepository::new(database.clone())),
        users,
        appointments,
        metrics.clone(),
    ));
    let medicine_service = Arc::new(MedicineService::new(Arc::new(PgMedicineRepository::new(
        database.clone(),
    ))));
    let delivery_service = Arc::new(DeliveryService::new(Arc::new(
        PgDeliveryInformationRepository::new(database.clone()),
    )));

    let verifier = web::Data::new(JwtVerifier::new(&config.jwt_secret));
    let database_health: Arc<dyn HealthCheckable> = Arc::new(database);

    // === 5. HTTP server ===
    tracing::info!("Listening on http://{}:{}", config.http.host, config.http.port);
    HttpServer::new(move || {
        App::new()
            .app_data(verifier.clone())
            .app_data(web::Data::from(order_service.clone()))
            .app_data(web::Data::from(medicine_service.clone()))
            .app_data(web::Data::from(delivery_service.clone()))
            .app_data(web::Data::from(metrics.clone()))
            .app_data(web::Data::from(database_health.clone()))
            .wrap(middleware::from_fn(metrics::track_requests))
            .configure(api::configure)
    })
    .bind((config.http.host.as_str(), config.http.port))?
    .run()
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}
