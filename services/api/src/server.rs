use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use homeward::config::AppConfig;
use homeward::error::AppError;
use homeward::telemetry;
use homeward::workflows::adoption::AdoptionWorkflowService;
use homeward::workflows::catalog::PetCatalogService;
use homeward::workflows::identity::Role;

use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryAccounts, InMemoryAdoptionRepository, InMemoryPetRepository,
};
use crate::routes::app_router;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let accounts = Arc::new(InMemoryAccounts::default());
    let admin = accounts.register_with_token(
        &config.admin.name,
        &config.admin.email,
        Role::Admin,
        &config.admin.token,
    );
    info!(admin = %admin.user_id.0, "administrator account seeded");

    let pets = Arc::new(InMemoryPetRepository::default());
    let adoptions = Arc::new(InMemoryAdoptionRepository::default());
    let adoption_service = Arc::new(AdoptionWorkflowService::new(
        adoptions.clone(),
        pets.clone(),
        accounts.clone(),
    ));
    let catalog_service = Arc::new(PetCatalogService::new(pets, adoptions, accounts.clone()));

    let app = app_router(adoption_service, catalog_service, accounts)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "pet adoption service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
