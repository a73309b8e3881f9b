use std::{process, sync::Arc};

use docservice::{
    application::{documents::DocumentService, error::AppError, repos::DocumentsRepo},
    cache::{CacheConfig, build_document_cache},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState, HealthProbe},
        telemetry,
    },
};
use tokio::{net::TcpListener, sync::Notify};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;

    let cache_config = CacheConfig::from(&settings.cache);
    let cache = build_document_cache(&cache_config);
    let store: Arc<dyn DocumentsRepo> = repositories.clone();
    let health: Arc<dyn HealthProbe> = repositories;
    let documents = Arc::new(DocumentService::new(store, cache));

    log_startup(&settings, &cache_config);

    let state = ApiState::new(documents, health);
    serve_http(&settings, state).await
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    init_repositories(&settings).await?;
    info!(target = "docservice::migrate", "Migrations applied");
    Ok(())
}

/// Connect, wait for the database to answer, and apply bundled migrations.
async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool =
        PostgresRepositories::connect_lazy(database_url, settings.database.max_connections.get())
            .map_err(|err| InfraError::database(err.to_string()))?;
    let repositories = Arc::new(PostgresRepositories::new(pool));

    repositories
        .wait_until_ready(settings.database.connect_timeout)
        .await?;
    PostgresRepositories::run_migrations(repositories.pool()).await?;

    Ok(repositories)
}

fn log_startup(settings: &config::Settings, cache: &CacheConfig) {
    info!(
        target = "docservice::startup",
        addr = %settings.server.addr,
        log_level = %settings.logging.level,
        log_format = ?settings.logging.format,
        db_max_connections = settings.database.max_connections.get(),
        db_connect_timeout_s = settings.database.connect_timeout.as_secs(),
        cache_enabled = cache.enabled,
        cache_ttl_s = cache.ttl.as_secs(),
        cache_prefix = cache.key_prefix_or_default(),
        cache_capacity = cache.capacity_non_zero().get(),
        "Starting docservice"
    );
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;
    info!(
        target = "docservice::http",
        addr = %settings.server.addr,
        "Listening"
    );

    let stop = Arc::new(Notify::new());
    let stop_signal = stop.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move { stop_signal.notified().await })
            .await
    });

    tokio::select! {
        joined = &mut server => return flatten_server_result(joined),
        () = shutdown_signal() => {}
    }

    info!(
        target = "docservice::http",
        grace_s = settings.server.graceful_shutdown.as_secs(),
        "Shutdown requested; draining connections"
    );
    stop.notify_one();

    match tokio::time::timeout(settings.server.graceful_shutdown, &mut server).await {
        Ok(joined) => flatten_server_result(joined),
        Err(_) => {
            warn!(
                target = "docservice::http",
                "Graceful shutdown window elapsed; aborting open connections"
            );
            server.abort();
            Ok(())
        }
    }
}

fn flatten_server_result(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(result) => result.map_err(|err| AppError::from(InfraError::from(err))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
