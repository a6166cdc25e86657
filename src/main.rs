use std::{process, sync::Arc};

use tokio::signal;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use vitrine::{
    application::{
        auth::{AdminPrincipal, IdentityProvider},
        content::{CategoryService, MessageService, ProjectService, ServiceCatalogService},
        error::AppError,
        repos::{RecordStore, SettingsStore},
        settings::{FetchOutcome, SettingsAdapter, SettingsError, SiteSettingsService},
    },
    cache::SettingsCache,
    config,
    infra::{
        db::{PostgresRepositories, TableNames},
        error::InfraError,
        http::{self, ApiState},
        identity::{DisabledIdentityProvider, HostedIdentityProvider},
        memory::MemoryStore,
        telemetry,
        uploads::ImageStorage,
    },
};

const TARGET: &str = "vitrine::main";

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
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::InitSettings(_) => run_init_settings(settings).await,
        config::Command::CheckSettings(_) => run_check_settings(settings).await,
    }
}

struct Stores {
    records: Arc<dyn RecordStore>,
    settings: Arc<dyn SettingsStore>,
}

async fn init_stores(settings: &config::Settings) -> Result<Stores, AppError> {
    let Some(database_url) = settings.database.url.as_deref() else {
        warn!(
            target = TARGET,
            "database.url is not configured; content and settings live in memory"
        );
        let memory = Arc::new(MemoryStore::new());
        return Ok(Stores {
            records: memory.clone(),
            settings: memory,
        });
    };

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    if settings.database.run_migrations {
        PostgresRepositories::run_migrations(&pool)
            .await
            .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
    }

    let repositories = Arc::new(PostgresRepositories::new(
        pool,
        TableNames {
            settings: settings.database.settings_table.clone(),
            records: settings.database.kv_table.clone(),
        },
    ));

    Ok(Stores {
        records: repositories.clone(),
        settings: repositories,
    })
}

fn build_identity(settings: &config::Settings) -> Result<Arc<dyn IdentityProvider>, AppError> {
    let identity = &settings.identity;
    match identity.base_url.as_deref() {
        Some(base_url) => {
            let service_key = identity.service_key.clone().ok_or_else(|| {
                InfraError::configuration("identity.service_key is required with identity.base_url")
            })?;
            let provider = HostedIdentityProvider::new(base_url, service_key, identity.timeout)?;
            Ok(Arc::new(provider))
        }
        None => {
            warn!(
                target = TARGET,
                "identity.base_url is not configured; admin endpoints will reject every request"
            );
            Ok(Arc::new(DisabledIdentityProvider))
        }
    }
}

fn build_settings_service(store: Arc<dyn SettingsStore>) -> Arc<SiteSettingsService> {
    let adapter = Arc::new(SettingsAdapter::new(store));
    let cache = Arc::new(SettingsCache::new(adapter.clone()));
    Arc::new(SiteSettingsService::new(adapter, cache))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let stores = init_stores(&settings).await?;
    let identity = build_identity(&settings)?;
    let site_settings = build_settings_service(stores.settings.clone());

    let images = Arc::new(
        ImageStorage::new(
            settings.uploads.directory.clone(),
            settings.uploads.public_base_url.clone(),
        )
        .map_err(|err| AppError::from(InfraError::Io(err)))?,
    );

    let state = ApiState {
        identity,
        settings: site_settings.clone(),
        categories: Arc::new(CategoryService::new(stores.records.clone())),
        projects: Arc::new(ProjectService::new(stores.records.clone())),
        services: Arc::new(ServiceCatalogService::new(stores.records.clone())),
        messages: Arc::new(MessageService::new(stores.records)),
        images,
        allow_signup: settings.identity.allow_signup,
    };

    let resolved = site_settings.resolved().await;
    let site = site_settings.site_config().await;
    info!(
        target = TARGET,
        source = ?resolved.source,
        store_unavailable = resolved.store_unavailable,
        company = %site.company.name,
        "Site settings warmed"
    );

    serve_http(&settings, state).await
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let max_request_bytes = usize::try_from(settings.uploads.max_request_bytes.get())
        .map_err(|_| AppError::validation("uploads.max_request_bytes exceeds usize"))?;
    let router = http::build_router(state, max_request_bytes);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = TARGET,
        addr = %settings.server.addr,
        "Listening"
    );

    let grace = settings.server.graceful_shutdown;
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!(
                target = TARGET,
                grace_seconds = grace.as_secs(),
                "Shutdown signal received"
            );
            tokio::spawn(async move {
                tokio::time::sleep(grace).await;
                warn!(target = TARGET, "Graceful shutdown timed out");
                process::exit(1);
            });
        })
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(target = TARGET, error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(target = TARGET, error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn cli_principal() -> AdminPrincipal {
    AdminPrincipal {
        user_id: "vitrine-cli".to_string(),
        email: None,
        name: Some("Command line".to_string()),
    }
}

async fn run_init_settings(settings: config::Settings) -> Result<(), AppError> {
    let stores = init_stores(&settings).await?;
    let service = build_settings_service(stores.settings);

    match service.initialize(Some(&cli_principal())).await {
        Ok(stored) => {
            info!(
                target = TARGET,
                updated_at = %stored.updated_at,
                "Default site settings stored"
            );
            Ok(())
        }
        Err(SettingsError::AlreadyInitialized) => Err(AppError::validation(
            "site settings already exist; edit them through the admin API",
        )),
        Err(SettingsError::StoreUnavailable) => Err(AppError::from(InfraError::database(
            "settings table not found; run the migrations first",
        ))),
        Err(other) => Err(AppError::unexpected(other.to_string())),
    }
}

async fn run_check_settings(settings: config::Settings) -> Result<(), AppError> {
    let stores = init_stores(&settings).await?;
    let adapter = SettingsAdapter::new(stores.settings);

    match adapter.fetch().await {
        FetchOutcome::Found(stored) => info!(
            target = TARGET,
            updated_at = %stored.updated_at,
            updated_by = stored.updated_by.as_deref().unwrap_or("unknown"),
            sections = stored.document.len(),
            "Site settings override found"
        ),
        FetchOutcome::NotYetConfigured => info!(
            target = TARGET,
            "No site settings override yet; defaults are served"
        ),
        FetchOutcome::StoreUnavailable => warn!(
            target = TARGET,
            table = %settings.database.settings_table,
            "Settings table is missing; defaults are served"
        ),
        FetchOutcome::Transient(message) => warn!(
            target = TARGET,
            error = %message,
            "Settings store failed; defaults are served"
        ),
    }

    Ok(())
}
