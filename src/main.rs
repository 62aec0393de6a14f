use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio_site::{
    api,
    backend::{
        AuthProvider, ContentStore, LocalBackend, SupabaseAuth, SupabaseClient, SupabaseContent,
    },
    config::{BackendKind, Config},
    object_store as obj,
    storage::Database,
    AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "portfolio-site starting");

    // Load configuration
    let config = Config::load()?;
    info!(backend = ?config.backend.kind, "Loaded configuration");

    let (content, auth, object_store): (
        Arc<dyn ContentStore>,
        Arc<dyn AuthProvider>,
        Arc<dyn obj::ObjectStore>,
    ) = match config.backend.kind {
        BackendKind::Local => {
            let db = Database::open(&config.backend.data_dir)?;
            info!("Database opened at: {}", config.backend.data_dir);

            let backend = LocalBackend::new(db);
            if let Some(admin) = &config.backend.local_admin {
                let user = backend.seed_admin(&admin.email, &admin.password)?;
                info!(user_id = %user.id, "Seeded local admin account");
            }

            let store = obj::LocalStore::new(&config.storage.local_storage_path)?;
            info!(
                "Using local storage backend at: {}",
                config.storage.local_storage_path
            );

            let backend = Arc::new(backend);
            let content: Arc<dyn ContentStore> = backend.clone();
            let auth: Arc<dyn AuthProvider> = backend;
            (content, auth, Arc::new(store) as Arc<dyn obj::ObjectStore>)
        }
        BackendKind::Supabase => {
            let (Some(url), Some(key)) = (
                config.backend.supabase_url.as_deref(),
                config.backend.supabase_anon_key.as_deref(),
            ) else {
                anyhow::bail!("SUPABASE_URL and SUPABASE_ANON_KEY are required");
            };
            let client = SupabaseClient::new(url, key)?;
            info!("Using hosted backend at: {}", client.base_url());

            let content: Arc<dyn ContentStore> = Arc::new(SupabaseContent::new(client.clone()));
            let auth: Arc<dyn AuthProvider> = Arc::new(SupabaseAuth::new(client.clone()));
            let store: Arc<dyn obj::ObjectStore> = Arc::new(obj::SupabaseStore::new(client));
            (content, auth, store)
        }
    };

    // Create shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        content,
        auth,
        object_store,
    });

    // Build and start the HTTP server
    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("Listening on: {}", config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, draining connections");
}
