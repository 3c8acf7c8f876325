use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{header, HeaderName, HeaderValue},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, services::ServeDir,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tower_sessions::{
    cookie::{Key, SameSite},
    Expiry, MemoryStore, SessionManagerLayer, SessionStore,
};
use tracing::{error, info, warn};

use crate::auth::{
    self, CognitoClient, IdentityProvider, UnconfiguredProvider, CLEANUP_INTERVAL, SESSION_COOKIE,
};
use crate::config::{AppConfig, SessionStoreKind};
use crate::database::{migrations, DatabaseManager, ListRepository, PgListRepository};
use crate::handlers;
use crate::middleware::{csrf_middleware, error_pages, panic_response, redirect_if_logged_in, require_login};
use crate::view::Renderer;

/// Everything a handler can reach
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub database: DatabaseManager,
    pub lists: Arc<dyn ListRepository>,
    /// Signs the session cookie
    pub session_key: Key,
    pub identity: Arc<dyn IdentityProvider>,
    pub renderer: Arc<Renderer>,
}

impl AppState {
    /// Production wiring: Postgres lists and the Cognito client when a client
    /// id is set.
    pub fn new(config: AppConfig, database: DatabaseManager, renderer: Renderer) -> anyhow::Result<Self> {
        let pool = database.pool().clone();
        let session_key = auth::signing_key(&config.security.session_secret)?;

        let identity: Arc<dyn IdentityProvider> = if config.identity.cognito_client_id.is_empty() {
            warn!("COGNITO_CLIENT_ID is not set; login and registration will be refused");
            Arc::new(UnconfiguredProvider)
        } else {
            Arc::new(CognitoClient::new(&config.identity))
        };

        Ok(Self {
            lists: Arc::new(PgListRepository::new(pool)),
            session_key,
            identity,
            renderer: Arc::new(renderer),
            database,
            config: Arc::new(config),
        })
    }
}

/// The full router, with sessions kept in `sessions`.
///
/// Layers, outermost first: tracing, compression, security headers, sessions,
/// error pages, panic recovery. Page routes additionally run the CSRF
/// middleware; `/lists` routes also require a login. Sessions are loaded
/// lazily and only saved once something is written to them.
pub fn app<S>(state: AppState, sessions: S) -> Router
where
    S: SessionStore + Clone,
{
    let protected = Router::new()
        .route("/", get(handlers::root))
        .route("/lists", get(handlers::list_index).post(handlers::create_list))
        .route(
            "/lists/:id",
            get(handlers::show_list)
                .patch(handlers::update_list)
                .delete(handlers::delete_list),
        )
        .route("/lists/:id/edit", get(handlers::edit_list))
        .route_layer(from_fn_with_state(state.clone(), require_login));

    let guest = Router::new()
        .route("/login", get(handlers::login_form).post(handlers::submit_login))
        .route("/register", get(handlers::register_form).post(handlers::submit_registration))
        .route_layer(from_fn(redirect_if_logged_in));

    let pages = Router::new()
        .merge(protected)
        .merge(guest)
        .route("/logout", post(handlers::logout))
        .fallback(handlers::not_found)
        .layer(from_fn_with_state(state.clone(), csrf_middleware));

    let security = &state.config.security;
    let session_layer = SessionManagerLayer::new(sessions)
        .with_name(SESSION_COOKIE)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(security.cookie_secure)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(security.session_ttl_days)))
        .with_signed(state.session_key.clone());

    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("0"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .nest_service("/static", ServeDir::new(&state.config.views.static_dir))
        .merge(pages)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn_with_state(state.clone(), error_pages))
        .layer(session_layer)
        .layer(security_headers)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Connects, migrates if configured, and serves until Ctrl-C or SIGTERM
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!(
        environment = ?config.environment,
        database = %config.redacted_database_url(),
        "starting htmxtodo"
    );

    let renderer = Renderer::new(&config.views)
        .with_context(|| format!("failed to load templates from {}", config.views.dir.display()))?;

    let database = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    if config.database.auto_migrate {
        migrations::run(database.pool()).await.context("migrations failed")?;
    }

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let store_kind = config.security.session_store;
    let auto_migrate = config.database.auto_migrate;
    let state = AppState::new(config, database.clone(), renderer)?;

    let (router, cleanup) = match store_kind {
        SessionStoreKind::Postgres => {
            let store = auth::postgres_store(database.pool().clone(), auto_migrate)
                .await
                .context("failed to prepare the session table")?;
            let cleanup = auth::spawn_expired_session_cleanup(store.clone(), CLEANUP_INTERVAL);
            (app(state, store), Some(cleanup))
        }
        SessionStoreKind::Memory => {
            warn!("sessions are kept in memory and will not survive a restart");
            (app(state, MemoryStore::default()), None)
        }
    };

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    if let Some(cleanup) = cleanup {
        cleanup.abort();
    }
    database.close().await;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
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
    info!("shutdown signal received");
}
