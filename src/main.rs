mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::ApiDoc;
use crate::core::{database, middleware};
use crate::features::auth::clients::GoogleAuthClient;
use crate::features::auth::handlers::AuthState;
use crate::features::auth::routes as auth_routes;
use crate::features::auth::services::{AuthService, SessionStore};
use crate::features::files::{routes as files_routes, FileService};
use axum::Router;
use axum_extra::extract::cookie::Key;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!("Configuration loaded successfully");

    // Connect the row store behind the adapter seam
    let store = database::connect(&config.database).await?;
    tracing::info!("Row store connected");

    // A pre-existing schema is a valid state: creation failure is a startup
    // warning, not a crash.
    if let Err(e) = store.ensure_schema().await {
        tracing::warn!("Table creation failed: {}", e);
    } else {
        tracing::info!("Tables ensured");
    }

    // Initialize session handling
    let sessions = Arc::new(SessionStore::new());
    let cookie_key = Key::derive_from(config.session.secret.as_bytes());

    // Initialize auth services
    let google_client = Arc::new(GoogleAuthClient::new(config.google.clone()));
    let auth_service = Arc::new(AuthService::new(Arc::clone(&store)));
    tracing::info!("Auth services initialized");

    // Initialize File Service
    let file_service = Arc::new(FileService::new(
        Arc::clone(&store),
        config.upload.attribute_owner,
    ));
    tracing::info!(
        "File service initialized (owner attribution: {})",
        config.upload.attribute_owner
    );

    let auth_state = AuthState {
        google_client,
        auth_service: Arc::clone(&auth_service),
        sessions: Arc::clone(&sessions),
        cookie_key: cookie_key.clone(),
    };

    let session_layer_state = middleware::SessionLayerState {
        sessions,
        auth_service,
        cookie_key,
    };

    async fn root() -> &'static str {
        "Server is online"
    }
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }

    // Build swagger router
    let swagger = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let app = Router::new()
        .merge(swagger)
        .merge(auth_routes::routes(auth_state))
        .merge(files_routes::routes(file_service))
        .route("/", axum::routing::get(root))
        .route("/health", axum::routing::get(health_check))
        .layer(axum::middleware::from_fn_with_state(
            session_layer_state,
            middleware::session_middleware,
        ))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
