use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::MatchedPath;
use clap::Parser;
use dotenvy::dotenv;
use http::HeaderValue;
use tokio::io::BufReader;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use pocopi_api::bootstrap::app_context::{AppContext, AppServices};
use pocopi_api::bootstrap::cli::{Cli, create_admin_interactive};
use pocopi_api::bootstrap::config::Config;
use pocopi_api::infrastructure::db;
use pocopi_api::infrastructure::db::repositories::{
    attempt_repository_sqlx::SqlxAttemptRepository,
    config_repository_sqlx::SqlxConfigRepository,
    config_unit_of_work_sqlx::SqlxConfigUnitOfWork,
    event_log_repository_sqlx::SqlxEventLogRepository,
    form_answer_repository_sqlx::SqlxFormAnswerRepository,
    form_repository_sqlx::SqlxFormRepository, home_repository_sqlx::SqlxHomeRepository,
    image_repository_sqlx::SqlxImageRepository, pattern_repository_sqlx::SqlxPatternRepository,
    test_group_repository_sqlx::SqlxTestGroupRepository,
    translation_repository_sqlx::SqlxTranslationRepository,
    user_repository_sqlx::SqlxUserRepository,
};
use pocopi_api::infrastructure::storage::FsImageStorage;
use pocopi_api::presentation::http::{api_router, health};
use pocopi_api::presentation::openapi::ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "pocopi_api=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Config::from_env()?;
    info!(port = cfg.api_port, production = cfg.is_production, "Starting PoCoPI backend");

    // Database
    let pool = db::connect_pool(&cfg.database_url, cfg.database_max_connections).await?;
    db::migrate(&pool).await?;

    let user_repo = Arc::new(SqlxUserRepository::new(pool.clone()));

    if cli.create_admin {
        let mut input = BufReader::new(tokio::io::stdin());
        let mut output = tokio::io::stdout();
        create_admin_interactive(user_repo.as_ref(), &mut input, &mut output).await?;
        return Ok(());
    }

    let images_root = Path::new(&cfg.images_base_path);
    if let Err(e) = tokio::fs::create_dir_all(images_root.join("images")).await {
        tracing::warn!(error = ?e, dir = %cfg.images_base_path, "Failed to create images dir");
    }

    let services = AppServices::new(
        user_repo,
        Arc::new(SqlxPatternRepository::new(pool.clone())),
        Arc::new(SqlxConfigRepository::new(pool.clone())),
        Arc::new(SqlxHomeRepository::new(pool.clone())),
        Arc::new(SqlxTranslationRepository::new(pool.clone())),
        Arc::new(SqlxFormRepository::new(pool.clone())),
        Arc::new(SqlxFormAnswerRepository::new(pool.clone())),
        Arc::new(SqlxTestGroupRepository::new(pool.clone())),
        Arc::new(SqlxAttemptRepository::new(pool.clone())),
        Arc::new(SqlxEventLogRepository::new(pool.clone())),
        Arc::new(SqlxImageRepository::new(pool.clone())),
        Arc::new(FsImageStorage::new(images_root)),
        Arc::new(SqlxConfigUnitOfWork::new(pool.clone())),
    );
    let ctx = AppContext::new(cfg.clone(), services);

    let cors = match &cfg.frontend_url {
        Some(origin) => {
            let origin = HeaderValue::from_str(origin)?;
            CorsLayer::new()
                .allow_origin(AllowOrigin::exact(origin))
                .allow_methods([
                    http::Method::GET,
                    http::Method::POST,
                    http::Method::PUT,
                    http::Method::DELETE,
                    http::Method::PATCH,
                    http::Method::OPTIONS,
                ])
                .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
                .allow_credentials(true)
        }
        None => {
            // Development: mirror the caller's origin so cookies keep working
            CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_methods([
                    http::Method::GET,
                    http::Method::POST,
                    http::Method::PUT,
                    http::Method::DELETE,
                    http::Method::PATCH,
                    http::Method::OPTIONS,
                ])
                .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
                .allow_credentials(true)
        }
    };

    let app = Router::new()
        .nest("/api", health::routes(pool.clone()))
        .merge(api_router(ctx))
        .nest_service("/images", ServeDir::new(images_root.join("images")))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(DefaultBodyLimit::max(cfg.upload_max_bytes))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "Failed to listen for shutdown signal");
    }
}
