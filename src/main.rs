mod config;
mod db;
mod error;
mod moderation;
mod notify;
mod routes;
mod state;
mod storage;
mod templates;

use std::sync::Arc;

use crate::db::PgSubmissionRepository;
use crate::moderation::ModerationWorkflow;
use crate::notify::MailApiNotifier;
use crate::storage::DiskStager;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "defense_intake=info,tower_http=info".into()),
        )
        .init();

    let config = config::Config::from_env()?;
    let config = Arc::new(config);

    crate::storage::ensure_dirs(&config.upload_folder)?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let workflow = ModerationWorkflow::new(
        Arc::new(DiskStager::new(config.upload_folder.clone())),
        Arc::new(PgSubmissionRepository::new(pool)),
        Arc::new(MailApiNotifier::new(config.mail.clone())?),
        config.public_base_url.clone(),
    );

    let state = Arc::new(state::AppState {
        workflow: Arc::new(workflow),
        config: config.clone(),
    });

    let app = routes::build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Defense intake listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
