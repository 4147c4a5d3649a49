use std::sync::Arc;

use anyhow::Context;
use blog_server::application::blog_manager::BlogManager;
use blog_server::data::memory_repository::InMemoryPostRepository;
use blog_server::data::post_repository::{PostRepository, PostgresPostRepository};
use blog_server::infrastructure::config::AppConfig;
use blog_server::infrastructure::database::{create_pool, run_migrations};
use blog_server::infrastructure::logging::init_logging;
use blog_server::server::start_http_server;
use tracing::warn;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let repo: Arc<dyn PostRepository> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.database_max_connections)
                .await
                .context("failed to connect to database")?;
            run_migrations(&pool)
                .await
                .context("failed to run migrations")?;
            Arc::new(PostgresPostRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL is not set, posts are kept in memory");
            Arc::new(InMemoryPostRepository::new())
        }
    };

    let manager = BlogManager::new(repo);

    start_http_server(config, manager).await
}
