//! # Tabula Binary
//!
//! The entry point that assembles the table backend from its adapters.

use actix_web::{web, App, HttpServer};
use tb_api::handlers::AppState;
use tb_api::middleware::{cors_policy, standard_middleware};
use tb_db_sqlite::{connect, SqlitePostRepo, SqliteTaskRepo, SqliteViewRepo};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:tabula.db".to_string());

    let pool = connect(&database_url)
        .await
        .expect("Failed to init SQLite");

    // Dynamic dispatch so the binary can swap store implementations
    // without touching the handlers.
    let state = web::Data::new(AppState {
        posts: Box::new(SqlitePostRepo::new(pool.clone())),
        tasks: Box::new(SqliteTaskRepo::new(pool.clone())),
        post_views: Box::new(SqliteViewRepo::posts(pool.clone())),
        task_views: Box::new(SqliteViewRepo::tasks(pool)),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    log::info!("🚀 Tabula starting on http://{bind_addr}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(standard_middleware())
            .wrap(cors_policy())
            .configure(tb_api::configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
