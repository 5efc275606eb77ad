use actix_web::{web, App, HttpServer};
use anyhow::Context;
use dataland_backend::config::Config;
use dataland_backend::messaging::dispatcher::start_message_dispatcher;
use dataland_backend::messaging::MessageQueuePublications;
use dataland_backend::services;
use dataland_backend::specification::SpecificationRegistry;
use dataland_backend::state::AppState;
use dataland_backend::storage::Database;
use env_logger::Env;
use log::info;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = Config::from_env()?;

    let database = Database::open(&config.database_path)
        .with_context(|| format!("could not open database {}", config.database_path))?;
    let specifications = SpecificationRegistry::load_from_dir(&config.specification_dir)?;
    let (queue, rx) = MessageQueuePublications::new();
    let state = AppState::new(database, Arc::new(specifications), queue);

    // Start message dispatcher task
    let dispatcher_state = state.clone();
    tokio::spawn(async move {
        start_message_dispatcher(dispatcher_state, rx).await;
    });

    info!("Server running at {}", config.url());

    let json_limit = config.json_limit_bytes;
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(web::Data::new(state.clone()))
            .configure(services::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;
    Ok(())
}
