use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use taskmate::config::Config;
use taskmate::notify::{LogMailer, Mailer, SendGridMailer};
use taskmate::routes;
use taskmate::state::AppState;
use taskmate::store::{MemoryStore, PgStore, Store};

async fn open_store(config: &Config) -> io::Result<Arc<dyn Store>> {
    match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            store
                .migrate()
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            log::info!("Connected to PostgreSQL, migrations applied");
            Ok(Arc::new(store))
        }
        None => {
            log::warn!("DATABASE_URL not set, data is kept in memory and lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn build_mailer(config: &Config) -> Arc<dyn Mailer> {
    match &config.sendgrid_api_key {
        Some(key) => Arc::new(SendGridMailer::new(key.clone(), config.mail_from.clone())),
        None => {
            log::warn!("SENDGRID_API_KEY not set, emails will only be logged");
            Arc::new(LogMailer)
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let store = open_store(&config).await?;
    let mailer = build_mailer(&config);
    let state = web::Data::new(AppState::new(store, mailer, config.jwt_secret.clone()));

    log::info!("Starting taskmate server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
