use actix_web::{middleware, web, App, HttpServer};
use kuso_search::config::{LoggingSettings, Settings};
use kuso_search::core::SystemClock;
use kuso_search::routes::{self, AppState};
use kuso_search::services::S3SelectClient;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    init_logging(&settings.logging);

    info!("Starting Kuso search service...");

    let client = S3SelectClient::from_settings(&settings.storage)
        .await
        .map_err(|e| {
            error!("Failed to initialize storage client: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e)
        })?;

    info!(
        "Serving s3://{}/{}",
        settings.storage.bucket, settings.storage.key
    );

    let app_state = AppState {
        source: Arc::new(client),
        clock: Arc::new(SystemClock),
        bucket: settings.storage.bucket.clone(),
        key: settings.storage.key.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!("Starting HTTP server on {}:{}", host, port);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(routes::cors())
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    });

    if let Some(workers) = settings.server.workers {
        server = server.workers(workers);
    }

    server.bind((host, port))?.run().await
}
