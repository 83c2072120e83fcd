use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use lume_smp::config::{LoggingSettings, Settings};
use lume_smp::core::Matcher;
use lume_smp::routes::{self, handle_json_payload_error, AppState};
use lume_smp::services::ResultCache;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
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
    info!("Starting Lume stable matching service...");

    let defaults = settings.matching.search_config().map_err(|e| {
        error!("Invalid matching configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    info!(
        "Matcher defaults: method={}, scorer={}, warper={}, trials={}, parallel={}",
        defaults.method, defaults.scorer, defaults.warper, defaults.trials, defaults.parallel
    );

    let matcher = Matcher::new(defaults);

    let cache = Arc::new(ResultCache::new(
        settings.cache.l1_cache_size,
        settings.cache.ttl_secs,
    ));

    info!(
        "Result cache initialized ({} entries, TTL: {}s)",
        settings.cache.l1_cache_size, settings.cache.ttl_secs
    );

    // Build application state
    let app_state = AppState {
        matcher,
        cache,
        max_people: settings.matching.max_people,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
