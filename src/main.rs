use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use estate_match::config::{LoggingSettings, Settings};
use estate_match::core::Recommender;
use estate_match::routes::{self, AppState};
use estate_match::services::{CacheManager, PropertyStore};
use std::io;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Initialize logging from settings; `RUST_LOG` takes precedence over `logging.level`
fn init_tracing(logging: &LoggingSettings) {
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
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_tracing(&settings.logging);

    info!("Starting Estate Match recommendation service...");

    let store = PropertyStore::from_settings(&settings.store)
        .await
        .map_err(|e| {
            error!("Failed to initialize property store: {}", e);
            io::Error::other(e.to_string())
        })?;

    info!("Property store initialized (backend: {})", store.backend_name());

    // Cache is optional; Redis failures fall back to the in-process tier
    let cache = if settings.cache.enabled {
        let ttl = settings.cache.ttl_secs.unwrap_or(300);
        let l1_size = settings.cache.l1_cache_size.unwrap_or(1000);

        let manager = match CacheManager::new(settings.cache.redis_url.as_deref(), l1_size, ttl).await {
            Ok(manager) => manager,
            Err(e) => {
                error!("Failed to connect to Redis ({}), using in-memory cache only", e);
                CacheManager::in_memory(l1_size, ttl)
            }
        };

        let stats = manager.stats();
        info!(
            "Cache manager initialized (L1: {} entries, L2: {}, TTL: {}s)",
            l1_size, stats.l2_enabled, ttl
        );
        Some(Arc::new(manager))
    } else {
        info!("Recommendation cache disabled");
        None
    };

    let weights = settings.scoring_weights();
    let recommender = Recommender::new(weights, settings.recommendation.min_score);

    info!(
        "Recommender initialized with weights: {:?} (max score {})",
        weights,
        weights.max_total()
    );

    let app_state = AppState {
        store: Arc::new(store),
        cache,
        recommender,
        settings: settings.recommendation,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
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
