use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

use cts_api::{configure_app, telemetry, AppState};
use cts_core::repositories::identity::{
    CachedIdentityManager, IdentityCache, IdentityManager, TtlCache,
};
use cts_core::repositories::InMemoryClientRegistry;
use cts_core::services::audit::{AuditService, AuditServiceConfig};
use cts_core::services::oauth2::{
    AccessTokenService, ConfigProviderSettingsFactory, ConfigUrisFactory, RefreshTokenExchange,
    SecretClientAuthenticator, TracingAuditContext,
};
use cts_core::services::reaper::{spawn_reapers, ProcessDependencies, ProcessRegistry};
use cts_infra::cache::{RedisClient, RedisIdentityCache};
use cts_infra::database::{
    DatabasePool, MySqlAuditLogRepository, MySqlIdentityManager, MySqlTokenStore,
};
use cts_shared::{AppConfig, CacheConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::from_filename(cts_shared::Environment::from_env().env_file()).ok();
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    telemetry::init_tracing(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {}", e))?;

    info!(
        environment = %config.environment,
        version = env!("CARGO_PKG_VERSION"),
        "Starting core token service"
    );

    let database = DatabasePool::new(config.database.clone())
        .await
        .context("Failed to connect to the token store")?;
    database
        .run_migrations()
        .await
        .context("Failed to run database migrations")?;

    let pool = database.get_pool().clone();
    let store = Arc::new(MySqlTokenStore::new(pool.clone()));
    let audit = Arc::new(AuditService::new(
        Arc::new(MySqlAuditLogRepository::new(pool.clone())),
        AuditServiceConfig::default(),
    ));
    let identities: Arc<dyn IdentityManager> = Arc::new(CachedIdentityManager::new(
        Arc::new(MySqlIdentityManager::new(pool)),
        identity_cache(&config.cache).await,
    ));

    let exchange = Arc::new(RefreshTokenExchange::new(
        store.clone(),
        Arc::new(SecretClientAuthenticator::new(Arc::new(
            InMemoryClientRegistry::from_config(&config.oauth2.clients),
        ))),
        identities,
        Arc::new(ConfigProviderSettingsFactory::new(config.oauth2.clone())),
        Arc::new(ConfigUrisFactory::new(config.oauth2.clone())),
        Arc::new(TracingAuditContext),
        audit.clone(),
    ));
    let token_service = Arc::new(AccessTokenService::with_refresh_token_grant(exchange));

    let reapers = if config.reaper.enabled {
        let deps = ProcessDependencies::new(store.clone(), audit, &config.reaper);
        let processes = ProcessRegistry::with_defaults()
            .resolve(&config.reaper.processes, &deps)
            .context("Invalid reaper process configuration")?;
        info!(
            processes = ?config.reaper.processes,
            interval_seconds = config.reaper.interval_seconds,
            page_size = config.reaper.page_size,
            "Starting reapers"
        );
        spawn_reapers(
            store,
            processes,
            config.reaper.page_size,
            Duration::from_secs(config.reaper.interval_seconds),
        )
    } else {
        info!("Reaper disabled");
        Vec::new()
    };

    let state = web::Data::new(
        AppState::new(token_service, config.oauth2.clone()).with_database(database.clone()),
    );

    let bind_address = config.server.bind_address();
    info!(address = %bind_address, "Starting HTTP server");

    let mut server = HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(TracingLogger::default())
            .configure(move |cfg| configure_app(cfg, state))
    })
    .keep_alive(Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    let result = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await;

    info!("Shutting down");
    for handle in reapers {
        handle.abort();
    }
    database.close().await;

    result.context("HTTP server failed")
}

/// Redis when enabled and reachable, otherwise an in-process TTL cache
async fn identity_cache(config: &CacheConfig) -> Arc<dyn IdentityCache> {
    let in_process = || -> Arc<dyn IdentityCache> {
        Arc::new(TtlCache::new(
            Duration::from_secs(config.default_ttl),
            config.max_entries,
        ))
    };

    if !config.enabled {
        return in_process();
    }

    match RedisClient::new(config.clone()).await {
        Ok(client) => Arc::new(RedisIdentityCache::new(client)),
        Err(e) => {
            warn!(error = %e, "Redis unavailable, using in-process identity cache");
            in_process()
        }
    }
}
