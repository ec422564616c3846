mod api;
mod dao;
mod model;
mod service;

use std::fs::OpenOptions;
use std::sync::Arc;
use std::time::Duration;

use crate::api::endpoints::get_stats;
use crate::api::middleware::timing_middleware;
use crate::api::rest::json_config;
use crate::api::state::AppState;
use crate::dao::farms::FarmDao;
use crate::dao::statistics::StatisticsDao;
use crate::model::apperror::{ApplicationError, ErrorType};
use crate::model::config::{ApplicationArguments, DatabaseType, HttpsConfig, LoggingConfig};
use crate::service::initializer::DataInitializer;
use crate::service::statistics::StatisticsService;

use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, web};
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use clap::Parser;
use prometheus::IntGauge;
use rustls::pki_types::PrivateKeyDer;
use rustls::{ServerConfig, SupportedProtocolVersion};
use rustls_pemfile::{certs, pkcs8_private_keys};
use sqlx::{Pool, Postgres, pool};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/**
 * Main entry point. Reads the configuration, prepares the database and starts the server.
 */
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = ApplicationArguments::parse();

    let config = get_config(&args.config_file)?;

    init_tracing(&config.logging)?;

    let connection_pool: Pool<Postgres> = match config.clone().database.db_type {
        DatabaseType::Postgresql { connection_string, max_connections, min_connections, acquire_timeout, acquire_slow_threshold, idle_timeout, max_lifetime } => pool::PoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(std::time::Duration::from_millis(acquire_timeout))
            .acquire_slow_threshold(std::time::Duration::from_millis(acquire_slow_threshold))
            .idle_timeout(std::time::Duration::from_millis(idle_timeout))
            .max_lifetime(std::time::Duration::from_millis(max_lifetime))
            .connect(connection_string.as_str())
            .await
            .map_err(|err| std::io::Error::other(format!("Failed to create database pool: {err}")))?,
    };

    if config.database.run_migrations {
        sqlx::migrate!("./sqlx-postgresql-migration/migrations").run(&connection_pool).await.map_err(|err| std::io::Error::other(format!("Failed to run database migrations: {err}")))?;
        tracing::info!("Database migrations applied");
    }

    if config.database.seed_sample_data {
        DataInitializer::new(FarmDao::new(), connection_pool.clone()).run().await.map_err(|err| std::io::Error::other(format!("Failed to seed sample data: {err}")))?;
    }

    let statistics_dao = StatisticsDao::new();
    let statistics_service = StatisticsService::new(statistics_dao, Some(connection_pool.clone()));

    let state = web::Data::new(AppState::new(statistics_service));

    let prometheus = PrometheusMetricsBuilder::new("")
        .endpoint("/metrics")
        .mask_unmatched_patterns("UNKNOWN")
        .build()
        .map_err(|err| std::io::Error::other(format!("Failed to create Prometheus metrics: {err}")))?;

    // Initialize custom metrics
    let max_connections_gauge = IntGauge::new("max_connections", "Connection pool maximum").map_err(|err| std::io::Error::other(format!("Failed to create max_connections gauge: {err}")))?;
    let min_connections_gauge = IntGauge::new("min_connections", "Connection pool minimum").map_err(|err| std::io::Error::other(format!("Failed to create min_connections gauge: {err}")))?;
    let active_connections_gauge = IntGauge::new("active_connections", "Connection pool active").map_err(|err| std::io::Error::other(format!("Failed to create active_connections gauge: {err}")))?;
    let idle_connections_gauge = IntGauge::new("idle_connections", "Connection pool idle").map_err(|err| std::io::Error::other(format!("Failed to create idle_connections gauge: {err}")))?;
    //Register custom prometheus metrics
    register_prometheus_metrics(&prometheus, &max_connections_gauge)?;
    register_prometheus_metrics(&prometheus, &min_connections_gauge)?;
    register_prometheus_metrics(&prometheus, &active_connections_gauge)?;
    register_prometheus_metrics(&prometheus, &idle_connections_gauge)?;

    gather_db_metrics(max_connections_gauge, min_connections_gauge, active_connections_gauge, idle_connections_gauge, connection_pool);

    let server_init = HttpServer::new(move || {
        App::new()
            .wrap(prometheus.clone())
            .wrap(from_fn(timing_middleware))
            .app_data(state.clone())
            .app_data(json_config())
            .service(get_stats)
    });

    let address = config.server.address.as_str();
    let server_init = if let Some(http_port) = &config.server.http_port { server_init.bind((address, *http_port))? } else { server_init };
    let server_init = if let Some(https_config) = &config.server.https_config {
        let ssl_builder = ssl_builder(https_config).map_err(|err| std::io::Error::other(format!("Failed to create SSL/TLS configuration: {err}")))?;
        server_init.bind_rustls_0_23((address, https_config.port), ssl_builder).map_err(|err| std::io::Error::other(format!("Failed to bind HTTPS server: {err}")))?
    } else {
        server_init
    };

    tracing::info!("Starting server with {} workers", config.server.workers);
    server_init.workers(config.server.workers).run().await
}

/**
 * Initializes tracing for the application.
 *
 * Logs to stdout, and to the configured log file if any. The filter is read from `RUST_LOG` and extended with the configured directives.
 *
 * #Arguments
 * `logging_config`: The logging configuration.
 *
 * #Returns
 * A `Result` indicating success or failure.
 */
fn init_tracing(logging_config: &LoggingConfig) -> Result<(), std::io::Error> {
    let env_filter = logging_config.directives.iter().try_fold(EnvFilter::from_default_env(), |env_filter, directive| {
        directive.parse().map(|directive| env_filter.add_directive(directive)).map_err(|err| std::io::Error::other(format!("Invalid logging directive {directive}: {err}")))
    })?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(logging_config.target)
        .with_thread_ids(logging_config.thread_ids)
        .with_thread_names(logging_config.thread_names)
        .with_line_number(logging_config.line_number)
        .with_level(logging_config.level)
        .with_ansi(logging_config.ansi)
        .with_file(logging_config.file);

    let file_layer = match &logging_config.logfile {
        Some(logfile) => {
            let file = OpenOptions::new().create(true).append(true).open(logfile).map_err(|err| std::io::Error::other(format!("Failed to open log file {logfile}: {err}")))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_target(logging_config.target)
                    .with_thread_ids(logging_config.thread_ids)
                    .with_thread_names(logging_config.thread_names)
                    .with_line_number(logging_config.line_number)
                    .with_level(logging_config.level)
                    .with_ansi(false)
                    .with_file(logging_config.file),
            )
        }
        None => None,
    };

    tracing_subscriber::registry().with(env_filter).with(stdout_layer).with(file_layer).init();

    Ok(())
}

/**
 * Registers custom Prometheus metrics.
 *
 * #Arguments
 * `prometheus_metrics`: The Prometheus metrics instance to register the gauge with.
 * `gauge`: The gauge to register.
 */
fn register_prometheus_metrics(prometheus_metrics: &PrometheusMetrics, gauge: &IntGauge) -> Result<(), std::io::Error> {
    prometheus_metrics.registry.register(Box::new(gauge.clone())).map_err(|err| std::io::Error::other(format!("Failed to register Prometheus gauge: {err}")))?;
    Ok(())
}

/**
 * Gathers database metrics in a background task.
 *
 * #Arguments
 * `max_connections_gauge`: Gauge for maximum connections.
 * `min_connections_gauge`: Gauge for minimum connections.
 * `active_connections_gauge`: Gauge for active connections.
 * `idle_connections_gauge`: Gauge for idle connections.
 * `connection_pool`: The connection pool to gather metrics from.
 */
fn gather_db_metrics(max_connections_gauge: IntGauge, min_connections_gauge: IntGauge, active_connections_gauge: IntGauge, idle_connections_gauge: IntGauge, connection_pool: Pool<Postgres>) {
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            max_connections_gauge.set(i64::from(connection_pool.options().get_max_connections()));
            min_connections_gauge.set(i64::from(connection_pool.options().get_min_connections()));
            active_connections_gauge.set(i64::from(connection_pool.size()));
            #[allow(clippy::cast_possible_wrap)]
            idle_connections_gauge.set(connection_pool.num_idle() as i64);
        }
    });
}

/**
 * Initializes the SSL/TLS configuration for the server.
 *
 * #Arguments
 * `https_config`: The HTTPS configuration containing the certificate and private key files.
 *
 * #Returns
 * A `Result` containing the initialized `ServerConfig` or an `ApplicationError` if initialization fails.
 */
fn ssl_builder(https_config: &HttpsConfig) -> Result<ServerConfig, ApplicationError> {
    let config_builder = ServerConfig::builder_with_protocol_versions(&get_protocol_versions());
    let cert_file = &mut std::io::BufReader::new(
        std::fs::File::open(&https_config.certificate_file).map_err(|err| ApplicationError::new(ErrorType::Initialization, format!("Failed to read certificate file: {err}")))?,
    );
    let key_file = &mut std::io::BufReader::new(
        std::fs::File::open(&https_config.private_key_file).map_err(|err| ApplicationError::new(ErrorType::Initialization, format!("Failed to read private key file: {err}")))?,
    );
    let cert_chain = certs(cert_file).collect::<Result<Vec<_>, _>>().map_err(|err| ApplicationError::new(ErrorType::Initialization, format!("Failed to convert certificate to der: {err}")))?;
    let private_key = pkcs8_private_keys(key_file)
        .map(|key| key.map(PrivateKeyDer::Pkcs8))
        .next()
        .ok_or_else(|| ApplicationError::new(ErrorType::Initialization, "No private key found in private key file".to_string()))?
        .map_err(|err| ApplicationError::new(ErrorType::Initialization, format!("Failed to convert private key to der: {err}")))?;
    let config = config_builder
        .with_no_client_auth()
        .with_single_cert(cert_chain, private_key)
        .map_err(|err| ApplicationError::new(ErrorType::Initialization, format!("Failed to create server config: {err}")))?;
    Ok(config)
}

/**
 * Returns the supported TLS protocol versions.
 *
 * #Returns
 * A vector of supported protocol versions.
 */
fn get_protocol_versions() -> Vec<&'static SupportedProtocolVersion> {
    vec![&rustls::version::TLS13]
}

/**
 * Reads the configuration from the specified file.
 *
 * #Arguments
 * `config_file`: The path to the configuration file.
 *
 * #Returns
 * A `Result` containing the parsed `Config` or an `std::io::Error` if reading or parsing fails.
*/
fn get_config(config_file: &str) -> Result<model::config::Config, std::io::Error> {
    let config_str: String = std::fs::read_to_string(config_file).map_err(|err| std::io::Error::other(format!("Failed to read config file: {err}")))?;
    let config: model::config::Config = toml::from_str(&config_str).map_err(|err| std::io::Error::other(format!("Failed to parse config file: {err}")))?;
    Ok(config)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_config_sample_file() {
        let config = get_config("./config/config.toml").unwrap();
        assert_eq!(config.server.http_port, Some(8080));
        assert!(config.database.run_migrations);
        assert!(config.database.seed_sample_data);
    }

    #[test]
    fn test_get_config_missing_file() {
        assert!(get_config("./config/missing.toml").is_err());
    }

    #[test]
    fn test_ssl_builder_missing_certificate() {
        let https_config = HttpsConfig { port: 8443, certificate_file: "./config/missing.pem".to_string(), private_key_file: "./config/missing.key".to_string() };
        let error = ssl_builder(&https_config).unwrap_err();
        assert_eq!(error.error_type, ErrorType::Initialization);
    }
}
