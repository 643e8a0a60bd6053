/*!
 * Logging Module
 * Centralized logging configuration and utilities
 */
pub mod config;
pub mod middleware;

use std::io;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::AppConfig;

/// Default filter directive when `RUST_LOG` is not set.
pub fn default_directive(log_level: &str) -> String {
    format!("portfolio_cms={},tower_http=debug,axum=debug", log_level)
}

/// Initialize the logging system.
///
/// The returned guards flush the background writers when dropped, so the
/// caller must hold them for the lifetime of the server.
pub fn init(config: &AppConfig) -> Vec<WorkerGuard> {
    let log_dir = &config.log_dir;

    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("failed to create log directory {}: {}", log_dir.display(), e);
    }

    // File appender for all logs
    let (file_writer, file_guard) = non_blocking(rolling::daily(log_dir, "app.log"));

    // File appender for errors only
    let (error_writer, error_guard) = non_blocking(rolling::daily(log_dir, "error.log"));

    let (console_writer, console_guard) = non_blocking(io::stdout());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.log_level)));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let installed = if config.is_production() {
        // JSON format for production
        let file_layer = fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);

        let error_layer = fmt::layer()
            .json()
            .with_writer(error_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(LevelFilter::ERROR);

        let console_layer = fmt::layer()
            .json()
            .with_writer(console_writer)
            .with_target(false);

        subscriber
            .with(file_layer)
            .with(error_layer)
            .with(console_layer)
            .try_init()
    } else {
        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);

        let error_layer = fmt::layer()
            .json()
            .with_writer(error_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(LevelFilter::ERROR);

        let console_layer = fmt::layer()
            .with_writer(console_writer)
            .with_target(true)
            .pretty();

        subscriber
            .with(file_layer)
            .with(error_layer)
            .with(console_layer)
            .try_init()
    };

    if let Err(e) = installed {
        eprintln!("logging already initialized: {}", e);
    }

    tracing::info!(
        environment = %config.environment,
        log_dir = %log_dir.display(),
        "Logging initialized"
    );

    vec![file_guard, error_guard, console_guard]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_targets_this_crate() {
        let directive = default_directive("warn");
        assert!(directive.starts_with("portfolio_cms=warn"));
        assert!(EnvFilter::try_new(directive).is_ok());
    }

    #[test]
    fn test_init_writes_to_log_dir_in_both_modes() {
        for environment in ["production", "development"] {
            let mut config = crate::testing::test_config();
            config.environment = environment.to_string();
            config.log_dir = std::env::temp_dir()
                .join(format!("portfolio-cms-logs-{}-{}", environment, std::process::id()));

            let guards = init(&config);
            assert_eq!(guards.len(), 3);
            assert!(config.log_dir.is_dir());
            drop(guards);
            let _ = std::fs::remove_dir_all(&config.log_dir);
        }
    }
}
