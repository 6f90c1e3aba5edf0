//! Market Sentiment Service — Binary Entrypoint
//! Boots the Axum HTTP server: config, engine training, routes and metrics.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEV_LOG_ENV: &str = "SENTIMENT_DEV_LOG";
const DEFAULT_LOG_FILTER: &str = "market_sentiment=info,warn";

/// Install a compact log subscriber for local runs of the service.
///
/// Stays off unless `SENTIMENT_DEV_LOG=1` is set on a dev run (a debug build,
/// or `SHUTTLE_ENV` of `local`/`dev`/`development`). `RUST_LOG` replaces the
/// default `market_sentiment=info,warn` filter.
fn enable_dev_tracing() {
    let requested = std::env::var(DEV_LOG_ENV).is_ok_and(|v| v.trim() == "1");
    if !requested || !(cfg!(debug_assertions) || shuttle_env_is_dev()) {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn shuttle_env_is_dev() -> bool {
    std::env::var("SHUTTLE_ENV").is_ok_and(|env| {
        matches!(
            env.to_ascii_lowercase().as_str(),
            "local" | "dev" | "development"
        )
    })
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let router = market_sentiment::app().await?;
    Ok(router.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn shuttle_env_names_are_case_insensitive() {
        for (value, dev) in [("local", true), ("Development", true), ("DEV", true), ("production", false)] {
            std::env::set_var("SHUTTLE_ENV", value);
            assert_eq!(shuttle_env_is_dev(), dev, "{value}");
        }
        std::env::remove_var("SHUTTLE_ENV");
        assert!(!shuttle_env_is_dev());
    }
}
