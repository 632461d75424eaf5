use crate::config::{Environment, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_directives(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => "sudanese_house_backend=debug,tower_http=debug,sqlx=warn,info",
        Environment::Staging => "sudanese_house_backend=debug,tower_http=info,sqlx=warn,info",
        Environment::Prod => "sudanese_house_backend=info,tower_http=info,warn",
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the per-environment defaults.
pub fn init_logging(env: &Environment, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(env)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry.with(fmt_layer.json()).try_init(),
        LogFormat::Compact => registry.with(fmt_layer.compact()).try_init(),
        LogFormat::Pretty => registry.with(fmt_layer.pretty()).try_init(),
    };

    // A subscriber may already be installed (integration tests boot several apps).
    if result.is_ok() {
        tracing::info!(env = ?env, format = ?format, "Logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse() {
        for env in [Environment::Dev, Environment::Staging, Environment::Prod] {
            assert!(EnvFilter::try_new(default_directives(&env)).is_ok());
        }
    }

    #[test]
    fn repeated_init_does_not_panic() {
        init_logging(&Environment::Dev, LogFormat::Compact);
        init_logging(&Environment::Dev, LogFormat::Compact);
    }
}
