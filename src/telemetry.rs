use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global fmt subscriber. `RUST_LOG` wins over `default_filter`.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(default_filter: &str) {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init();
}
