use tracing::{Level, Subscriber};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt, Registry};

pub fn parse_level(log_level: &str) -> Level {
    match log_level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    }
}

pub fn subscriber(log_level: &str) -> impl Subscriber + Send + Sync + 'static {
    let level = parse_level(log_level);

    let filter = filter::Targets::new()
        .with_target("sqlx", Level::WARN)
        .with_target(env!("CARGO_CRATE_NAME"), level)
        .with_default(Level::INFO);

    let tracing_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    Registry::default().with(tracing_layer).with(filter)
}

/// Installs the global subscriber; call once from `main`.
pub fn init(log_level: &str) {
    subscriber(log_level).init();
}
