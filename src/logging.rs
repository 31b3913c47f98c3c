use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// Meant to be called once by the embedding application. Respects
/// `RUST_LOG`; without it, this crate logs at info level.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("draft_scanner=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Like `init`, but does not panic when a subscriber is already set
pub fn try_init() -> bool {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("draft_scanner=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
