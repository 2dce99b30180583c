//! Tracing initialization for hosts without their own subscriber.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the default tracing subscriber. Call once from the host; calling
/// again (or alongside a host-installed subscriber) is a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetbridge_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
