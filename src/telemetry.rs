use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber routed through the test writer.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Safe to call from
/// every test; only the first call installs anything.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
