use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `nativeui=info`.
///
/// Does nothing if a global subscriber is already set, so tests may call it repeatedly.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nativeui=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
