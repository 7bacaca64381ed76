use env_logger::Env;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the process-wide logger. Later calls are no-ops.
pub fn init() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .try_init();
}
