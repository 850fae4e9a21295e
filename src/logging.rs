use tracing_subscriber::{EnvFilter, fmt};

/// Installs the stderr subscriber for the headless binaries.
///
/// `RUST_LOG` picks the filter (default `info`); `LOG_FORMAT=json` switches
/// to one JSON object per line.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    // A second init (tests, embedding) is not an error worth surfacing.
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}
