use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const APP_TARGET: &str = "xrate";

/// Filter directives for the subscriber. A non-empty `RUST_LOG` wins;
/// otherwise `--verbose` enables debug output for this crate only.
fn filter_directives(verbose: bool, rust_log: Option<String>) -> String {
    match rust_log {
        Some(directives) if !directives.trim().is_empty() => directives,
        _ if verbose => format!("{APP_TARGET}=debug"),
        _ => "off".to_string(),
    }
}

pub fn init_logging(verbose: bool) {
    let directives = filter_directives(verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let env_filter = EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("Ignoring invalid log filter {directives:?}: {e}");
        EnvFilter::new(filter_directives(verbose, None))
    });

    // Tables go to stdout, diagnostics to stderr
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(env_filter)
        .init();
}
