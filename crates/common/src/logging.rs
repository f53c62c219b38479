use std::env;

use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::WithExportConfig;
use tracing::*;
use tracing_subscriber::{
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Layer, Registry,
};

pub const OTLP_URL_ENVVAR: &str = "ZKEVM_OTLP_URL";
pub const SVC_LABEL_ENVVAR: &str = "ZKEVM_SVC_LABEL";

pub struct LoggerConfig {
    whoami: String,
    otel_url: Option<String>,
}

impl LoggerConfig {
    /// Creates a new empty instance with whoami set.
    pub fn new(whoami: String) -> Self {
        Self {
            whoami,
            otel_url: None,
        }
    }

    pub fn with_base_name(s: &str) -> Self {
        Self::new(get_whoami_string(s))
    }

    pub fn set_otlp_url(&mut self, url: String) {
        self.otel_url = Some(url);
    }

    /// Picks up the OTLP endpoint from [`OTLP_URL_ENVVAR`], if set.
    pub fn with_otlp_url_from_env(mut self) -> Self {
        self.otel_url = get_otlp_url_from_env();
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::with_base_name("(zkevm-bridge-test)")
    }
}

/// Initializes the logging subsystem with the provided config.
///
/// Panics if a global subscriber was already installed.
pub fn init(config: LoggerConfig) {
    let filt = EnvFilter::from_default_env();
    install(&config, filt, false).expect("init: logging");

    info!(whoami = %config.whoami, "logging started");
}

/// Installs a stdout subscriber routed through the libtest output capture.
///
/// Safe to call from every test; only the first call installs the subscriber.
pub fn init_for_tests() {
    let filt = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // a subscriber from an earlier test is fine
    let _ = install(&LoggerConfig::default(), filt, true);
}

fn install(
    config: &LoggerConfig,
    filt: EnvFilter,
    test_writer: bool,
) -> Result<(), TryInitError> {
    // Stdout logging.
    let stdout_sub: Box<dyn Layer<Registry> + Send + Sync> = if test_writer {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_test_writer()
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().compact().boxed()
    };
    let stdout_sub = stdout_sub.with_filter(filt);

    // OpenTelemetry output.
    let otel_sub = config.otel_url.as_ref().map(|otel_url| {
        let exporter = opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(otel_url);

        let tp = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(exporter)
            .install_batch(opentelemetry_sdk::runtime::Tokio)
            .expect("init: opentelemetry");

        let tt = tp.tracer("zkevm-bridge-log");

        tracing_opentelemetry::layer().with_tracer(tt)
    });

    tracing_subscriber::registry()
        .with(stdout_sub)
        .with(otel_sub)
        .try_init()
}

/// Gets the OTLP URL from the standard envvar.
pub fn get_otlp_url_from_env() -> Option<String> {
    env::var(OTLP_URL_ENVVAR).ok()
}

/// Gets the service label from the standard envvar, which should be included
/// in the whoami string.
pub fn get_service_label_from_env() -> Option<String> {
    env::var(SVC_LABEL_ENVVAR).ok()
}

/// Computes a standard whoami string.
pub fn get_whoami_string(base: &str) -> String {
    match get_service_label_from_env() {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_for_tests_is_idempotent() {
        init_for_tests();
        init_for_tests();
        info!("still alive");
    }

    #[test]
    fn test_second_install_is_refused() {
        init_for_tests();

        let config = LoggerConfig::with_base_name("bridge-tests");
        assert!(install(&config, EnvFilter::new("debug"), false).is_err());
    }

    #[test]
    fn test_logger_config_keeps_otlp_url() {
        let mut config = LoggerConfig::new("bridge-tests".to_owned());
        assert!(config.otel_url.is_none());

        config.set_otlp_url("http://127.0.0.1:4317".to_owned());
        assert_eq!(config.otel_url.as_deref(), Some("http://127.0.0.1:4317"));
        assert_eq!(config.whoami, "bridge-tests");
    }
}
