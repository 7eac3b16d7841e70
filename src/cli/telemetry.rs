//! Log subscriber setup and optional OTLP span export.
//!
//! Export is switched on by `OTEL_EXPORTER_OTLP_ENDPOINT`. A bare `host:port`
//! is treated as a plain-text collector; `https://` endpoints get TLS with the
//! platform root store.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use opentelemetry::{
    KeyValue, global, propagation::TextMapCompositePropagator, trace::TracerProvider as _,
};
use opentelemetry_otlp::{
    Compression, SpanExporter, WithExportConfig, WithTonicConfig,
    tonic_types::transport::ClientTlsConfig,
};
use opentelemetry_sdk::{
    Resource,
    propagation::{BaggagePropagator, TraceContextPropagator},
    trace::{SdkTracerProvider, Tracer},
};
use std::{env::var, time::Duration};
use tracing::{Level, debug};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};
use ulid::Ulid;

const EXPORT_TIMEOUT: Duration = Duration::from_secs(3);

static TRACER_PROVIDER: OnceCell<SdkTracerProvider> = OnceCell::new();

/// Where spans are shipped.
#[derive(Debug, PartialEq, Eq)]
struct Collector {
    endpoint: String,
    /// Server name for TLS, set only for `https://` endpoints.
    tls_domain: Option<String>,
}

impl Collector {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim().trim_end_matches('/');
        let endpoint = if raw.starts_with("http://") || raw.starts_with("https://") {
            raw.to_string()
        } else {
            format!("http://{raw}")
        };

        let tls_domain = endpoint
            .strip_prefix("https://")
            .and_then(|rest| rest.split(['/', ':']).next())
            .filter(|host| !host.is_empty())
            .map(str::to_string);

        Self {
            endpoint,
            tls_domain,
        }
    }
}

fn init_tracer(collector: &Collector) -> Result<Tracer> {
    let mut builder = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&collector.endpoint)
        .with_compression(Compression::Gzip)
        .with_timeout(EXPORT_TIMEOUT);

    if let Some(domain) = &collector.tls_domain {
        builder = builder.with_tls_config(
            ClientTlsConfig::new()
                .domain_name(domain.clone())
                .with_native_roots(),
        );
    }

    let exporter = builder
        .build()
        .with_context(|| format!("Failed to build OTLP exporter for {}", collector.endpoint))?;

    let instance_id = var("OTEL_SERVICE_INSTANCE_ID").unwrap_or_else(|_| Ulid::new().to_string());
    let resource = Resource::builder_empty()
        .with_attributes([
            KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("service.instance.id", instance_id),
        ])
        .build();

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build();

    let _ = TRACER_PROVIDER.set(provider.clone());
    global::set_tracer_provider(provider.clone());
    global::set_text_map_propagator(TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ]));

    debug!(
        endpoint = %collector.endpoint,
        tls = collector.tls_domain.is_some(),
        "OTLP export enabled"
    );

    Ok(provider.tracer(env!("CARGO_PKG_NAME")))
}

/// Install the global subscriber, adding the OTLP layer when a collector is
/// configured.
///
/// # Errors
/// Returns an error if the exporter or the subscriber cannot be installed.
pub fn init(verbosity_level: Option<Level>) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_target(false);

    let filter = EnvFilter::builder()
        .with_default_directive(verbosity_level.unwrap_or(Level::ERROR).into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("tokio=error".parse()?)
        .add_directive("sqlx=warn".parse()?)
        .add_directive("opentelemetry_sdk=warn".parse()?);

    let registry = Registry::default().with(fmt_layer).with(filter);

    match var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        Ok(raw) => {
            let tracer = init_tracer(&Collector::parse(&raw))?;
            tracing::subscriber::set_global_default(
                registry.with(tracing_opentelemetry::layer().with_tracer(tracer)),
            )?;
        }
        Err(_) => tracing::subscriber::set_global_default(registry)?,
    }

    Ok(())
}

/// Flush and stop the exporter, if one was started.
pub fn shutdown_tracer() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(err) = provider.shutdown() {
            debug!("tracer provider shutdown failed: {err}");
        }
    }
}
