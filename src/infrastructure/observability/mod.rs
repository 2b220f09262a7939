use crate::config::Config;
use metrics::{describe_counter, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const DEFAULT_FILTER: &str = "slotdesk=debug,sqlx=warn";

/// Counters exported on the Prometheus endpoint.
const COUNTERS: &[(&str, &str)] = &[
    ("bookings_reserved_total", "Slots successfully reserved"),
    (
        "booking_conflicts_total",
        "Reservations that lost to a concurrent booking",
    ),
    ("bookings_cancelled_total", "Bookings cancelled by clients"),
    (
        "bookings_expired_total",
        "Bookings closed after their slot passed",
    ),
    ("slots_generated_total", "Slots added by regeneration"),
    ("slots_pruned_total", "Past free slots deleted"),
    ("reminders_sent_total", "Reminders delivered, by kind"),
    ("notifications_failed_total", "Outbound messages that failed"),
    ("admin_alerts_total", "Admin alerts raised, by severity"),
    ("scheduler_ticks_total", "Reconciliation ticks, by outcome"),
];

/// Keeps exporters alive; flushes pending spans on drop when OTLP is on.
pub struct ObservabilityGuard {
    otlp: bool,
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        if self.otlp {
            shutdown();
        }
    }
}

pub fn init(config: &Config) -> anyhow::Result<ObservabilityGuard> {
    let tracer = match &config.otel_exporter_endpoint {
        Some(endpoint) => Some(otlp_tracer(endpoint, &config.service_name)?),
        None => None,
    };
    let otlp = tracer.is_some();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_thread_ids(true)
        .with_target(true);

    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .with(tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer)))
        .try_init()?;

    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.metrics_port))
        .install()?;
    for (name, help) in COUNTERS {
        describe_counter!(*name, Unit::Count, *help);
    }

    tracing::info!(
        otlp,
        metrics_port = config.metrics_port,
        service = %config.service_name,
        "Observability initialized"
    );
    Ok(ObservabilityGuard { otlp })
}

fn otlp_tracer(endpoint: &str, service_name: &str) -> anyhow::Result<sdktrace::Tracer> {
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint);

    let resource = Resource::new(vec![KeyValue::new(
        "service.name",
        service_name.to_string(),
    )]);

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(sdktrace::config().with_resource(resource))
        .install_batch(runtime::Tokio)?;
    Ok(tracer)
}

pub fn shutdown() {
    opentelemetry::global::shutdown_tracer_provider();
}
