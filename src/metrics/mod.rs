/*!
 * # Metrics Module
 *
 * Prometheus counters for the inventory service, exposed in text format at
 * `/metrics`:
 *
 * - HTTP requests by method and status
 * - Item writes by operation
 * - Stock movements by type
 * - Lookup rows (category, supplier, location) created on first reference
 */

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::{error, warn};

use crate::entities::movement::MovementType;

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

fn counter_vec(name: &str, help: &str, labels: &[&str]) -> IntCounterVec {
    let counter = IntCounterVec::new(Opts::new(name, help), labels)
        .expect("static metric definition is valid");
    if let Err(err) = REGISTRY.register(Box::new(counter.clone())) {
        warn!(metric = name, error = %err, "failed to register metric");
    }
    counter
}

static HTTP_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    counter_vec(
        "stockpile_http_requests_total",
        "HTTP requests handled",
        &["method", "status"],
    )
});

static ITEM_WRITES: Lazy<IntCounterVec> = Lazy::new(|| {
    counter_vec(
        "stockpile_item_writes_total",
        "Item writes committed",
        &["operation"],
    )
});

static MOVEMENTS: Lazy<IntCounterVec> = Lazy::new(|| {
    counter_vec(
        "stockpile_movements_total",
        "Stock movements recorded",
        &["type"],
    )
});

static LOOKUPS_CREATED: Lazy<IntCounterVec> = Lazy::new(|| {
    counter_vec(
        "stockpile_lookups_created_total",
        "Categories, suppliers and locations created by name",
        &["kind"],
    )
});

pub fn record_http_request(method: &str, status: u16) {
    HTTP_REQUESTS
        .with_label_values(&[method, &status.to_string()])
        .inc();
}

pub fn record_item_write(operation: &str) {
    ITEM_WRITES.with_label_values(&[operation]).inc();
}

pub fn record_movement(movement_type: MovementType) {
    MOVEMENTS
        .with_label_values(&[movement_type.as_str()])
        .inc();
}

pub fn record_lookup_created(kind: &str) {
    LOOKUPS_CREATED.with_label_values(&[kind]).inc();
}

/// Renders every registered metric in the Prometheus text format.
pub fn metrics_text() -> Result<String, prometheus::Error> {
    // Families register lazily; force them before gathering.
    Lazy::force(&HTTP_REQUESTS);
    Lazy::force(&ITEM_WRITES);
    Lazy::force(&MOVEMENTS);
    Lazy::force(&LOOKUPS_CREATED);

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// `GET /metrics`
pub async fn metrics_handler() -> Response {
    match metrics_text() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_counters_show_up_in_text_output() {
        record_movement(MovementType::Out);
        record_lookup_created("supplier");

        let text = metrics_text().unwrap();
        assert!(text.contains("stockpile_movements_total"));
        assert!(text.contains("type=\"OUT\""));
        assert!(text.contains("kind=\"supplier\""));
    }
}
