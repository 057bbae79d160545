// Prometheus counters for the judging surface

use lazy_static::lazy_static;
use prepjudge_common::types::OverallStatus;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    static ref JUDGEMENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "prepjudge_judgements_total",
        "Completed judgements by path and overall status",
        &["path", "status"]
    )
    .expect("judgements counter registers once");
    static ref FALLBACK_JUDGEMENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "prepjudge_fallback_judgements_total",
        "Judgements that used an approximate local execution tier",
        &["path"]
    )
    .expect("fallback counter registers once");
}

pub fn record_judgement(path: &str, status: OverallStatus, used_fallback: bool) {
    JUDGEMENTS_TOTAL
        .with_label_values(&[path, status.as_str()])
        .inc();
    if used_fallback {
        FALLBACK_JUDGEMENTS_TOTAL.with_label_values(&[path]).inc();
    }
}

pub fn record_fallback(path: &str) {
    FALLBACK_JUDGEMENTS_TOTAL.with_label_values(&[path]).inc();
}

/// Render every registered metric in the Prometheus text format.
pub fn render() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
