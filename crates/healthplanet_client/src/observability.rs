//! Fetch counters. These are no-ops unless the application installs a
//! `metrics` recorder.

use crate::HealthPlanetError;
use crate::schema::Category;

pub const STATUS_REQUESTS: &str = "healthplanet_status_requests_total";
pub const RECORDS: &str = "healthplanet_records_total";
pub const FAILURES: &str = "healthplanet_failures_total";

/// Counts a status request that is about to go on the wire.
pub fn record_request(category: Category) {
    let label = category.scope().as_str();
    metrics::counter!(STATUS_REQUESTS, "category" => label).increment(1);
}

pub fn record_fetch(category: Category, records: usize) {
    let label = category.scope().as_str();
    metrics::counter!(RECORDS, "category" => label).increment(records as u64);
}

pub fn record_failure(category: Category, err: &HealthPlanetError) {
    let label = category.scope().as_str();
    metrics::counter!(FAILURES, "category" => label, "kind" => err.kind()).increment(1);
}
