//! Outcome tracking for catalog lookups
//!
//! Counts successes and failures per lookup kind so a run can report what degraded.

use crate::error::CatalogError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageMetrics {
    pub stage: String,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub average_response_time_ms: f64,
    pub total_response_time_ms: u64,
    pub timeout_count: u64,
    pub status_failures: u64,
    pub extraction_misses: u64,
    pub malformed_payloads: u64,
}

impl StageMetrics {
    pub fn new(stage: String) -> Self {
        Self {
            stage,
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            last_success: None,
            last_failure: None,
            last_error: None,
            average_response_time_ms: 0.0,
            total_response_time_ms: 0,
            timeout_count: 0,
            status_failures: 0,
            extraction_misses: 0,
            malformed_payloads: 0,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.successful_requests as f64 / self.total_requests as f64) * 100.0
        }
    }

    pub fn record_success(&mut self, response_time: Duration) {
        self.total_requests += 1;
        self.successful_requests += 1;
        self.last_success = Some(Utc::now());

        let response_ms = response_time.as_millis() as u64;
        self.total_response_time_ms += response_ms;
        self.average_response_time_ms =
            self.total_response_time_ms as f64 / self.successful_requests as f64;
    }

    pub fn record_failure(&mut self, error: &CatalogError) {
        self.total_requests += 1;
        self.failed_requests += 1;
        self.last_failure = Some(Utc::now());
        self.last_error = Some(error.to_string());

        match error {
            CatalogError::Timeout { .. } => self.timeout_count += 1,
            CatalogError::Status { .. } => self.status_failures += 1,
            CatalogError::ExtractionMiss { .. } => self.extraction_misses += 1,
            CatalogError::MalformedPayload(_) => self.malformed_payloads += 1,
            CatalogError::Transport(_) => {}
        }
    }
}

/// Shared tracker, one `StageMetrics` per lookup kind
pub struct MetricsTracker {
    metrics: Mutex<HashMap<String, StageMetrics>>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self {
            metrics: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, StageMetrics>> {
        self.metrics.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_success(&self, stage: &str, response_time: Duration) {
        let mut metrics = self.lock();
        let stage_metrics = metrics
            .entry(stage.to_string())
            .or_insert_with(|| StageMetrics::new(stage.to_string()));
        stage_metrics.record_success(response_time);

        log::debug!(
            "[{}] Success - Response time: {}ms - Success rate: {:.2}%",
            stage,
            response_time.as_millis(),
            stage_metrics.success_rate()
        );
    }

    pub fn record_failure(&self, stage: &str, error: &CatalogError) {
        let mut metrics = self.lock();
        let stage_metrics = metrics
            .entry(stage.to_string())
            .or_insert_with(|| StageMetrics::new(stage.to_string()));
        stage_metrics.record_failure(error);

        log::debug!(
            "[{}] Failure - Error: {} - Success rate: {:.2}%",
            stage,
            error,
            stage_metrics.success_rate()
        );
    }

    pub fn get_metrics(&self, stage: &str) -> Option<StageMetrics> {
        self.lock().get(stage).cloned()
    }

    /// All tracked stages, sorted by name
    pub fn get_all_metrics(&self) -> Vec<StageMetrics> {
        let mut all: Vec<StageMetrics> = self.lock().values().cloned().collect();
        all.sort_by(|a, b| a.stage.cmp(&b.stage));
        all
    }

    pub fn log_summary(&self) {
        for m in self.get_all_metrics() {
            log::info!(
                "[{}] {} requests, {} ok, {} failed ({:.2}% success, avg {:.2}ms)",
                m.stage,
                m.total_requests,
                m.successful_requests,
                m.failed_requests,
                m.success_rate(),
                m.average_response_time_ms
            );
            if let Some(last_error) = &m.last_error {
                log::info!("[{}] Last error: {}", m.stage, last_error);
            }
        }
    }

    pub fn export_json(&self) -> String {
        serde_json::to_string_pretty(&self.get_all_metrics()).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Time a lookup and record its outcome under `stage`
pub async fn track_request<F, T>(
    tracker: &MetricsTracker,
    stage: &str,
    operation: F,
) -> Result<T, CatalogError>
where
    F: std::future::Future<Output = Result<T, CatalogError>>,
{
    let start = Instant::now();
    let result = operation.await;
    let duration = start.elapsed();

    match &result {
        Ok(_) => tracker.record_success(stage, duration),
        Err(e) => tracker.record_failure(stage, e),
    }

    result
}
