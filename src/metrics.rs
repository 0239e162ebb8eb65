//! Performance metrics and statistics tracking for the screening service.

use crate::types::prediction::ScreeningOutcome;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for screening submissions
pub struct ScreeningMetrics {
    /// Total submissions classified
    pub submissions_processed: AtomicU64,
    /// Submissions rejected before inference (validation, reindex)
    pub submissions_rejected: AtomicU64,
    /// Submissions with label 0 (CKD indicated)
    ckd_indicated: AtomicU64,
    /// Submissions with label 1 (CKD not indicated)
    not_indicated: AtomicU64,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Confidence distribution buckets
    confidence_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ScreeningMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            submissions_processed: AtomicU64::new(0),
            submissions_rejected: AtomicU64::new(0),
            ckd_indicated: AtomicU64::new(0),
            not_indicated: AtomicU64::new(0),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            confidence_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a classified submission
    pub fn record_screening(
        &self,
        processing_time: Duration,
        outcome: ScreeningOutcome,
        confidence: f64,
    ) {
        self.submissions_processed.fetch_add(1, Ordering::Relaxed);

        match outcome {
            ScreeningOutcome::CkdIndicated => self.ckd_indicated.fetch_add(1, Ordering::Relaxed),
            ScreeningOutcome::NotIndicated => self.not_indicated.fetch_add(1, Ordering::Relaxed),
        };

        // Record processing time
        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        // Record confidence bucket
        let bucket = (confidence * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.confidence_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a submission rejected before reaching the model
    pub fn record_rejection(&self) {
        self.submissions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = self.processing_times.read().unwrap();
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (submissions per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.submissions_processed.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get outcome counts as (ckd_indicated, not_indicated)
    pub fn get_outcome_counts(&self) -> (u64, u64) {
        (
            self.ckd_indicated.load(Ordering::Relaxed),
            self.not_indicated.load(Ordering::Relaxed),
        )
    }

    /// Get confidence distribution
    pub fn get_confidence_distribution(&self) -> [u64; 10] {
        *self.confidence_buckets.read().unwrap()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let processed = self.submissions_processed.load(Ordering::Relaxed);
        let rejected = self.submissions_rejected.load(Ordering::Relaxed);
        let (indicated, not_indicated) = self.get_outcome_counts();
        let indicated_rate = if processed > 0 {
            (indicated as f64 / processed as f64) * 100.0
        } else {
            0.0
        };

        let processing = self.get_processing_stats();
        let throughput = self.get_throughput();
        let confidence_dist = self.get_confidence_distribution();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║             CKD SCREENING SERVICE - METRICS SUMMARY          ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Submissions Classified: {:>8}  │  Throughput: {:>6.2} /s   ║",
            processed, throughput
        );
        info!(
            "║ Submissions Rejected:   {:>8}                              ║",
            rejected
        );
        info!(
            "║ CKD Indicated:          {:>8}  │  Rate: {:>6.1}%           ║",
            indicated, indicated_rate
        );
        info!(
            "║ CKD Not Indicated:      {:>8}                              ║",
            not_indicated
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Processing Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Confidence Distribution:                                     ║");
        let total: u64 = confidence_dist.iter().sum();
        for (i, &count) in confidence_dist.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar_len = (pct / 2.0) as usize;
            let bar: String = "█".repeat(bar_len.min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for ScreeningMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<ScreeningMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<ScreeningMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = ScreeningMetrics::new();

        metrics.record_screening(
            Duration::from_micros(100),
            ScreeningOutcome::CkdIndicated,
            0.91,
        );
        metrics.record_screening(
            Duration::from_micros(200),
            ScreeningOutcome::NotIndicated,
            0.87,
        );
        metrics.record_rejection();

        assert_eq!(metrics.submissions_processed.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.submissions_rejected.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.get_outcome_counts(), (1, 1));
    }

    #[test]
    fn test_confidence_buckets() {
        let metrics = ScreeningMetrics::new();

        metrics.record_screening(
            Duration::from_micros(50),
            ScreeningOutcome::NotIndicated,
            0.95,
        );

        let dist = metrics.get_confidence_distribution();
        assert_eq!(dist[9], 1);
        assert_eq!(dist.iter().sum::<u64>(), 1);
    }

    #[test]
    fn test_processing_stats() {
        let metrics = ScreeningMetrics::new();

        for us in [100, 200, 300] {
            metrics.record_screening(
                Duration::from_micros(us),
                ScreeningOutcome::NotIndicated,
                0.8,
            );
        }

        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean_us, 200);
        assert_eq!(stats.max_us, 300);
    }
}
