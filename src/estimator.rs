// src/estimator.rs

use serde::{Deserialize, Serialize};

/// Weight of the most recent observation in the moving average.
/// Close to 1 the prediction follows the last transfer, close to 0 it follows history.
pub const PREDICT_WEIGHT: f64 = 0.4;

/// Seed for the per-URL size prediction (100 MB).
/// A low seed makes the bar jump early and then crawl, so start pessimistic.
pub const INITIAL_BYTES_PER_URL: f64 = 100_000_000.0;

/// Smallest size prediction the estimator will ever use, in bytes.
pub const MIN_PREDICTION: f64 = 1.0;

/// Exponentially weighted moving average step.
///
/// Returns `last_prediction` unchanged when `actual == last_prediction`.
pub fn predict_next(last_prediction: f64, actual: f64) -> f64 {
    last_prediction * (1.0 - PREDICT_WEIGHT) + actual * PREDICT_WEIGHT
}

/// Turns streaming byte counts from a sequence of transfers of unknown size
/// into an overall completion percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimator {
    total_bytes: u64,
    current_bytes: u64,
    expected_bytes_per_url: f64,
    urls_completed: usize,
    total_urls: usize,
}

impl Estimator {
    /// Create an estimator for `total_urls` transfers, seeded with 100 MB per URL.
    pub fn new(total_urls: usize) -> Self {
        Self::with_initial_prediction(total_urls, INITIAL_BYTES_PER_URL)
    }

    /// Create an estimator with a custom per-URL seed, floored at one byte.
    pub fn with_initial_prediction(total_urls: usize, initial_bytes_per_url: f64) -> Self {
        Self {
            total_bytes: 0,
            current_bytes: 0,
            expected_bytes_per_url: initial_bytes_per_url.max(MIN_PREDICTION),
            urls_completed: 0,
            total_urls,
        }
    }

    /// Resets the current-transfer counter. Must be called before the first chunk of a URL.
    pub fn begin_transfer(&mut self) {
        self.current_bytes = 0;
    }

    /// Accounts for one received chunk and returns the estimated percentage done.
    ///
    /// The value is not clamped: it can exceed 100 when the remaining work is
    /// underestimated, and it can go down between two calls when a transfer
    /// outgrows its prediction.
    pub fn on_chunk_received(&mut self, chunk_len: u64) -> u64 {
        self.total_bytes += chunk_len;
        self.current_bytes += chunk_len;

        let total = self.total_bytes as i64;
        let current = self.current_bytes as i64;
        // The in-flight URL still counts as left until `on_url_completed`.
        let urls_left = self.total_urls as i64 - self.urls_completed as i64;

        let estimate_current = if self.current_bytes as f64 > self.expected_bytes_per_url {
            // Past the prediction: assume another third is still coming.
            current * 4 / 3
        } else {
            self.expected_bytes_per_url as i64
        };
        let estimate_current = estimate_current.max(MIN_PREDICTION as i64);

        let next_prediction = predict_next(self.expected_bytes_per_url, estimate_current as f64) as i64;

        let predicted_total = (total
            + (estimate_current - current)
            + (urls_left - 1) * next_prediction)
            .max(1);

        // Both operands are non-negative.
        (total * 100 / predicted_total) as u64
    }

    /// Folds the finished transfer into the prediction and moves on to the next URL.
    pub fn on_url_completed(&mut self) {
        self.expected_bytes_per_url =
            predict_next(self.expected_bytes_per_url, self.current_bytes as f64).max(MIN_PREDICTION);
        if self.urls_completed < self.total_urls {
            self.urls_completed += 1;
        }
        self.current_bytes = 0;
    }

    /// Bytes received across every transfer so far.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Bytes received for the transfer in flight.
    pub fn current_bytes(&self) -> u64 {
        self.current_bytes
    }

    /// Current prediction of a typical transfer size.
    pub fn expected_bytes_per_url(&self) -> f64 {
        self.expected_bytes_per_url
    }

    /// Number of transfers finished, successful or not.
    pub fn urls_completed(&self) -> usize {
        self.urls_completed
    }

    /// Number of transfers in the run.
    pub fn total_urls(&self) -> usize {
        self.total_urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn prediction_is_fixed_point_when_actual_matches() {
        for p in [0.0, 1.0, 1234.5, 100_000_000.0] {
            assert!(close(predict_next(p, p), p));
        }
    }

    #[test]
    fn prediction_uses_weight_of_point_four() {
        assert!(close(predict_next(0.0, 1000.0), 400.0));
        assert!(close(predict_next(1000.0, 0.0), 600.0));
        assert!(close(predict_next(100_000_000.0, 50_000_000.0), 80_000_000.0));
    }

    #[test]
    fn single_chunk_below_prediction() {
        let mut est = Estimator::new(1);
        est.begin_transfer();
        let percent = est.on_chunk_received(40_000_000);

        assert_eq!(est.total_bytes(), 40_000_000);
        assert_eq!(est.current_bytes(), 40_000_000);
        // predicted total = 40M + (100M - 40M) + 0 = 100M
        assert_eq!(percent, 40);
    }

    #[test]
    fn remaining_urls_are_sized_with_fresh_prediction() {
        let mut est = Estimator::new(3);
        est.begin_transfer();
        // 10M + 90M + 2 * 100M
        assert_eq!(est.on_chunk_received(10_000_000), 3);
    }

    #[test]
    fn percentage_can_drop_when_transfer_outgrows_prediction() {
        let mut est = Estimator::new(1);
        est.begin_transfer();
        let first = est.on_chunk_received(90_000_000);
        let second = est.on_chunk_received(20_000_000);

        assert_eq!(first, 90);
        // 110M * 4 / 3 = 146666666, predicted total is the same
        assert_eq!(second, 75);
        assert!(second < first);
    }

    #[test]
    fn two_url_scenario() {
        let mut est = Estimator::new(2);

        est.begin_transfer();
        assert_eq!(est.on_chunk_received(50_000_000), 25);
        est.on_url_completed();

        assert!(close(est.expected_bytes_per_url(), 80_000_000.0));
        assert_eq!(est.urls_completed(), 1);
        assert_eq!(est.current_bytes(), 0);

        est.begin_transfer();
        let percent = est.on_chunk_received(200_000_000);
        // estimate = 266666666, urls_left = 1
        // predicted total = 250M + 66666666 = 316666666
        assert_eq!(percent, 78);

        est.on_url_completed();
        assert_eq!(est.urls_completed(), 2);
        assert_eq!(est.total_bytes(), 250_000_000);
    }

    #[test]
    fn empty_transfers_never_zero_the_prediction() {
        let mut est = Estimator::with_initial_prediction(2000, 1.0);
        for _ in 0..2000 {
            est.begin_transfer();
            est.on_url_completed();
        }
        assert!(est.expected_bytes_per_url() >= MIN_PREDICTION);
        assert_eq!(est.urls_completed(), 2000);

        let mut est = Estimator::with_initial_prediction(1, 0.0);
        est.begin_transfer();
        assert_eq!(est.on_chunk_received(0), 0);
    }

    #[test]
    fn completed_count_saturates() {
        let mut est = Estimator::new(1);
        est.on_url_completed();
        est.on_url_completed();
        assert_eq!(est.urls_completed(), 1);

        // Out of protocol the predicted total collapses to the floor of one
        // byte, so the percentage goes far past 100 instead of panicking.
        est.begin_transfer();
        assert_eq!(est.on_chunk_received(10), 1000);
    }
}
