//! Pipeline diagnostics: timing and counts for each stage.
//!
//! Every call to [`process_staged_with_diagnostics`](crate::process_staged_with_diagnostics)
//! collects these alongside the stage outputs. They exist for comparing the
//! two storage forms and for tuning the threshold.
//!
//! Time is read through the [`Clock`] trait so the library stays free of
//! platform clocks; the bench binary supplies a [`std::time::Instant`]
//! backed implementation.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::GRAYSCALE_WHITE;

/// Source of monotonic timestamps.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Which pixel storage model a run used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageKind {
    /// Contiguous buffer, direct indexing.
    Flat,
    /// Linked chain of pixel nodes, three-lane window.
    Chained,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => f.write_str("flat"),
            Self::Chained => f.write_str("chained"),
        }
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Storage model the run used.
    pub storage: StorageKind,
    /// Stage 1: grayscale conversion.
    pub grayscale: StageDiagnostics,
    /// Stage 2: Gaussian blur.
    pub blur: StageDiagnostics,
    /// Stage 3: Sobel edge detection.
    pub sobel: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Grayscale conversion metrics.
    Grayscale {
        /// Components per input pixel.
        input_components: usize,
        /// Mean output luminance.
        mean_luma: f64,
    },
    /// Gaussian blur metrics.
    Blur {
        /// Kernel divisor in use.
        divisor: i32,
        /// Pixels that were convolved (not copied from the border).
        interior_pixels: usize,
    },
    /// Sobel edge detection metrics.
    Sobel {
        /// Binarization threshold.
        threshold: f64,
        /// Interior pixels rendered white.
        edge_pixel_count: usize,
        /// Interior pixel count, for computing edge density.
        interior_pixels: usize,
    },
}

/// High-level summary for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Image width in pixels.
    pub image_width: usize,
    /// Image height in pixels.
    pub image_height: usize,
    /// Total pixel count.
    pub pixel_count: usize,
    /// Interior pixels rendered white in the final edge map.
    pub edge_pixel_count: usize,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!("Storage: {}", self.storage));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Grayscale", &self.grayscale),
            ("Blur", &self.blur),
            ("Sobel", &self.sobel),
        ];
        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!("Edge pixels: {}", self.summary.edge_pixel_count));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Grayscale {
            input_components,
            mean_luma,
        } => format!("{input_components} -> 1 components, mean={mean_luma:.1}"),
        StageMetrics::Blur {
            divisor,
            interior_pixels,
        } => format!("divisor={divisor} interior={interior_pixels}"),
        StageMetrics::Sobel {
            threshold,
            edge_pixel_count,
            interior_pixels,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *interior_pixels > 0 {
                *edge_pixel_count as f64 / *interior_pixels as f64 * 100.0
            } else {
                0.0
            };
            format!("threshold={threshold:.1} edges={edge_pixel_count} ({density:.1}%)")
        }
    }
}

/// Count white samples in an iterator over grayscale samples.
pub(crate) fn count_edge_pixels(samples: impl IntoIterator<Item = u8>) -> usize {
    samples
        .into_iter()
        .filter(|&s| s == GRAYSCALE_WHITE)
        .count()
}

/// Mean of an iterator over grayscale samples.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean_sample(samples: impl IntoIterator<Item = u8>) -> f64 {
    let (sum, count) = samples
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), s| (sum + u64::from(s), count + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}
