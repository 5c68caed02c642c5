//! Pass/fail and timing report formatting.

use std::fmt;

use serde::Serialize;

use crate::perf::{OpKind, Sample};
use crate::{format_size, FlashGeometry};

/// Final verdict of a qualification run.
///
/// Produced once by the driver and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct QualificationOutcome {
    /// Whether probe and sweep both passed.
    pub success: bool,
    /// Base address of the first failing block, when a block failed.
    pub failing_address: Option<u64>,
    /// Capacity the probe detected, when detection itself completed.
    pub detected_capacity: Option<u64>,
}

impl fmt::Display for QualificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(capacity) = self.detected_capacity {
            writeln!(f, "Detected capacity: {}", format_size(capacity))?;
        }
        if let Some(addr) = self.failing_address {
            writeln!(f, "First failing block: 0x{addr:x}")?;
        }
        write!(f, "{}", if self.success { "FLASH OK" } else { "FLASH DEFECT" })
    }
}

/// Derived timing metrics for one operation kind.
#[derive(Debug, Clone, Serialize)]
pub struct PerfSummary {
    /// Operation the samples cover.
    pub op: OpKind,
    /// Number of samples taken.
    pub samples: usize,
    /// Mean per-call latency in nanoseconds.
    pub mean_latency_ns: f64,
    /// Derived throughput in bytes per second.
    pub throughput_bytes_per_sec: f64,
    /// Mean gap from one call's end to the next call's start, in
    /// nanoseconds. Zero with fewer than two samples.
    pub mean_gap_ns: f64,
}

impl PerfSummary {
    /// Compute the derived metrics for one sample sequence.
    #[must_use]
    pub fn from_samples(op: OpKind, samples: &[Sample], geometry: &FlashGeometry) -> Self {
        let count = samples.len();
        let mean_latency_ns = if count == 0 {
            0.0
        } else {
            let total: u64 = samples.iter().map(Sample::delta_ns).sum();
            total as f64 / count as f64
        };

        let throughput_bytes_per_sec = if mean_latency_ns > 0.0 {
            geometry.block_size as f64 / (mean_latency_ns / 1e9)
        } else {
            0.0
        };

        let mean_gap_ns = if count < 2 {
            0.0
        } else {
            let total: u64 = samples
                .windows(2)
                .map(|pair| pair[1].start_ns.saturating_sub(pair[0].end_ns))
                .sum();
            total as f64 / (count - 1) as f64
        };

        Self {
            op,
            samples: count,
            mean_latency_ns,
            throughput_bytes_per_sec,
            mean_gap_ns,
        }
    }
}

impl fmt::Display for PerfSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "average delta: {:.0} ns over {} samples",
            self.mean_latency_ns, self.samples
        )?;
        write!(
            f,
            "throughput: {}/s (mean gap {:.0} ns)",
            format_size(self.throughput_bytes_per_sec as u64),
            self.mean_gap_ns
        )
    }
}

/// Render the per-sample table, one `index;startNs;endNs;deltaNs` line per
/// sample.
#[must_use]
pub fn sample_table(samples: &[Sample]) -> String {
    let mut out = String::from("index;startNs;endNs;deltaNs\n");
    for (index, sample) in samples.iter().enumerate() {
        out.push_str(&format!(
            "{index};{};{};{}\n",
            sample.start_ns,
            sample.end_ns,
            sample.delta_ns()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> FlashGeometry {
        FlashGeometry::new(8 * 4096, 4096, 256).unwrap()
    }

    fn samples() -> Vec<Sample> {
        vec![
            Sample {
                start_ns: 100,
                end_ns: 200,
            },
            Sample {
                start_ns: 250,
                end_ns: 400,
            },
            Sample {
                start_ns: 430,
                end_ns: 480,
            },
        ]
    }

    #[test]
    fn test_summary_mean_latency() {
        let summary = PerfSummary::from_samples(OpKind::Erase, &samples(), &geometry());
        // deltas 100, 150, 50 -> mean 100
        assert!((summary.mean_latency_ns - 100.0).abs() < f64::EPSILON);
        assert_eq!(summary.samples, 3);
    }

    #[test]
    fn test_summary_throughput_positive_and_finite() {
        let summary = PerfSummary::from_samples(OpKind::Read, &samples(), &geometry());
        assert!(summary.throughput_bytes_per_sec.is_finite());
        assert!(summary.throughput_bytes_per_sec > 0.0);
        // 4096 bytes per 100 ns
        let expected = 4096.0 / (100.0 / 1e9);
        assert!((summary.throughput_bytes_per_sec - expected).abs() < 1.0);
    }

    #[test]
    fn test_summary_mean_gap() {
        let summary = PerfSummary::from_samples(OpKind::Erase, &samples(), &geometry());
        // gaps 50, 30 -> mean 40
        assert!((summary.mean_gap_ns - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_empty_samples() {
        let summary = PerfSummary::from_samples(OpKind::Write, &[], &geometry());
        assert_eq!(summary.samples, 0);
        assert!((summary.mean_latency_ns).abs() < f64::EPSILON);
        assert!((summary.throughput_bytes_per_sec).abs() < f64::EPSILON);
        assert!((summary.mean_gap_ns).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sample_table_format() {
        let table = sample_table(&samples()[..2]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "index;startNs;endNs;deltaNs");
        assert_eq!(lines[1], "0;100;200;100");
        assert_eq!(lines[2], "1;250;400;150");
    }

    #[test]
    fn test_outcome_display() {
        let outcome = QualificationOutcome {
            success: true,
            failing_address: None,
            detected_capacity: Some(8 * 1024 * 1024),
        };
        let text = outcome.to_string();
        assert!(text.contains("8.0M"));
        assert!(text.ends_with("FLASH OK"));

        let outcome = QualificationOutcome {
            success: false,
            failing_address: Some(0x5000),
            detected_capacity: Some(8 * 1024 * 1024),
        };
        let text = outcome.to_string();
        assert!(text.contains("0x5000"));
        assert!(text.ends_with("FLASH DEFECT"));
    }
}
