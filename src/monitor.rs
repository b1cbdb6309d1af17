// ABOUTME: Background resource monitor sampling CPU and memory during long migrations
// ABOUTME: Runs on a dedicated OS thread and produces a summary when stopped

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use sysinfo::System;

use crate::error::{Error, Result};

/// One point-in-time reading of system load.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub cpu_percent: f32,
    pub used_memory_bytes: u64,
}

/// Aggregated readings over the monitored window.
#[derive(Debug, Clone)]
pub struct MonitorSummary {
    pub sample_count: usize,
    pub avg_cpu_percent: f32,
    pub max_cpu_percent: f32,
    pub avg_memory_bytes: u64,
    pub max_memory_bytes: u64,
    pub elapsed: Duration,
}

impl MonitorSummary {
    fn from_samples(samples: &[Sample], elapsed: Duration) -> Self {
        let sample_count = samples.len();
        let mut summary = MonitorSummary {
            sample_count,
            avg_cpu_percent: 0.0,
            max_cpu_percent: 0.0,
            avg_memory_bytes: 0,
            max_memory_bytes: 0,
            elapsed,
        };
        if sample_count == 0 {
            return summary;
        }

        let mut cpu_total = 0.0f32;
        let mut mem_total = 0u64;
        for sample in samples {
            cpu_total += sample.cpu_percent;
            mem_total += sample.used_memory_bytes;
            summary.max_cpu_percent = summary.max_cpu_percent.max(sample.cpu_percent);
            summary.max_memory_bytes = summary.max_memory_bytes.max(sample.used_memory_bytes);
        }
        summary.avg_cpu_percent = cpu_total / sample_count as f32;
        summary.avg_memory_bytes = mem_total / sample_count as u64;
        summary
    }
}

impl std::fmt::Display for MonitorSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cpu avg {:.1}% max {:.1}%, memory avg {} MB max {} MB over {} samples in {:.1}s",
            self.avg_cpu_percent,
            self.max_cpu_percent,
            self.avg_memory_bytes / (1024 * 1024),
            self.max_memory_bytes / (1024 * 1024),
            self.sample_count,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Samples system CPU and memory on a background OS thread.
///
/// Sampling runs off the async runtime so a stalled executor cannot distort
/// the readings. [`ResourceMonitor::stop`] waits for the thread to exit
/// within a timeout and returns the summary.
pub struct ResourceMonitor {
    stop_flag: Arc<AtomicBool>,
    samples: Arc<Mutex<Vec<Sample>>>,
    done_rx: mpsc::Receiver<()>,
    handle: Option<JoinHandle<()>>,
    started_at: Instant,
}

impl ResourceMonitor {
    /// Start sampling every `interval`.
    pub fn start(interval: Duration) -> Self {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let samples = Arc::new(Mutex::new(Vec::new()));
        let (done_tx, done_rx) = mpsc::channel();

        let thread_flag = Arc::clone(&stop_flag);
        let thread_samples = Arc::clone(&samples);
        let handle = std::thread::Builder::new()
            .name("resource-monitor".into())
            .spawn(move || {
                let mut system = System::new();
                // First reading after a refresh pair; sysinfo needs a delta
                // between refreshes for meaningful CPU usage.
                system.refresh_cpu_usage();

                while !thread_flag.load(Ordering::Relaxed) {
                    std::thread::sleep(interval);
                    system.refresh_cpu_usage();
                    system.refresh_memory();

                    let sample = Sample {
                        cpu_percent: system.global_cpu_usage(),
                        used_memory_bytes: system.used_memory(),
                    };
                    if let Ok(mut samples) = thread_samples.lock() {
                        samples.push(sample);
                    }
                }
                let _ = done_tx.send(());
            })
            .ok();

        Self {
            stop_flag,
            samples,
            done_rx,
            handle,
            started_at: Instant::now(),
        }
    }

    /// Stop the monitor and collect the summary.
    ///
    /// Fails with [`Error::MonitorTimeout`] if the sampling thread does not
    /// acknowledge the stop within `timeout`.
    pub fn stop(mut self, timeout: Duration) -> Result<MonitorSummary> {
        self.stop_flag.store(true, Ordering::Relaxed);

        if self.handle.is_some() {
            match self.done_rx.recv_timeout(timeout) {
                Ok(()) => {
                    if let Some(handle) = self.handle.take() {
                        let _ = handle.join();
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Err(Error::MonitorTimeout(timeout)),
                Err(RecvTimeoutError::Disconnected) => {}
            }
        }

        let samples = self
            .samples
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        Ok(MonitorSummary::from_samples(
            &samples,
            self.started_at.elapsed(),
        ))
    }
}

impl Drop for ResourceMonitor {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_samples_and_stops() {
        let monitor = ResourceMonitor::start(Duration::from_millis(20));
        std::thread::sleep(Duration::from_millis(120));
        let summary = monitor.stop(Duration::from_secs(2)).unwrap();

        assert!(summary.sample_count >= 1);
        assert!(summary.max_cpu_percent >= summary.avg_cpu_percent);
        assert!(summary.max_memory_bytes >= summary.avg_memory_bytes);
    }

    #[test]
    fn empty_window_yields_zeroed_summary() {
        let summary = MonitorSummary::from_samples(&[], Duration::from_secs(1));
        assert_eq!(summary.sample_count, 0);
        assert_eq!(summary.avg_cpu_percent, 0.0);
        assert_eq!(summary.max_memory_bytes, 0);
    }

    #[test]
    fn summary_aggregates_avg_and_max() {
        let samples = [
            Sample {
                cpu_percent: 10.0,
                used_memory_bytes: 100,
            },
            Sample {
                cpu_percent: 30.0,
                used_memory_bytes: 300,
            },
        ];
        let summary = MonitorSummary::from_samples(&samples, Duration::from_secs(1));
        assert_eq!(summary.sample_count, 2);
        assert_eq!(summary.avg_cpu_percent, 20.0);
        assert_eq!(summary.max_cpu_percent, 30.0);
        assert_eq!(summary.avg_memory_bytes, 200);
        assert_eq!(summary.max_memory_bytes, 300);
    }
}
