//! Parallel dispatch of independent engine runs.
//!
//! Each configuration is pure, single-threaded computation over its
//! own random stream, so a fixed pool of worker threads drains a job
//! channel and pushes per-run outcomes into a result channel. The
//! result channel is the only shared resource; it serializes emission
//! without ever touching simulation state. A run that fails reports
//! its fault and leaves every sibling untouched.

use crate::plan::SweepPlan;
use lansim_core::{run_config, MetricsRecord, SimConfig, SimError};
use std::time::Instant;
use tracing::{error, info};

/// Outcome of one configuration's run, successful or not.
#[derive(Debug)]
pub struct RunOutcome {
    pub config: SimConfig,
    pub result: Result<MetricsRecord, SimError>,
}

/// Run the whole plan on `workers` threads and return all outcomes,
/// sorted for export (persistent first, then by arrival rate and
/// station count).
pub fn run_sweep(plan: &SweepPlan, workers: usize) -> Vec<RunOutcome> {
    let configs = plan.expand();
    let workers = workers.max(1).min(configs.len().max(1));
    info!(runs = configs.len(), workers, "starting sweep");

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<SimConfig>();
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<RunOutcome>();
    for cfg in configs {
        job_tx.send(cfg).expect("job channel open");
    }
    drop(job_tx);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for cfg in job_rx.iter() {
                    let started = Instant::now();
                    let result = run_config(&cfg);
                    match &result {
                        Ok(record) => info!(
                            persistent = cfg.persistent,
                            arrival_rate = cfg.arrival_rate,
                            stations = cfg.stations,
                            efficiency = record.efficiency,
                            throughput_mbps = record.throughput_mbps,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "run complete"
                        ),
                        Err(err) => error!(
                            persistent = cfg.persistent,
                            arrival_rate = cfg.arrival_rate,
                            stations = cfg.stations,
                            %err,
                            "run failed"
                        ),
                    }
                    let _ = result_tx.send(RunOutcome {
                        config: cfg,
                        result,
                    });
                }
            });
        }
        drop(result_tx);
    });

    let mut outcomes: Vec<RunOutcome> = result_rx.iter().collect();
    sort_outcomes(&mut outcomes);
    outcomes
}

/// Export order: persistent mode first, then ascending arrival rate,
/// then ascending station count.
pub fn sort_outcomes(outcomes: &mut [RunOutcome]) {
    outcomes.sort_by(|a, b| {
        b.config
            .persistent
            .cmp(&a.config.persistent)
            .then(a.config.arrival_rate.total_cmp(&b.config.arrival_rate))
            .then(a.config.stations.cmp(&b.config.stations))
    });
}
