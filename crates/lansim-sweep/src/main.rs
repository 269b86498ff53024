use anyhow::{bail, Result};
use lansim_core::queue::{run_queue, QueueConfig};
use lansim_sweep::{export, runner::run_sweep, SweepPlan};
use std::path::PathBuf;
use tracing::{error, info};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .compact()
        .init();

    let mut plan_path: Option<PathBuf> = None;
    let mut out_path: Option<PathBuf> = None;
    let mut workers = 8usize;
    let mut seed: Option<u64> = None;
    let mut queue_demo = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--plan" => {
                plan_path = Some(PathBuf::from(args.next().expect("Missing --plan value")));
            }
            "--out" => {
                out_path = Some(PathBuf::from(args.next().expect("Missing --out value")));
            }
            "--workers" => {
                workers = args.next().expect("Missing --workers value").parse()?;
            }
            "--seed" => {
                seed = Some(args.next().expect("Missing --seed value").parse()?);
            }
            "--queue-demo" => {
                queue_demo = true;
            }
            other => bail!("unknown argument: {other}"),
        }
    }

    if queue_demo {
        return run_queue_demo(seed.unwrap_or(0));
    }

    let mut plan = match plan_path {
        Some(path) => SweepPlan::from_toml_file(&path)?,
        None => SweepPlan::default(),
    };
    if let Some(seed) = seed {
        plan.seed = seed;
    }

    let outcomes = run_sweep(&plan, workers);
    let (successes, failures): (Vec<_>, Vec<_>) =
        outcomes.into_iter().partition(|o| o.result.is_ok());

    for failed in &failures {
        error!(
            persistent = failed.config.persistent,
            arrival_rate = failed.config.arrival_rate,
            stations = failed.config.stations,
            "configuration did not produce a result"
        );
    }

    let records: Vec<_> = successes
        .into_iter()
        .map(|o| o.result.expect("partitioned on is_ok"))
        .collect();
    if records.is_empty() {
        bail!("all {} runs failed", failures.len());
    }

    let path = out_path.unwrap_or_else(export::timestamped_path);
    export::write_csv(&path, &records)?;
    info!(
        succeeded = records.len(),
        failed = failures.len(),
        "sweep finished"
    );
    Ok(())
}

/// Companion waiting-line experiment: M/M/1 across a utilization ramp,
/// then M/M/1/K for a few buffer sizes.
fn run_queue_demo(seed: u64) -> Result<()> {
    let base = QueueConfig {
        avg_packet_length: 2000.0,
        transmission_rate: 1e6,
        horizon: 100.0,
        utilization: 0.25,
        buffer: None,
        seed,
    };

    let mut unbounded: Vec<f64> = (0..8).map(|i| 0.25 + 0.1 * i as f64).collect();
    unbounded.push(1.2);
    let bounded: &[(usize, &[f64])] = &[
        (10, &[0.5, 1.0, 1.5, 5.0]),
        (25, &[0.5, 1.0, 1.5, 5.0]),
        (50, &[0.5, 1.0, 1.5, 5.0]),
    ];

    for &utilization in &unbounded {
        report_queue_run(QueueConfig {
            utilization,
            ..base.clone()
        });
    }
    for &(buffer, rhos) in bounded {
        for &utilization in rhos {
            report_queue_run(QueueConfig {
                utilization,
                buffer: Some(buffer),
                ..base.clone()
            });
        }
    }
    Ok(())
}

fn report_queue_run(cfg: QueueConfig) {
    match run_queue(&cfg) {
        Ok(metrics) => info!(
            utilization = cfg.utilization,
            buffer = ?cfg.buffer,
            avg_queue_len = metrics.avg_queue_len,
            idle_fraction = metrics.idle_fraction,
            loss_fraction = metrics.loss_fraction,
            "waiting-line run"
        ),
        Err(err) => error!(utilization = cfg.utilization, %err, "waiting-line run failed"),
    }
}
