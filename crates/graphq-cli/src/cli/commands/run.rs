//! `graphq run` – execute a batch of queries against the configured endpoint.

use anyhow::{Context, Result};
use graphq_core::batch::{BatchResult, BatchRunner};
use graphq_core::config::GraphqConfig;
use graphq_core::connection::HttpGremlinProvider;
use graphq_core::control::CancelToken;
use graphq_core::workload;
use std::path::PathBuf;
use std::time::Duration;

/// Options of `graphq run` that override the config file.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub file: Option<PathBuf>,
    pub runs: Option<u32>,
    pub rerun_delay: Option<u64>,
    pub json: bool,
}

pub async fn run_batch(cfg: &GraphqConfig, args: &RunArgs) -> Result<()> {
    let queries = match &args.file {
        Some(path) => workload::load_queries(path)?,
        None => workload::sample_queries(),
    };

    let mut rerun = cfg.rerun_policy();
    if let Some(runs) = args.runs {
        rerun.max_runs = runs.max(1);
    }
    if let Some(secs) = args.rerun_delay {
        rerun.delay = Duration::from_secs(secs);
    }

    let provider = HttpGremlinProvider::new(cfg.http_options())
        .with_context(|| format!("set up connection to {}", cfg.endpoint))?;
    let cancel = CancelToken::new();
    let runner = BatchRunner::new(provider, cfg.retry_policy()).with_cancel_token(cancel.clone());

    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("interrupt received; finishing the in-flight query");
            cancel.cancel();
        }
    });

    tracing::info!(
        endpoint = %cfg.endpoint,
        queries = queries.len(),
        max_runs = rerun.max_runs,
        "running batch"
    );
    let results = runner.run_with_reruns(&queries, &rerun).await;
    runner.close();
    ctrl_c.abort();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for (i, result) in results.iter().enumerate() {
            print_summary(i + 1, result);
        }
    }

    match results.last() {
        Some(last) if last.is_complete() => Ok(()),
        Some(last) if last.cancelled => anyhow::bail!("batch cancelled"),
        Some(last) => anyhow::bail!(
            "batch aborted at query {} after {} run(s)",
            last.first_failure_index
                .map(|i| i.to_string())
                .unwrap_or_else(|| "-".to_string()),
            results.len()
        ),
        None => anyhow::bail!("no batch run happened"),
    }
}

fn print_summary(run: usize, result: &BatchResult) {
    let outcome = if result.is_complete() {
        "complete"
    } else if result.cancelled {
        "cancelled"
    } else {
        "aborted"
    };
    println!(
        "run {}: {}  {}/{} succeeded, {} not run, {:.2} RU",
        run,
        outcome,
        result.succeeded,
        result.total,
        result.remaining(),
        result.request_charge
    );
    if let Some(index) = result.first_failure_index {
        println!("  first failure at query {}", index);
    }
}
