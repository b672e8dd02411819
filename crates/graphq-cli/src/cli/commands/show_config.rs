//! `graphq config` – show where the config lives and what is in effect.

use anyhow::Result;
use graphq_core::config::{GraphqConfig, PASSWORD_ENV};
use std::path::Path;

pub fn run_show_config(path: &Path, cfg: &GraphqConfig) -> Result<()> {
    let retry = cfg.retry_policy();
    let rerun = cfg.rerun_policy();
    let password = if std::env::var_os(PASSWORD_ENV).is_some() {
        format!("(from {})", PASSWORD_ENV)
    } else if cfg.password.is_some() {
        "(set)".to_string()
    } else {
        "-".to_string()
    };

    println!("config file:      {}", path.display());
    println!("endpoint:         {}", cfg.endpoint);
    println!("username:         {}", cfg.username.as_deref().unwrap_or("-"));
    println!("password:         {}", password);
    println!(
        "timeouts:         connect {}s, request {}s",
        cfg.connect_timeout_secs, cfg.request_timeout_secs
    );
    println!(
        "retry:            {} attempt(s), backoff {:?}..{:?}, total wait cap {}",
        retry.max_attempts,
        retry.base_delay,
        retry.max_delay,
        retry
            .max_total_wait
            .map(|d| format!("{:?}", d))
            .unwrap_or_else(|| "none".to_string())
    );
    println!(
        "rerun:            {} run(s), {:?} apart",
        rerun.max_runs, rerun.delay
    );
    Ok(())
}
