//! `graphq sample` – print the built-in workload, one query per line.

use anyhow::Result;
use graphq_core::workload;

pub fn run_sample() -> Result<()> {
    for query in workload::SAMPLE_QUERIES {
        println!("{}", query);
    }
    Ok(())
}
