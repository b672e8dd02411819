//! Query workloads: the built-in sample catalogue and query files.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Sample workload: build a small social graph, query it, tear part of it
/// down. The first statement wipes every vertex, so rerunning this batch
/// after a partial failure starts from an empty graph again.
pub const SAMPLE_QUERIES: &[&str] = &[
    "g.V().drop()",
    "g.addV('person').property('id', 'thomas').property('firstName', 'Thomas').property('age', 44).property('pk', 'pk')",
    "g.addV('person').property('id', 'mary').property('firstName', 'Mary').property('lastName', 'Andersen').property('age', 39).property('pk', 'pk')",
    "g.addV('person').property('id', 'ben').property('firstName', 'Ben').property('lastName', 'Miller').property('pk', 'pk')",
    "g.addV('person').property('id', 'robin').property('firstName', 'Robin').property('lastName', 'Wakefield').property('pk', 'pk')",
    "g.V('thomas').addE('knows').to(g.V('mary'))",
    "g.V('thomas').addE('knows').to(g.V('ben'))",
    "g.V('ben').addE('knows').to(g.V('robin'))",
    "g.V('thomas').property('age', 44)",
    "g.V().count()",
    "g.V().hasLabel('person').has('age', gt(40))",
    "g.V().hasLabel('person').order().by('firstName', decr)",
    "g.V('thomas').outE('knows').inV().hasLabel('person')",
    "g.V('thomas').outE('knows').inV().hasLabel('person').outE('knows').inV().hasLabel('person')",
    "g.V('thomas').repeat(out()).until(has('id', 'robin')).path()",
    "g.V('thomas').outE('knows').where(inV().has('id', 'mary')).drop()",
    "g.V('thomas').drop()",
];

/// Errors loading a query file.
#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("could not read query file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("query file {0} contains no queries")]
    Empty(PathBuf),
}

pub fn sample_queries() -> Vec<String> {
    SAMPLE_QUERIES.iter().map(|q| q.to_string()).collect()
}

/// Split text into queries: one per line, skipping blank lines and lines
/// starting with `//` or `#`.
pub fn parse_queries(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("//") && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Load queries from a file. A file with no queries is an error.
pub fn load_queries(path: &Path) -> Result<Vec<String>, WorkloadError> {
    let text = fs::read_to_string(path).map_err(|source| WorkloadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let queries = parse_queries(&text);
    if queries.is_empty() {
        return Err(WorkloadError::Empty(path.to_path_buf()));
    }
    tracing::debug!("loaded {} queries from {}", queries.len(), path.display());
    Ok(queries)
}
