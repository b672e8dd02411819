#![allow(dead_code)]

pub mod gremlin_server;
pub mod recorder;
pub mod scripted;

pub fn queries(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("g.V('v{}')", i)).collect()
}
