//! Common utilities for benchmarks

use criterion::Criterion;
use nodext_core::types::{DependencyLockGraph, LockEntry};
use pprof::criterion::{Output, PProfProfiler};
use serde_json::{json, Map, Value};

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// Name of the `index`th generated package
pub fn package_name(index: usize) -> String {
    format!("pkg-{:05}", index)
}

/// Layered graph: `layers` rows of `width` packages, each requiring every
/// package of the next row. Seeds are the first row.
pub fn layered_graph(layers: usize, width: usize) -> DependencyLockGraph {
    (0..layers * width).fold(DependencyLockGraph::new(), |graph, index| {
        let layer = index / width;
        let requires: Vec<String> = if layer + 1 < layers {
            ((layer + 1) * width..(layer + 2) * width).map(package_name).collect()
        } else {
            Vec::new()
        };
        graph.with_entry(package_name(index), LockEntry::new(requires))
    })
}

/// Chain `pkg-0 -> pkg-1 -> ... -> pkg-(len-1) -> pkg-0`
pub fn cyclic_chain(len: usize) -> DependencyLockGraph {
    (0..len).fold(DependencyLockGraph::new(), |graph, index| {
        graph.with_entry(package_name(index), LockEntry::new([package_name((index + 1) % len)]))
    })
}

/// v1 lock file document for a layered graph
pub fn lock_file_document(layers: usize, width: usize) -> String {
    let mut dependencies = Map::new();
    for index in 0..layers * width {
        let layer = index / width;
        let requires: Map<String, Value> = if layer + 1 < layers {
            ((layer + 1) * width..(layer + 2) * width)
                .map(|target| (package_name(target), json!("^1.0.0")))
                .collect()
        } else {
            Map::new()
        };
        dependencies.insert(
            package_name(index),
            json!({ "version": "1.0.0", "requires": requires }),
        );
    }

    json!({ "name": "bench", "lockfileVersion": 1, "dependencies": dependencies }).to_string()
}
