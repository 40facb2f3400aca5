#![allow(unused_crate_dependencies)]

use std::sync::Arc;
use std::thread;

use llmdb_catalog::{PipelineOptions, RecordSet, Snapshot, Source, StaticSource, run_pipeline};
use llmdb_runtime::AtomicStore;
use serde_json::json;

fn snapshot(item: &str) -> Snapshot {
	let set = RecordSet::new()
		.with_provider(json!({"id": "openai"}))
		.with_item(json!({"id": item, "provider": "openai"}));
	let source: Arc<dyn Source> = Arc::new(StaticSource::new("test", set));
	run_pipeline(&[source], &PipelineOptions::new()).unwrap()
}

/// Generations advance by one per put and survive a clear.
#[test]
fn test_put_clear_put_keeps_counting() {
	let store = AtomicStore::new();
	assert_eq!(store.put(snapshot("a")), 1);
	assert_eq!(store.put(snapshot("b")), 2);
	assert_eq!(store.generation(), 2);
	assert!(store.snapshot().unwrap().item("openai", "b").is_some());

	let cleared = store.clear().unwrap();
	assert_eq!(cleared.generation(), 2);
	assert_eq!(store.generation(), 0);
	assert!(store.snapshot().is_none());

	assert_eq!(store.put(snapshot("c")), 3);
	assert_eq!(store.generation(), 3);
}

/// A reader holding a snapshot keeps it across later swaps.
#[test]
fn test_reader_keeps_its_generation() {
	let store = AtomicStore::new();
	store.put(snapshot("a"));
	let held = store.get().unwrap();
	store.put(snapshot("b"));

	assert_eq!(held.generation(), 1);
	assert!(held.snapshot().item("openai", "a").is_some());
	assert!(held.snapshot().item("openai", "b").is_none());
	assert_eq!(store.generation(), 2);
}

/// Concurrent writers get unique generations; readers never see one decrease.
#[test]
fn test_concurrent_puts_are_unique_and_monotonic() {
	const WRITERS: usize = 8;
	const PUTS: usize = 25;

	let store = Arc::new(AtomicStore::new());
	let base = Arc::new(snapshot("shared"));

	let readers: Vec<_> = (0..4)
		.map(|_| {
			let store = Arc::clone(&store);
			thread::spawn(move || {
				let mut last = 0;
				for _ in 0..2_000 {
					let now = store.generation();
					assert!(now >= last, "generation went backwards: {last} -> {now}");
					if let Some(loaded) = store.get() {
						assert!(loaded.snapshot().item("openai", "shared").is_some());
					}
					last = now;
				}
			})
		})
		.collect();

	let writers: Vec<_> = (0..WRITERS)
		.map(|_| {
			let store = Arc::clone(&store);
			let base = Arc::clone(&base);
			thread::spawn(move || (0..PUTS).map(|_| store.put(Arc::clone(&base))).collect::<Vec<u64>>())
		})
		.collect();

	let mut generations: Vec<u64> = writers.into_iter().flat_map(|w| w.join().unwrap()).collect();
	for reader in readers {
		reader.join().unwrap();
	}

	generations.sort_unstable();
	let expected: Vec<u64> = (1..=(WRITERS * PUTS) as u64).collect();
	assert_eq!(generations, expected);
	assert_eq!(store.generation(), (WRITERS * PUTS) as u64);
}
