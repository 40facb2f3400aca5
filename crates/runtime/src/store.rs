//! Atomic holder of the current snapshot.
//!
//! # Role
//!
//! The store is the single point where a fully built [`Snapshot`] becomes
//! visible. Readers take a local `Arc` and never block; writers publish with
//! one compare-and-swap loop.
//!
//! # Invariants
//!
//! - Every `put` is assigned a unique generation from a process-wide counter,
//!   never reused across `clear`.
//! - The published generation never decreases while loaded: a writer whose
//!   generation is older than the current one does not replace it.
//! - An empty store reads as `None` and generation `0`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use llmdb_catalog::Snapshot;

/// A published snapshot with the generation it was assigned.
#[derive(Debug)]
pub struct Loaded {
	snapshot: Arc<Snapshot>,
	generation: u64,
}

impl Loaded {
	pub fn snapshot(&self) -> &Arc<Snapshot> {
		&self.snapshot
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}
}

/// Lock-free `Empty | Loaded(snapshot, generation)` cell.
#[derive(Debug, Default)]
pub struct AtomicStore {
	current: ArcSwapOption<Loaded>,
	counter: AtomicU64,
}

impl AtomicStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Publishes `snapshot` and returns its generation.
	pub fn put(&self, snapshot: impl Into<Arc<Snapshot>>) -> u64 {
		let generation = self.counter.fetch_add(1, Ordering::AcqRel) + 1;
		let next = Arc::new(Loaded {
			snapshot: snapshot.into(),
			generation,
		});
		self.current.rcu(|current| match current {
			Some(existing) if existing.generation > generation => Some(Arc::clone(existing)),
			_ => Some(Arc::clone(&next)),
		});
		generation
	}

	/// Current snapshot and generation as one consistent pair.
	#[inline]
	pub fn get(&self) -> Option<Arc<Loaded>> {
		self.current.load_full()
	}

	#[inline]
	pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
		(*self.current.load()).as_ref().map(|loaded| Arc::clone(&loaded.snapshot))
	}

	/// Generation of the current snapshot, `0` when empty.
	#[inline]
	pub fn generation(&self) -> u64 {
		(*self.current.load()).as_ref().map_or(0, |loaded| loaded.generation)
	}

	pub fn is_loaded(&self) -> bool {
		self.current.load().is_some()
	}

	/// Returns the store to empty. The generation counter keeps counting.
	pub fn clear(&self) -> Option<Arc<Loaded>> {
		self.current.swap(None)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_store_reads_as_unloaded() {
		let store = AtomicStore::new();
		assert!(store.get().is_none());
		assert!(store.snapshot().is_none());
		assert_eq!(store.generation(), 0);
		assert!(!store.is_loaded());
		assert!(store.clear().is_none());
	}
}
