//! Catalog build pipeline.
//!
//! Turns ordered, possibly overlapping [`RecordSet`]s into one immutable
//! [`Snapshot`]:
//!
//! ```text
//! Source* → normalize → validate → merge → filter → enrich → index → Snapshot
//! ```
//!
//! - [`schema`]: per-field types and merge policies for both record kinds.
//! - [`merge`]: precedence-ordered, policy-driven record merging.
//! - [`filter`]: allow/deny pattern compiler.
//! - [`index`]: id, alias and provider lookup tables with collision tracking.
//! - [`pipeline`]: [`run_pipeline`] wiring the stages together.
//! - [`document`]: the serialized form of a snapshot.

pub mod document;
pub mod enrich;
pub mod filter;
pub mod index;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod schema;
pub mod snapshot;
pub mod source;
pub mod validate;

pub use document::{DOCUMENT_VERSION, DocumentError, ProviderEntry, SnapshotDocument};
pub use enrich::derive_family;
pub use filter::{AllowSpec, CompiledFilter, FilterList, FilterSpec, FilterWarning, Pattern, PatternSet};
pub use index::{CatalogIndex, Collision, CollisionKind};
pub use model::{Capabilities, CapabilityValue, Cost, Item, Limits, Modalities, Provider};
pub use pipeline::{PipelineError, PipelineOptions, PipelineStage, run_pipeline};
pub use record::{Record, RecordKind, RecordSet};
pub use report::{BuildReport, DropCounts};
pub use snapshot::Snapshot;
pub use source::{DocumentSource, FnSource, Source, SourceError, StaticSource};
pub use validate::{SchemaValidator, ValidationError, Validator, Violation};
