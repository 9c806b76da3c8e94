//! Archipelago Merge Engine
//!
//! This module provides the gaps-and-islands interval merge:
//!
//! - **types**: Core records (Event, AnnotatedEvent, MergedWindow)
//! - **partition**: Grouping events by key
//! - **merger**: Per-partition sort, island detection and envelope reduction
//! - **engine**: Validation, parallel orchestration and output ordering
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Events → Validate → Partition → Merge (per key) → Order by (end, key) → Windows
//! ```
//!
//! # Example
//!
//! ```rust
//! use archipelago::merge::{Event, IntervalEngine};
//!
//! let engine = IntervalEngine::default();
//! let windows = engine
//!     .merge(vec![
//!         Event::new("H1", 1, 3),
//!         Event::new("H1", 2, 4),
//!         Event::new("H1", 6, 8),
//!     ])
//!     .unwrap();
//!
//! assert_eq!(windows.len(), 2);
//! assert_eq!((windows[0].window_start, windows[0].window_end), (1, 4));
//! ```

pub mod engine;
pub mod error;
pub mod merger;
pub mod partition;
pub mod types;

// Re-export commonly used types
pub use engine::{sort_for_output, validate, EngineConfig, IntervalEngine, MergeOutput, MergeStats};
pub use error::{MergeError, MergeResult};
pub use merger::{annotate, merge, reduce};
pub use partition::partition;
pub use types::{AnnotatedEvent, BoundField, Event, MergedWindow};
