//! # Archipelago
//!
//! Gaps-and-islands interval merging: consolidate keyed, time-bounded events
//! into non-overlapping windows per key and report each window's extent.
//!
//! ## Features
//!
//! - **Running-maximum merge**: an event joins the current island unless it
//!   starts strictly after every earlier event of its key has ended
//! - **Per-key parallelism**: partitions are merged independently on rayon
//! - **Fail fast**: incomparable bounds (e.g. NaN) are rejected before any work
//! - **CSV in, table/CSV/JSON out**: integer or timestamp bounds
//!
//! ## Modules
//!
//! - [`merge`]: Partitioner, merger and engine
//! - [`io`]: CSV event reader and window writer
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust
//! use archipelago::{Event, IntervalEngine};
//!
//! let engine = IntervalEngine::default();
//! let output = engine
//!     .run(vec![
//!         Event::new("H1", 1, 10),
//!         Event::new("H1", 2, 3),
//!         Event::new("H1", 11, 12),
//!     ])
//!     .unwrap();
//!
//! let spans: Vec<(i32, i32)> = output
//!     .windows
//!     .iter()
//!     .map(|w| (w.window_start, w.window_end))
//!     .collect();
//! assert_eq!(spans, vec![(1, 10), (11, 12)]);
//! ```

pub mod config;
pub mod io;
pub mod logging;
pub mod merge;

// Re-export top-level types for convenience
pub use merge::{
    AnnotatedEvent, BoundField, EngineConfig, Event, IntervalEngine, MergeError, MergeOutput,
    MergeResult, MergeStats, MergedWindow,
};

pub use io::{BoundFormat, EventReader, ImportReport, IoError, OutputFormat, WindowWriter};

pub use config::{
    Config, ConfigError, EngineConfig as ConfigEngineConfig, InputConfig, LoggingConfig,
    OutputConfig,
};
