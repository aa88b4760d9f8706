//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use pdumpfs::prelude::*;
//! ```

pub use crate::core::config::Config;
pub use crate::core::errors::{PdumpfsError, Result};

pub use crate::engine::classifier::{Classification, Classifier};
pub use crate::engine::locator::SnapshotLocator;
pub use crate::engine::matcher::{ConfiguredMatcher, Matcher, NullMatcher};
pub use crate::engine::materializer::Materializer;
pub use crate::engine::platform::{detect as detect_platform, EntryKind, Metadata, MetadataAdapter};
pub use crate::engine::reporter::{HumanReporter, NullReporter, Reporter};
pub use crate::engine::walker::{RunSummary, Walker, WalkerOptions};
