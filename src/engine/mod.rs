//! Snapshot engine: the components the walker composes to turn one source
//! tree into one dated snapshot directory, hard-linking whatever did not
//! change since the most recent prior snapshot.
//!
//! Organized leaf-first: [`platform`] and [`matcher`] have no dependencies
//! on the rest of the engine; [`locator`] depends only on [`platform`];
//! [`classifier`] depends on [`platform`] and [`matcher`]; [`materializer`]
//! depends on [`classifier`] and [`platform`]; [`walker`] composes all of
//! the above plus [`reporter`].

pub mod classifier;
pub mod locator;
pub mod matcher;
pub mod materializer;
pub mod platform;
pub mod reporter;
pub mod walker;

pub use classifier::{Classification, Classifier};
pub use locator::SnapshotLocator;
pub use matcher::{ConfiguredMatcher, Matcher, NullMatcher};
pub use materializer::Materializer;
pub use platform::{detect as detect_platform, EntryKind, Metadata, MetadataAdapter};
pub use reporter::{HumanReporter, NullReporter, Reporter};
pub use walker::{RunSummary, Walker, WalkerOptions};
