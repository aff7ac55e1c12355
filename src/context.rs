//! Service context bundling all port trait objects.

use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::git::LiveGitRepo;
use crate::adapters::memory::{FixedClock, MemoryFileSystem, MemoryGitRepo};
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::git::GitRepo;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up different adapter implementations (live, in-memory).
pub struct ServiceContext {
    /// Clock for stamping snapshots.
    pub clock: Box<dyn Clock>,
    /// Filesystem for project walks and file I/O.
    pub fs: Box<dyn FileSystem>,
    /// Git repository for reading the "before" side of an edit.
    pub git: Box<dyn GitRepo>,
}

impl ServiceContext {
    /// Creates a live context backed by the disk, the `git` CLI and the
    /// system clock.
    #[must_use]
    pub fn live() -> Self {
        Self {
            clock: Box::new(LiveClock),
            fs: Box::new(LiveFileSystem),
            git: Box::new(LiveGitRepo),
        }
    }

    /// Creates a context over an in-memory project and git history, with the
    /// clock fixed at the Unix epoch.
    #[must_use]
    pub fn in_memory(fs: MemoryFileSystem, git: MemoryGitRepo) -> Self {
        Self {
            clock: Box::new(FixedClock::epoch()),
            fs: Box::new(fs),
            git: Box::new(git),
        }
    }
}
