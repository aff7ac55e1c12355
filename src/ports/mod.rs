//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the analysis core and an external
//! system (filesystem, git, time). Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod git;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use git::GitRepo;
