//! Port implementations.
//!
//! `live` talks to the real disk, git and system clock; `memory` serves a
//! project tree held in memory and a fixed clock, for tests and embedders.

pub mod live;
pub mod memory;
