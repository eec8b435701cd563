//! High-level operations.
//!
//! This module contains the implementation of keel commands.

pub mod load;
pub mod lockfile;

pub use load::{load_project, load_project_with};
pub use lockfile::{
    is_consistent, load_lock_file, lock_file_needs_update, save_lock_file, stale_groups,
};
