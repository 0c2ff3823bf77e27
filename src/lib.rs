//! Locate ExaSPIM whole-brain image pyramids and load curated annotations.
//!
//! - [`locator::ImageLocator`] resolves a brain id to its fused pyramid on S3.
//! - [`somas::SomaLoader`] reads soma detections from the newest results run.
//! - [`merge_sites::extract_merge_sites`] pulls confirmed merge sites out of
//!   a review sheet opened with [`sheet::SheetClient`].

pub mod cache;
pub mod config;
pub mod coords;
pub mod error;
pub mod locator;
pub mod logging;
pub mod merge_sites;
pub mod path_utils;
pub mod sheet;
pub mod somas;
pub mod storage;
pub mod zarr;

pub use config::Config;
pub use coords::Xyz;
pub use error::{Error, Result};
pub use locator::ImageLocator;
pub use merge_sites::{extract_merge_sites, MergeSite, MergeSiteReport};
pub use somas::{find_most_recent_dirname, SomaLoader};
pub use storage::{HttpObjectStore, MemoryObjectStore, ObjectStore};
