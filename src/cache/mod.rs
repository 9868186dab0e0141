//! Cache module for storing shaped responses on disk
//!
//! This module provides a cache manager that keeps one JSON file per upstream
//! resource. An entry is fresh while its modification time is within the
//! query's TTL; stale entries are ignored and overwritten by the next fetch.

mod manager;

pub use manager::{is_fresh, CacheFs, CacheManager, DiskFs, MAX_DIR_CREATE_ATTEMPTS};
