//! Caching layer between the application and the network
//!
//! This module contains the request-interception surface and its three
//! named caches. It is organized into submodules by responsibility:
//!
//! - `store`: Named response caches (full snapshots, overwrite-on-put)
//! - `policy`: Request classification and the per-class cache strategies
//! - `gateway`: Handler registration with version-supersede semantics

mod gateway;
mod policy;
mod store;

pub use store::{API_CACHE, MEDIA_CACHE, NamedCache, SHELL_CACHE};

pub use policy::{CachingFetcher, RequestClass, classify};

pub use gateway::Gateway;
