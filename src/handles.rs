// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

//! Cached object-handle resolution

use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    errors::Result,
    sim_client::{ObjectHandle, SimClient, SimContext},
};

/// Resolves scene object names to handles, cache first.
///
/// Handles are stable for the lifetime of a scene, so they are cached on
/// first resolution. If a scene is reloaded the cached handles go stale,
/// you should call [`evict`] to remove them. [`HandleCache`] will fetch
/// fresh handles when you call [`resolve`] again.
///
/// [`resolve`]: HandleCache::resolve
/// [`evict`]: HandleCache::evict
pub struct HandleCache {
    cache: DashMap<String, ObjectHandle>,
    sim_client: Arc<dyn SimClient>,
}

impl HandleCache {
    pub fn new(sim_client: Arc<dyn SimClient>) -> Self {
        Self {
            cache: DashMap::new(),
            sim_client,
        }
    }

    /// Resolve a batch of names, in input order.
    ///
    /// Any name the simulator does not know fails the whole batch, and
    /// nothing is cached for it.
    pub async fn resolve(&self, names: &[String], ctx: &SimContext) -> Result<Vec<ObjectHandle>> {
        let mut handles = vec![ObjectHandle(0); names.len()];

        // Find from cache firstly and collect misses.
        let mut misses = Vec::new();
        for (idx, name) in names.iter().enumerate() {
            match self.cache.get(name) {
                Some(pair) => {
                    handles[idx] = *pair.value();
                }

                None => {
                    misses.push(idx);
                }
            }
        }

        // Get handles of misses from the simulator and update cache.
        // The remote API looks up one name per request.
        for idx in misses {
            let name = &names[idx];
            let handle = self.sim_client.object_handle(ctx, name).await?;
            self.cache.insert(name.clone(), handle);
            handles[idx] = handle;
        }

        Ok(handles)
    }

    pub fn evict(&self, names: &[String]) {
        for name in names {
            let _ = self.cache.remove(name);
        }
    }
}
