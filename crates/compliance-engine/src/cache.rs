//! Read-through TTL caches for reference lookups
//!
//! Caches are ordinary owned values injected into the resolver; there is no
//! process-wide cache. Only successful lookups (including "not found") are
//! cached. Failures always go back to the source.

use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::LookupError;
use crate::sources::{AliasTable, PartRecord, PartsCatalog};

/// Key/value store whose entries expire after a fixed lifetime
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (Instant, V)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    pub async fn insert(&self, key: K, value: V) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.write().await;
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
        entries.insert(key, (Instant::now(), value));
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

/// Parts catalog wrapper caching exact-SKU lookups
pub struct CachedCatalog<C> {
    inner: C,
    by_sku: TtlCache<String, Option<PartRecord>>,
}

impl<C: PartsCatalog> CachedCatalog<C> {
    pub fn new(inner: C, ttl: Duration) -> Self {
        Self {
            inner,
            by_sku: TtlCache::new(ttl),
        }
    }
}

#[async_trait]
impl<C: PartsCatalog> PartsCatalog for CachedCatalog<C> {
    async fn find_by_sku(&self, sku: &str) -> Result<Option<PartRecord>, LookupError> {
        let key = sku.to_string();
        if let Some(hit) = self.by_sku.get(&key).await {
            debug!(sku, "catalog cache hit");
            return Ok(hit);
        }
        let record = self.inner.find_by_sku(sku).await?;
        self.by_sku.insert(key, record.clone()).await;
        Ok(record)
    }

    async fn search_by_name_or_sku(&self, text: &str) -> Result<Option<PartRecord>, LookupError> {
        self.inner.search_by_name_or_sku(text).await
    }
}

/// Alias table wrapper caching `(name, manufacturer)` resolutions
pub struct CachedAliasTable<A> {
    inner: A,
    resolved: TtlCache<(String, Option<String>), Option<String>>,
}

impl<A: AliasTable> CachedAliasTable<A> {
    pub fn new(inner: A, ttl: Duration) -> Self {
        Self {
            inner,
            resolved: TtlCache::new(ttl),
        }
    }
}

#[async_trait]
impl<A: AliasTable> AliasTable for CachedAliasTable<A> {
    async fn resolve(
        &self,
        name: &str,
        manufacturer: Option<&str>,
    ) -> Result<Option<String>, LookupError> {
        let key = (name.to_string(), manufacturer.map(str::to_string));
        if let Some(hit) = self.resolved.get(&key).await {
            debug!(name, "alias cache hit");
            return Ok(hit);
        }
        let sku = self.inner.resolve(name, manufacturer).await?;
        self.resolved.insert(key, sku.clone()).await;
        Ok(sku)
    }
}
