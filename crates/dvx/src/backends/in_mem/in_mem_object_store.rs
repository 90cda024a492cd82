//! 📦 A bucket made of a `BTreeMap`. Listing is sorted, because BTreeMap said so.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::backends::ObjectStore;

/// 🧾 One stored object, plus whether the caller asked for encryption at rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredObject {
    pub body: Vec<u8>,
    pub encrypted: bool,
}

#[derive(Debug, Default)]
struct Buckets {
    objects: BTreeMap<(String, String), StoredObject>,
    /// 💣 how many of the next PUTs should blow up
    failing_puts: u32,
    put_attempts: u32,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct InMemoryObjectStore {
    inner: Arc<Mutex<Buckets>>,
}

impl InMemoryObjectStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 💣 The next `count` PUTs fail with a transient-looking error.
    pub(crate) async fn fail_next_puts(&self, count: u32) {
        self.inner.lock().await.failing_puts = count;
    }

    /// 🪄 Seed an object without going through `put_object`.
    pub(crate) async fn insert(&self, bucket: &str, key: &str, body: impl Into<Vec<u8>>) {
        self.inner.lock().await.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: body.into(),
                encrypted: false,
            },
        );
    }

    pub(crate) async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.inner
            .lock()
            .await
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// 📋 Every key in `bucket`, sorted.
    pub(crate) async fn keys(&self, bucket: &str) -> Vec<String> {
        self.inner
            .lock()
            .await
            .objects
            .keys()
            .filter(|(the_bucket, _)| the_bucket == bucket)
            .map(|(_, key)| key.clone())
            .collect()
    }

    pub(crate) async fn put_attempts(&self) -> u32 {
        self.inner.lock().await.put_attempts
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>, encrypt: bool) -> Result<()> {
        let mut the_buckets = self.inner.lock().await;
        the_buckets.put_attempts += 1;
        if the_buckets.failing_puts > 0 {
            the_buckets.failing_puts -= 1;
            bail!("💀 simulated PUT failure for {}/{}: SlowDown", bucket, key);
        }
        the_buckets.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                encrypted: encrypt,
            },
        );
        Ok(())
    }

    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .keys(bucket)
            .await
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.object(bucket, key)
            .await
            .map(|stored| stored.body)
            .with_context(|| format!("💀 NoSuchKey: {}/{}", bucket, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn the_one_where_listing_respects_bucket_and_prefix() -> Result<()> {
        let the_store = InMemoryObjectStore::new();
        the_store.put_object("b", "bronze/crypto/a.csv", b"1".to_vec(), true).await?;
        the_store.put_object("b", "silver/crypto/a.csv", b"2".to_vec(), false).await?;
        the_store.put_object("s", "bronze/crypto/z.csv", b"3".to_vec(), false).await?;

        assert_eq!(the_store.list_keys("b", "bronze/crypto/").await?, vec!["bronze/crypto/a.csv"]);
        assert_eq!(the_store.get_object("b", "silver/crypto/a.csv").await?, b"2".to_vec());
        assert!(the_store.object("b", "bronze/crypto/a.csv").await.map(|o| o.encrypted).unwrap_or(false));
        assert!(the_store.get_object("b", "nope").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_scheduled_failures_run_out() -> Result<()> {
        let the_store = InMemoryObjectStore::new();
        the_store.fail_next_puts(1).await;
        assert!(the_store.put_object("b", "k", vec![], false).await.is_err());
        the_store.put_object("b", "k", vec![], false).await?;
        assert_eq!(the_store.put_attempts().await, 2);
        Ok(())
    }
}
