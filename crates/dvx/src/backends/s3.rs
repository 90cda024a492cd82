// ai
//! 🪣☁️ S3 Backend — the bronze and silver buckets, seen through the AWS SDK.
//!
//! INT. AWS CONSOLE — NIGHT. Two buckets. One holds what the API said, verbatim,
//! encrypted at rest. The other holds what we decided the API meant. Neither forgets.
//!
//! 🧠 Knowledge graph:
//! - Same pattern as `coingecko/`, `glue/`, `athena/`, `in_mem/`
//! - Config co-located: `StorageConfig` lives in `s3_object_store.rs`
//! - Trait impl: `impl ObjectStore for S3ObjectStore`
//! - Enum variant: `ObjectStoreBackend::S3(S3ObjectStore)`
//!
//! 🦆 The duck has read-only access. The duck is fine with this.

mod s3_object_store;

pub use s3_object_store::StorageConfig;
pub(crate) use s3_object_store::{S3ObjectStore, default_region};
