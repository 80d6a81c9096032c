//! Upload naming, staging, bucket provisioning and the query operations
//! behind the HTTP handlers

pub mod naming;
pub mod provisioner;
pub mod query;
pub mod staging;
pub mod upload;
pub mod validation;

pub use provisioner::BucketProvisioner;
pub use query::QueryService;
pub use staging::{StagedFile, StagingWriter};
pub use upload::{UploadGateway, UploadOutcome, UploadRequest};
