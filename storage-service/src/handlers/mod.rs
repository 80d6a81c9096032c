pub mod buckets;
pub mod file_upload;
pub mod files;
pub mod status;
