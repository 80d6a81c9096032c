//! Object key selection for uploads
//!
//! Uploaded filenames are first reduced to a key-safe form. Unless the caller
//! asks to keep the original name, the key gets a random UUID prefix. When the
//! original name is kept, collisions are resolved by probing the bucket for
//! `stem_1.ext`, `stem_2.ext`, ... until a free key turns up.
//!
//! The probe and the later write are separate store calls, so two concurrent
//! uploads of the same name can settle on the same key. The store offers no
//! conditional create to close that window.

use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::storage::{ObjectStore, StoreError};

/// Upper bound on `stem_N.ext` candidates tried before giving up.
pub const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// Reduce a client supplied filename to a safe object key.
///
/// The name is NFKD-decomposed first, so accented letters keep their base
/// letter. Path separators become spaces, remaining non-ASCII is dropped, runs of
/// whitespace collapse into `_`, anything outside `[A-Za-z0-9_.-]` is
/// removed, and leading/trailing `.` and `_` are stripped. The result may be
/// empty.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Split into stem and extension, the extension keeping its dot.
///
/// A dot that only has dots before it does not start an extension, so
/// `.bashrc` has none.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if name[..idx].chars().any(|c| c != '.') => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// `<uuid>_<filename>`
pub fn random_object_key(filename: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), filename)
}

fn numbered_candidate(stem: &str, ext: &str, counter: u32) -> String {
    format!("{}_{}{}", stem, counter, ext)
}

/// Pick the key an upload of `filename` is stored under.
///
/// `filename` must already be sanitized.
pub async fn resolve_object_key(
    store: &dyn ObjectStore,
    bucket: &str,
    filename: &str,
    keep_original_name: bool,
) -> ServiceResult<String> {
    if !keep_original_name {
        return Ok(random_object_key(filename));
    }

    let (stem, ext) = split_extension(filename);

    for attempt in 0..=MAX_NAME_ATTEMPTS {
        let candidate = if attempt == 0 {
            filename.to_string()
        } else {
            numbered_candidate(stem, ext, attempt)
        };

        match store.stat_object(bucket, &candidate).await {
            Err(StoreError::NotFound(_)) => {
                debug!(bucket = %bucket, key = %candidate, "Resolved object name");
                return Ok(candidate);
            }
            Ok(_) => continue,
            Err(err) => {
                let fallback = random_object_key(filename);
                warn!(
                    bucket = %bucket,
                    key = %candidate,
                    fallback = %fallback,
                    error = %err,
                    "Existence probe failed, falling back to a random object name"
                );
                return Ok(fallback);
            }
        }
    }

    Err(ServiceError::NamingExhausted {
        filename: filename.to_string(),
        attempts: MAX_NAME_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use crate::storage::{MockObjectStore, ObjectStat};
    use std::path::Path;

    fn stat(key: &str) -> ObjectStat {
        ObjectStat {
            key: key.to_string(),
            size: 1,
            content_type: None,
            last_modified: None,
        }
    }

    async fn store_object(store: &MemoryStore, bucket: &str, key: &str) {
        let staged = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(staged.path(), b"data").unwrap();
        store
            .put_object(bucket, key, Path::new(staged.path()), "text/plain")
            .await
            .unwrap();
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("report.pdf"), "report.pdf");
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("C:\\Windows\\evil.exe"), "C_Windows_evil.exe");
        assert_eq!(secure_filename("résumé.txt"), "resume.txt");
        assert_eq!(secure_filename("été.pdf"), "ete.pdf");
        assert_eq!(secure_filename("ﬁle №1.txt"), "file_No1.txt");
        assert_eq!(secure_filename("a<b>c|d.txt"), "abcd.txt");
        assert_eq!(secure_filename("__init__.py"), "init__.py");
    }

    #[test]
    fn test_secure_filename_can_be_empty() {
        assert_eq!(secure_filename(""), "");
        assert_eq!(secure_filename("???"), "");
        assert_eq!(secure_filename("../.."), "");
        assert_eq!(secure_filename("文件"), "");
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("report.pdf"), ("report", ".pdf"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("Makefile"), ("Makefile", ""));
        assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
    }

    #[test]
    fn test_random_keys_never_repeat() {
        let first = random_object_key("report.pdf");
        let second = random_object_key("report.pdf");
        assert_ne!(first, second);
        assert!(first.ends_with("_report.pdf"));
        // 36 character hyphenated UUID, then the separator
        assert_eq!(first.find('_'), Some(36));
    }

    #[tokio::test]
    async fn test_random_name_skips_store() {
        // No expectations: any store call would panic
        let store = MockObjectStore::new();
        let key = resolve_object_key(&store, "uploads", "report.pdf", false)
            .await
            .unwrap();
        assert!(key.ends_with("_report.pdf"));
    }

    #[tokio::test]
    async fn test_keep_original_name_appends_counter() {
        let store = MemoryStore::new().with_bucket("uploads").await;

        let first = resolve_object_key(&store, "uploads", "report.pdf", true)
            .await
            .unwrap();
        assert_eq!(first, "report.pdf");
        store_object(&store, "uploads", &first).await;

        let second = resolve_object_key(&store, "uploads", "report.pdf", true)
            .await
            .unwrap();
        assert_eq!(second, "report_1.pdf");
        store_object(&store, "uploads", &second).await;

        let third = resolve_object_key(&store, "uploads", "report.pdf", true)
            .await
            .unwrap();
        assert_eq!(third, "report_2.pdf");
    }

    #[tokio::test]
    async fn test_counter_derives_from_original_stem() {
        let store = MemoryStore::new().with_bucket("uploads").await;
        store_object(&store, "uploads", "notes").await;
        store_object(&store, "uploads", "notes_1").await;

        let key = resolve_object_key(&store, "uploads", "notes", true)
            .await
            .unwrap();
        assert_eq!(key, "notes_2");
    }

    #[tokio::test]
    async fn test_probe_failure_falls_back_to_random_name() {
        let mut store = MockObjectStore::new();
        store
            .expect_stat_object()
            .times(1)
            .returning(|_, _| Err(StoreError::Backend("AccessDenied".to_string())));

        let key = resolve_object_key(&store, "uploads", "report.pdf", true)
            .await
            .unwrap();
        assert_ne!(key, "report.pdf");
        assert!(key.ends_with("_report.pdf"));
    }

    #[tokio::test]
    async fn test_probe_failure_after_collision_falls_back() {
        let mut store = MockObjectStore::new();
        store
            .expect_stat_object()
            .returning(|_, key| {
                if key == "report.pdf" {
                    Ok(stat(key))
                } else {
                    Err(StoreError::Backend("connection reset".to_string()))
                }
            });

        let key = resolve_object_key(&store, "uploads", "report.pdf", true)
            .await
            .unwrap();
        assert!(key.ends_with("_report.pdf"));
        assert_ne!(key, "report_1.pdf");
    }

    #[tokio::test]
    async fn test_naming_gives_up_after_cap() {
        let mut store = MockObjectStore::new();
        store
            .expect_stat_object()
            .times(MAX_NAME_ATTEMPTS as usize + 1)
            .returning(|_, key| Ok(stat(key)));

        let err = resolve_object_key(&store, "uploads", "report.pdf", true)
            .await
            .unwrap_err();
        match err {
            ServiceError::NamingExhausted { filename, attempts } => {
                assert_eq!(filename, "report.pdf");
                assert_eq!(attempts, MAX_NAME_ATTEMPTS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_keep_original_name_is_check_then_act() {
        // Both uploads probe before either writes, so both pick the same key
        // and the second write replaces the first.
        let store = MemoryStore::new().with_bucket("uploads").await;

        let first = resolve_object_key(&store, "uploads", "report.pdf", true)
            .await
            .unwrap();
        let second = resolve_object_key(&store, "uploads", "report.pdf", true)
            .await
            .unwrap();
        assert_eq!(first, second);

        store_object(&store, "uploads", &first).await;
        store_object(&store, "uploads", &second).await;
        assert_eq!(store.object_count("uploads").await, 1);
    }
}
