// Upload validation rules

use crate::error::ValidationError;

pub fn validate_file_size(size: u64, max_file_size: u64) -> Result<(), ValidationError> {
    if size > max_file_size {
        return Err(ValidationError::TooLarge { limit: max_file_size });
    }
    Ok(())
}

/// Extension after the last dot, lowercased. `None` when there is no dot or
/// nothing follows it.
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_ascii_lowercase())
}

/// An empty allow-list accepts every file.
pub fn validate_file_type(filename: &str, allowed_extensions: &[String]) -> Result<(), ValidationError> {
    if allowed_extensions.is_empty() {
        return Ok(());
    }

    match file_extension(filename) {
        Some(ext) if allowed_extensions.iter().any(|allowed| *allowed == ext) => Ok(()),
        _ => Err(ValidationError::BadExtension {
            allowed: allowed_extensions.to_vec(),
        }),
    }
}
