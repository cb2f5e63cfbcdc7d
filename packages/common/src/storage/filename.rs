/// Longest blob name most filesystems accept for a single path component.
const MAX_NAME_BYTES: usize = 255;

/// Reasons a blob name is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameError {
    /// Name is empty or whitespace-only.
    Empty,
    /// Name is longer than a single path component may be.
    TooLong,
    /// Name contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Name is `..`.
    PathTraversal,
    /// Name contains null bytes.
    NullByte,
    /// Name starts with a dot. Dot-names are reserved for the store's own bookkeeping.
    Hidden,
    /// Name contains control characters (CR, LF, etc.).
    ControlCharacter,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "File name cannot be empty",
            Self::TooLong => "Invalid file name: longer than 255 bytes",
            Self::ContainsPathSeparator => "Invalid file name: path separators are not allowed",
            Self::PathTraversal => "Invalid file name: '..' is not allowed",
            Self::NullByte => "Invalid file name: null bytes are not allowed",
            Self::Hidden => "Invalid file name: names starting with '.' are not allowed",
            Self::ControlCharacter => "Invalid file name: control characters are not allowed",
        }
    }
}

/// Validates a blob name and returns it trimmed.
///
/// A valid name is a single path component, so joining it onto the content
/// root can never resolve outside of it.
pub fn validate_blob_name(name: &str) -> Result<&str, FilenameError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    if trimmed.len() > MAX_NAME_BYTES {
        return Err(FilenameError::TooLong);
    }

    if trimmed.contains('\0') {
        return Err(FilenameError::NullByte);
    }

    if trimmed.chars().any(|c| c.is_ascii_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if trimmed == ".." {
        return Err(FilenameError::PathTraversal);
    }

    if trimmed.starts_with('.') {
        return Err(FilenameError::Hidden);
    }

    Ok(trimmed)
}
