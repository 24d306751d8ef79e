//! Error classification for the request pipeline.
//!
//! Every failure that reaches the orchestrator's catch-all is either *suppressed*
//! (a known transient/operational pattern: logged, never shown to the user) or
//! *reportable* (logged at error level and sent to the user lower-cased).
//!
//! The suppressed patterns are data, versioned with [`SUPPRESSED_PATTERNS_VERSION`],
//! so the list can grow without touching the matching code.

/// Bump when [`SUPPRESSED_PATTERNS`] changes.
pub const SUPPRESSED_PATTERNS_VERSION: u32 = 1;

/// Known transient patterns, matched as substrings of the lower-cased, trimmed error text.
pub const SUPPRESSED_PATTERNS: &[SuppressedPattern] = &[
    SuppressedPattern {
        needle: "unable to rename file",
        reason: SuppressedReason::RenameRace,
    },
    SuppressedPattern {
        needle: "postprocessing: error opening output files",
        reason: SuppressedReason::Postprocessing,
    },
    SuppressedPattern {
        needle: "timed out",
        reason: SuppressedReason::Timeout,
    },
    SuppressedPattern {
        needle: "no such file or directory",
        reason: SuppressedReason::MissingFile,
    },
    SuppressedPattern {
        needle: "error opening output files",
        reason: SuppressedReason::Postprocessing,
    },
    SuppressedPattern {
        needle: "socket timeout",
        reason: SuppressedReason::Timeout,
    },
];

/// Why a suppressed error is considered transient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressedReason {
    /// yt-dlp lost a race renaming its `.part`/`.temp` file
    RenameRace,
    /// Postprocessor could not open the output of a concurrent step
    Postprocessing,
    /// Socket or extraction timeout
    Timeout,
    /// File vanished between steps
    MissingFile,
}

/// One entry of the suppressed pattern table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuppressedPattern {
    pub needle: &'static str,
    pub reason: SuppressedReason,
}

/// Classification result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Logged only
    Suppressed(SuppressedPattern),
    /// Logged and surfaced to the user
    Reportable,
}

impl ErrorKind {
    pub fn is_reportable(&self) -> bool {
        matches!(self, ErrorKind::Reportable)
    }
}

/// Normalizes an error text the way it is matched and shown: lower-cased and trimmed.
pub fn normalize_error_text(message: &str) -> String {
    message.to_lowercase().trim().to_string()
}

/// Classifies an error message against [`SUPPRESSED_PATTERNS`].
pub fn classify(message: &str) -> ErrorKind {
    let normalized = normalize_error_text(message);
    SUPPRESSED_PATTERNS
        .iter()
        .find(|pattern| normalized.contains(pattern.needle))
        .map(|pattern| ErrorKind::Suppressed(*pattern))
        .unwrap_or(ErrorKind::Reportable)
}

/// A classified failure, ready to be logged and (maybe) shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    /// Lower-cased, trimmed error text
    pub message: String,
}

impl ClassifiedError {
    pub fn new(message: &str) -> Self {
        Self {
            kind: classify(message),
            message: normalize_error_text(message),
        }
    }

    /// Logs the error at the level its kind calls for.
    pub fn log(&self) {
        match self.kind {
            ErrorKind::Suppressed(pattern) => {
                log::warn!(
                    "Ignored error ({:?}, patterns v{}): {}",
                    pattern.reason,
                    SUPPRESSED_PATTERNS_VERSION,
                    self.message
                );
            }
            ErrorKind::Reportable => {
                log::error!("Request failed: {}", self.message);
            }
        }
    }

    /// Picks the error to surface from several per-item failures:
    /// the first reportable one, otherwise the first suppressed one.
    pub fn most_relevant(errors: Vec<ClassifiedError>) -> Option<ClassifiedError> {
        let first_reportable = errors.iter().position(|e| e.kind.is_reportable());
        match first_reportable {
            Some(index) => errors.into_iter().nth(index),
            None => errors.into_iter().next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_timeout_is_suppressed() {
        let kind = classify("yt-dlp timed out after 600s");
        assert!(matches!(
            kind,
            ErrorKind::Suppressed(SuppressedPattern {
                reason: SuppressedReason::Timeout,
                ..
            })
        ));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert!(!classify("ERROR: Unable to rename file: [Errno 2]").is_reportable());
        assert!(!classify("  Socket Timeout  ").is_reportable());
        assert!(!classify("[Errno 2] No such file or directory: 'downloads/x.m4a'").is_reportable());
    }

    #[test]
    fn test_postprocessing_variants_are_suppressed() {
        assert!(!classify("Postprocessing: Error opening output files: Invalid argument").is_reportable());
        assert!(!classify("ERROR: error opening output files").is_reportable());
    }

    #[test]
    fn test_unknown_error_is_reportable() {
        assert_eq!(classify("disk full"), ErrorKind::Reportable);
        assert_eq!(classify("Telegram error: Bad Request: file is too big"), ErrorKind::Reportable);
    }

    #[test]
    fn test_classified_error_message_is_lowercased_and_trimmed() {
        let err = ClassifiedError::new("  Disk FULL \n");
        assert_eq!(err.message, "disk full");
        assert!(err.kind.is_reportable());
    }

    #[test]
    fn test_most_relevant_prefers_reportable() {
        let errors = vec![
            ClassifiedError::new("socket timeout"),
            ClassifiedError::new("disk full"),
            ClassifiedError::new("quota exceeded"),
        ];
        let picked = ClassifiedError::most_relevant(errors).unwrap();
        assert_eq!(picked.message, "disk full");
    }

    #[test]
    fn test_most_relevant_falls_back_to_first_suppressed() {
        let errors = vec![ClassifiedError::new("timed out"), ClassifiedError::new("socket timeout")];
        let picked = ClassifiedError::most_relevant(errors).unwrap();
        assert_eq!(picked.message, "timed out");
        assert!(ClassifiedError::most_relevant(Vec::new()).is_none());
    }

    #[test]
    fn test_pattern_table_is_lowercase() {
        for pattern in SUPPRESSED_PATTERNS {
            assert_eq!(pattern.needle, pattern.needle.to_lowercase());
        }
    }
}
