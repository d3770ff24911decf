//! File-level pattern checks used by the `webapi-match` binary.

use crate::assert::{
    assert_contains_subset, assert_key_matches_pattern, assert_matches_pattern,
    parse_actual_json, parse_expected_json,
};
use crate::error::AssertionError;
use crate::matcher::ChainMatcher;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How the expected document is compared against the actual one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    /// Recursive pattern matching through the chain.
    #[default]
    Pattern,
    /// Loose subset comparison without pattern tokens.
    Contains,
}

impl FromStr for CheckMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pattern" => Ok(CheckMode::Pattern),
            "contains" => Ok(CheckMode::Contains),
            other => Err(format!(
                "unknown mode '{other}', expected 'pattern' or 'contains'"
            )),
        }
    }
}

impl fmt::Display for CheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckMode::Pattern => write!(f, "pattern"),
            CheckMode::Contains => write!(f, "contains"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub mode: CheckMode,
    /// Only match the value under this top-level key (pattern mode).
    pub key: Option<String>,
}

/// Result of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Failed,
    /// The inputs could not be read or parsed.
    Error,
}

impl CheckStatus {
    /// Process exit code for this status.
    pub fn exit_code(&self) -> i32 {
        match self {
            CheckStatus::Passed => 0,
            CheckStatus::Failed => 1,
            CheckStatus::Error => 2,
        }
    }
}

/// Serializable outcome of comparing one expected file with one actual file.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    #[serde(serialize_with = "serialize_path")]
    pub pattern_file: PathBuf,
    #[serde(serialize_with = "serialize_path")]
    pub actual_file: PathBuf,
    pub mode: CheckMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn serialize_path<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&path.to_string_lossy())
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Passed
    }
}

/// Compare the JSON in `pattern_file` against the JSON in `actual_file`.
///
/// Read and parse failures are reported with [`CheckStatus::Error`];
/// assertion failures with [`CheckStatus::Failed`].
pub fn check_files(
    chain: &ChainMatcher,
    pattern_file: &Path,
    actual_file: &Path,
    options: &CheckOptions,
) -> CheckReport {
    let mut report = CheckReport {
        pattern_file: pattern_file.to_path_buf(),
        actual_file: actual_file.to_path_buf(),
        mode: options.mode,
        key: options.key.clone(),
        status: CheckStatus::Passed,
        message: None,
    };

    let read = |path: &Path| {
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))
    };
    let contents = read(pattern_file).and_then(|p| read(actual_file).map(|a| (p, a)));
    let (pattern, actual) = match contents {
        Ok(pair) => pair,
        Err(message) => {
            report.status = CheckStatus::Error;
            report.message = Some(message);
            return report;
        }
    };

    let (status, message) = check_json(chain, &pattern, &actual, options);
    report.status = status;
    report.message = message;
    report
}

/// Compare two JSON documents held in memory.
pub fn check_json(
    chain: &ChainMatcher,
    pattern: &str,
    actual: &str,
    options: &CheckOptions,
) -> (CheckStatus, Option<String>) {
    if options.key.is_some() && options.mode == CheckMode::Contains {
        return (
            CheckStatus::Error,
            Some("--key is only supported with --mode pattern".to_string()),
        );
    }

    let actual = match parse_actual_json(actual) {
        Ok(v) => v,
        Err(e) => return (CheckStatus::Error, Some(e.to_string())),
    };

    let outcome = match (&options.key, options.mode) {
        (Some(key), CheckMode::Pattern) => {
            assert_key_matches_pattern(chain, key, pattern.trim(), &actual)
        }
        (_, mode) => match parse_expected_json(pattern) {
            Ok(expected) if mode == CheckMode::Contains => {
                assert_contains_subset(&expected, &actual)
            }
            Ok(expected) => assert_matches_pattern(chain, &expected, &actual),
            Err(e) => return (CheckStatus::Error, Some(e.to_string())),
        },
    };

    match outcome {
        Ok(()) => (CheckStatus::Passed, None),
        Err(e @ AssertionError::UnsupportedPattern { .. }) => {
            (CheckStatus::Error, Some(e.to_string()))
        }
        Err(e) => (CheckStatus::Failed, Some(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_check_files_pass() {
        let pattern = write_temp(r#"{"id": "@uuid@", "name": "@string@.maxLength(5)"}"#);
        let actual =
            write_temp(r#"{"id": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "name": "bob"}"#);

        let report = check_files(
            &ChainMatcher::standard(),
            pattern.path(),
            actual.path(),
            &CheckOptions::default(),
        );
        assert!(report.passed(), "{:?}", report.message);
        assert_eq!(report.status.exit_code(), 0);
    }

    #[test]
    fn test_check_files_fail() {
        let pattern = write_temp(r#"{"id": "@uuid@"}"#);
        let actual = write_temp(r#"{"id": "42"}"#);

        let report = check_files(
            &ChainMatcher::standard(),
            pattern.path(),
            actual.path(),
            &CheckOptions::default(),
        );
        assert_eq!(report.status, CheckStatus::Failed);
        assert_eq!(report.status.exit_code(), 1);
        assert!(report.message.unwrap().contains("$.id"));
    }

    #[test]
    fn test_check_files_missing_file_is_input_error() {
        let pattern = write_temp("{}");
        let report = check_files(
            &ChainMatcher::standard(),
            pattern.path(),
            Path::new("/nonexistent/actual.json"),
            &CheckOptions::default(),
        );
        assert_eq!(report.status, CheckStatus::Error);
        assert_eq!(report.status.exit_code(), 2);
        assert!(report.message.unwrap().contains("Failed to read"));
    }

    #[test]
    fn test_check_json_rejects_key_in_contains_mode() {
        let options = CheckOptions {
            mode: CheckMode::Contains,
            key: Some("id".to_string()),
        };
        let (status, message) =
            check_json(&ChainMatcher::standard(), "1", r#"{"id": 1}"#, &options);
        assert_eq!(status, CheckStatus::Error);
        assert!(message.unwrap().contains("--key"));
    }

    #[test]
    fn test_check_json_contains_mode() {
        let options = CheckOptions {
            mode: CheckMode::Contains,
            key: None,
        };
        let chain = ChainMatcher::standard();
        let (status, _) = check_json(&chain, r#"{"a": 1}"#, r#"{"a": 1.0, "b": 2}"#, &options);
        assert_eq!(status, CheckStatus::Passed);

        let (status, _) = check_json(&chain, r#"{"a": "@integer@"}"#, r#"{"a": 1}"#, &options);
        assert_eq!(status, CheckStatus::Failed);
    }

    #[test]
    fn test_check_json_key_mode() {
        let options = CheckOptions {
            mode: CheckMode::Pattern,
            key: Some("id".to_string()),
        };
        let chain = ChainMatcher::standard();
        let (status, _) = check_json(
            &chain,
            "@uuid@\n",
            r#"{"id": "3fa85f64-5717-4562-b3fc-2c963f66afa6"}"#,
            &options,
        );
        assert_eq!(status, CheckStatus::Passed);
    }

    #[test]
    fn test_check_json_input_errors() {
        let chain = ChainMatcher::standard();
        let options = CheckOptions::default();

        let (status, message) = check_json(&chain, "{oops", "{}", &options);
        assert_eq!(status, CheckStatus::Error);
        assert!(message.unwrap().contains("Can not convert etalon to json"));

        let (status, _) = check_json(&chain, "{}", "not json", &options);
        assert_eq!(status, CheckStatus::Error);

        let (status, _) = check_json(&chain, r#"{"a": "@strng@"}"#, r#"{"a": 1}"#, &options);
        assert_eq!(status, CheckStatus::Error);
    }

    #[test]
    fn test_report_serializes_lowercase_status() {
        let report = CheckReport {
            pattern_file: PathBuf::from("p.json"),
            actual_file: PathBuf::from("a.json"),
            mode: CheckMode::Pattern,
            key: None,
            status: CheckStatus::Failed,
            message: Some("nope".to_string()),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["mode"], "pattern");
        assert_eq!(json["pattern_file"], "p.json");
        assert!(json.get("key").is_none());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("pattern".parse::<CheckMode>(), Ok(CheckMode::Pattern));
        assert_eq!("contains".parse::<CheckMode>(), Ok(CheckMode::Contains));
        assert!("fuzzy".parse::<CheckMode>().is_err());
    }
}
