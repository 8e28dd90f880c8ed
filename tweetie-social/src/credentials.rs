//! Credentials file loader.
//!
//! Only the first line matters and it must look exactly like
//! `consumer_key, consumer_secret, access_token, access_token_secret`. The line is
//! trimmed as a whole; individual fields are taken verbatim.
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::error::CredentialsError;

const DELIMITER: &str = ", ";
const FIELDS: usize = 4;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    fn parse(line: &str, origin: impl FnOnce() -> String) -> Result<Self, CredentialsError> {
        let parts: Vec<&str> = line.trim().split(DELIMITER).collect();
        match parts.as_slice() {
            [key, secret, token, token_secret] => Ok(Self {
                consumer_key: key.to_string(),
                consumer_secret: secret.to_string(),
                access_token: token.to_string(),
                access_token_secret: token_secret.to_string(),
            }),
            _ => Err(CredentialsError::Malformed {
                origin: origin(),
                fields: parts.len(),
            }),
        }
    }
}

impl FromStr for Credentials {
    type Err = CredentialsError;

    /// ```
    /// use tweetie_social::Credentials;
    ///
    /// let creds: Credentials = "  k, s, t, ts \n".parse().unwrap();
    /// assert_eq!(creds.consumer_key, "k");
    /// assert_eq!(creds.access_token_secret, "ts");
    /// assert!("k,s,t,ts".parse::<Credentials>().is_err());
    /// ```
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        Self::parse(line, || "credentials line".to_string())
    }
}

/// Read the first line of `path` into [`Credentials`].
pub fn load_keys(path: impl AsRef<Path>) -> Result<Credentials, CredentialsError> {
    let path = path.as_ref();
    let io_err = |source| CredentialsError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut line = String::new();
    BufReader::new(File::open(path).map_err(io_err)?)
        .read_line(&mut line)
        .map_err(io_err)?;

    let creds = Credentials::parse(&line, || path.display().to_string())?;
    tracing::debug!(path = %path.display(), fields = FIELDS, "credentials loaded");
    Ok(creds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_keys(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_four_fields_in_order() {
        let file = write_keys("a, b, c, d\n");
        let creds = load_keys(file.path()).unwrap();
        assert_eq!(
            creds,
            Credentials {
                consumer_key: "a".into(),
                consumer_secret: "b".into(),
                access_token: "c".into(),
                access_token_secret: "d".into(),
            }
        );
    }

    #[test]
    fn strips_whitespace_around_the_line() {
        let file = write_keys("\t  a, b, c, d   \r\n");
        let creds = load_keys(file.path()).unwrap();
        assert_eq!(creds.consumer_key, "a");
        assert_eq!(creds.access_token_secret, "d");
    }

    #[test]
    fn only_first_line_is_read() {
        let file = write_keys("a, b, c, d\nthis, line, is, ignored, entirely\n");
        let creds = load_keys(file.path()).unwrap();
        assert_eq!(creds.access_token, "c");
    }

    #[test]
    fn wrong_field_counts_are_rejected() {
        for (line, expected) in [
            ("a, b, c", 3),
            ("a, b, c, d, e", 5),
            ("a,b,c,d", 1),
            ("", 1),
        ] {
            let file = write_keys(line);
            match load_keys(file.path()) {
                Err(CredentialsError::Malformed { fields, origin }) => {
                    assert_eq!(fields, expected, "line {line:?}");
                    assert_eq!(origin, file.path().display().to_string());
                }
                other => panic!("line {line:?}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");
        assert!(matches!(
            load_keys(&missing),
            Err(CredentialsError::Io { path, .. }) if path == missing
        ));
    }

    #[test]
    fn debug_hides_secrets() {
        let creds: Credentials = "key, secret, token, tsecret".parse().unwrap();
        let shown = format!("{creds:?}");
        assert!(shown.contains("key"));
        assert!(!shown.contains("tsecret"));
        assert!(!shown.contains("\"secret\""));
    }
}
