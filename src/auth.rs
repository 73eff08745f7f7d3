use std::{
    fmt,
    path::{
        Path,
        PathBuf,
    },
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("failed to read credentials file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed credentials file {}: expected `username password` only", path.display())]
    Malformed { path: PathBuf },
}

/// Basic auth credentials for the catalog.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Reads the credentials file. This is done for every authenticated
    /// request, so edits to the file are picked up between downloads.
    pub async fn load(path: &Path) -> Result<Self, CredentialsError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| {
                CredentialsError::Read {
                    path: path.to_owned(),
                    source,
                }
            })?;

        Self::parse(&contents).ok_or_else(|| {
            CredentialsError::Malformed {
                path: path.to_owned(),
            }
        })
    }

    /// Parses the first line as exactly two whitespace-separated tokens.
    pub fn parse(contents: &str) -> Option<Self> {
        let mut tokens = contents.lines().next()?.split_whitespace();

        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(username), Some(password), None) => {
                Some(Self {
                    username: username.to_owned(),
                    password: password.to_owned(),
                })
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
