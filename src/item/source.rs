use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const REMOTE_SCHEMES: [&str; 3] = ["http://", "https://", "ftp://"];

/// Where a picture's image comes from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PictureSource {
    /// A file on the local file system.
    Local(PathBuf),
    /// A network URI, fetched by the embedding application.
    Remote(String),
}

impl PictureSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl FromStr for PictureSource {
    type Err = Infallible;

    /// Classifies a path or URI. URIs with a network scheme are remote,
    /// anything else is a local path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        if REMOTE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
            Ok(Self::Remote(trimmed.to_owned()))
        } else {
            Ok(Self::Local(PathBuf::from(trimmed)))
        }
    }
}

impl fmt::Display for PictureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(uri) => f.write_str(uri),
        }
    }
}
