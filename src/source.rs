use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::Error;

/// Where to play from: a URL or a local file path.
///
/// The engine receives the textual form either way; parsing up front rejects
/// empty input instead of handing the engine a command that can only fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
	Url(url::Url),
	Path(PathBuf),
}

impl FromStr for MediaSource {
	type Err = Error;

	fn from_str(input: &str) -> Result<Self, Self::Err> {
		if input.is_empty() {
			return Err(Error::InvalidSource("empty source".to_string()));
		}

		match url::Url::parse(input) {
			// A single-letter scheme is a Windows drive letter, not a URL.
			Ok(url) if url.scheme().len() > 1 => Ok(Self::Url(url)),
			_ => Ok(Self::Path(PathBuf::from(input))),
		}
	}
}

impl fmt::Display for MediaSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Url(url) => url.as_str().fmt(f),
			Self::Path(path) => path.display().fmt(f),
		}
	}
}
