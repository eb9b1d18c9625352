use std::sync::Arc;

/// Failures surfaced to the host through the method channel.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
	/// The handle does not refer to a live frame bridge.
	#[error("not found")]
	NotFound,

	/// The handle value is not a valid encoding.
	#[error("invalid handle")]
	InvalidHandle,

	/// A method argument was missing or had the wrong type.
	#[error("invalid argument")]
	InvalidArgument,

	/// The playback source could not be parsed.
	#[error("invalid source: {0}")]
	InvalidSource(String),

	/// A task was committed after the bridge was stopped.
	#[error("stopped")]
	Stopped,

	/// The engine session or its render context failed to initialize. Fatal;
	/// there is no retry.
	#[error("engine init failed: {0}")]
	EngineInit(Arc<anyhow::Error>),

	/// The engine's software render call failed.
	#[error("render failed: {0}")]
	Render(Arc<anyhow::Error>),

	/// The engine rejected the load-and-play command.
	#[error("playback failed: {0}")]
	Playback(Arc<anyhow::Error>),

	#[error("panicked")]
	Panic,
}

impl Error {
	/// A stable negative code surfaced to the host; zero means success.
	pub fn code(&self) -> i32 {
		match self {
			Self::NotFound => -1,
			Self::InvalidHandle => -2,
			Self::InvalidArgument => -3,
			Self::InvalidSource(_) => -4,
			Self::Stopped => -5,
			Self::EngineInit(_) => -6,
			Self::Render(_) => -7,
			Self::Playback(_) => -8,
			Self::Panic => -99,
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;
