use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Logging configuration, applied once from the host's plugin-init path.
#[derive(Debug, Clone, Copy)]
pub struct Log {
	pub level: Level,
}

impl Default for Log {
	fn default() -> Self {
		Self { level: Level::INFO }
	}
}

impl Log {
	/// Install the global subscriber.
	///
	/// `RUST_LOG` overrides the configured level. Later calls are ignored, so
	/// the host does not need to coordinate across plugin instances.
	pub fn init(self) {
		let filter = EnvFilter::builder()
			.with_default_directive(LevelFilter::from_level(self.level).into())
			.from_env_lossy();

		tracing_subscriber::fmt()
			.with_env_filter(filter)
			.with_writer(std::io::stderr)
			.try_init()
			.ok();
	}
}
