//! The media engine seam.
//!
//! The engine glue (the code that links the actual native library) implements
//! these traits; everything above them is engine-agnostic. The surface mirrors
//! the C API of a software-rendering media engine: two callbacks installed at
//! session setup, a level-triggered update-flag query, a non-blocking event
//! poll, and a render call that writes one packed RGBA frame into a buffer the
//! caller owns.

use std::sync::Arc;

use crate::{MediaSource, Result};

/// A callback installed into the engine; may fire from any engine thread.
pub type EngineCallback = Box<dyn Fn() + Send + Sync>;

/// Render-update flags returned by [MediaEngine::poll_update].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateFlags(u64);

impl UpdateFlags {
	/// A new frame is ready to be pulled.
	pub const FRAME: Self = Self(1 << 0);

	pub fn new(bits: u64) -> Self {
		Self(bits)
	}

	pub fn bits(self) -> u64 {
		self.0
	}

	pub fn contains(self, flag: Self) -> bool {
		self.0 & flag.0 != 0
	}
}

/// One engine event.
///
/// The bridge drains events so the engine can make progress; it never
/// interprets them, so only the numeric kind is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineEvent {
	pub kind: u32,
}

/// Pixel formats the software render path can produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PixelFormat {
	#[default]
	Rgba,
}

impl PixelFormat {
	/// The engine-facing format name.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Rgba => "rgba",
		}
	}
}

/// A software render destination: one tightly-packed frame.
pub struct RenderRequest<'a> {
	pub width: u32,
	pub height: u32,

	/// Bytes per row; always width * 4 for [PixelFormat::Rgba].
	pub stride: usize,

	pub format: PixelFormat,
	pub buf: &'a mut [u8],
}

/// One live media engine session plus its software render context.
///
/// Dropping the last reference releases the render context and destroys the
/// session. The bridge joins its worker before letting go of its references,
/// so implementations may assume no calls arrive during `Drop`.
pub trait MediaEngine: Send + Sync {
	/// Install the wakeup callback, fired when events are pending.
	fn set_wakeup_callback(&self, callback: EngineCallback);

	/// Install the render-update callback, fired when render state changed.
	fn set_update_callback(&self, callback: EngineCallback);

	/// Query and clear the pending render-update flags.
	fn poll_update(&self) -> UpdateFlags;

	/// Render the current frame into `request.buf`.
	fn render(&self, request: &mut RenderRequest<'_>) -> Result<()>;

	/// Non-blocking event poll; `None` once drained.
	fn next_event(&self) -> Option<EngineEvent>;

	/// Asynchronously load a source and begin playback.
	///
	/// Fire-and-forget: an `Ok` means the command was accepted, not that
	/// playback started. Progress is only observable through frame updates.
	fn load(&self, source: &MediaSource) -> Result<()>;
}

/// Creates engine sessions; implemented by the engine glue.
pub trait EngineFactory: Send + Sync {
	/// Create and initialize one session with a software render context.
	fn session(&self) -> Result<Arc<dyn MediaEngine>>;
}
