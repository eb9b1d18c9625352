//! The host texture registry seam.
//!
//! The host's plugin glue implements [TextureRegistry] on top of whatever its
//! UI toolkit provides. Registration hands over a [PaintSurface] instead of a
//! raw callback so the paint path stays a plain synchronous method call.

use std::sync::Arc;

use crate::{FrameRef, Result};

/// Identity assigned by the host's texture registry; immutable for the
/// lifetime of its bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub i64);

/// The host's texture-paint pull path.
pub trait PaintSurface: Send + Sync {
	/// Render the current frame at the requested size and borrow the result.
	///
	/// Called synchronously from the host's paint thread. The borrow must be
	/// released before the next paint.
	fn paint(&self, width: u32, height: u32) -> Result<FrameRef<'_>>;
}

/// The host texture registry capability.
pub trait TextureRegistry: Send + Sync {
	/// Register a paint source, returning its texture identity.
	fn register(&self, surface: Arc<dyn PaintSurface>) -> TextureId;

	/// Release a registration.
	///
	/// The registrar must drop its surface reference and issue no further
	/// paints for this id.
	fn unregister(&self, id: TextureId);

	/// Signal that a new frame is available for `id`.
	///
	/// A pure signal: no frame data moves until the host paints.
	fn mark_frame_available(&self, id: TextureId);
}
