//! # vidtex: native media engine playback as embedder textures
//!
//! `vidtex` sits between a UI embedder's method-channel protocol and a native
//! media-playback engine, exposing the engine's rendered frames as an
//! embedder-managed texture. The embedder's plugin runtime and the engine
//! itself stay outside the crate, behind two small capability seams:
//!
//! - [EngineFactory] / [MediaEngine]: one playback session with a software
//!   render context, two notification callbacks, an update-flag query, a
//!   non-blocking event poll and a render-into-buffer call.
//! - [TextureRegistry] / [PaintSurface]: texture registration, release, and
//!   the "new frame available" redraw signal; the registered surface is the
//!   host's synchronous paint pull path.
//!
//! In between, per texture, a [FrameBridge] owns the session, one worker
//! thread, and the reused RGBA [FrameBuffer]. Engine callbacks commit tasks
//! to a blocking queue; the worker turns frame-ready updates into redraw
//! signals and drains engine events. The host addresses bridges through the
//! [Dispatcher] using generation-checked integer [Handle]s, so a stale or
//! foreign handle is an error code rather than undefined behavior:
//!
//! - `createTexture` → handle
//! - `getTextureId` (handle) → texture id
//! - `play` (handle, source) → empty
//! - `closeTexture` (handle) → empty; stops the worker, joins it, then
//!   releases the texture and the engine session, in that order.

mod api;
mod bridge;
mod buffer;
mod engine;
mod error;
mod handle;
mod log;
mod queue;
mod registry;
mod source;
mod state;

pub use api::*;
pub use bridge::*;
pub use buffer::*;
pub use engine::*;
pub use error::*;
pub use handle::*;
pub use log::*;
pub use registry::*;
pub use source::*;
