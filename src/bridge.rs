//! One media engine session bridged to one embedder texture.
//!
//! The engine pushes (callbacks become queued tasks, the worker turns them
//! into redraw signals); the host pulls (the paint path renders the current
//! frame into a reused buffer on demand). The two paths share nothing but the
//! engine session itself.

use std::sync::{Arc, Mutex};
use std::thread;

use crate::engine::{EngineFactory, MediaEngine, PixelFormat, RenderRequest, UpdateFlags};
use crate::queue::{self, Task, TaskQueue, TaskReceiver};
use crate::registry::{PaintSurface, TextureId, TextureRegistry};
use crate::{BYTES_PER_PIXEL, Error, FrameBuffer, FrameRef, MediaSource, Result};

/// The paint half of a bridge: the engine session plus the pixel buffer the
/// host pulls into. Shared between the bridge and the host's registry.
pub struct FrameSurface {
	engine: Arc<dyn MediaEngine>,
	buffer: Mutex<FrameBuffer>,
}

impl FrameSurface {
	fn new(engine: Arc<dyn MediaEngine>) -> Self {
		Self {
			engine,
			buffer: Mutex::new(FrameBuffer::default()),
		}
	}

	fn pull(&self, width: u32, height: u32) -> Result<FrameRef<'_>> {
		if width == 0 || height == 0 {
			return Err(Error::InvalidArgument);
		}

		let mut buffer = self.buffer.lock().map_err(|_| Error::Panic)?;
		if buffer.ensure_size(width, height) {
			tracing::debug!(width, height, "pixel buffer reallocated");
		}

		let mut request = RenderRequest {
			width,
			height,
			stride: width as usize * BYTES_PER_PIXEL,
			format: PixelFormat::Rgba,
			buf: buffer.data_mut(),
		};
		self.engine.render(&mut request)?;

		Ok(FrameRef::new(buffer))
	}
}

impl PaintSurface for FrameSurface {
	fn paint(&self, width: u32, height: u32) -> Result<FrameRef<'_>> {
		self.pull(width, height)
	}
}

/// One engine session, its registered texture, and the worker pumping engine
/// notifications into redraw signals.
pub struct FrameBridge {
	surface: Arc<FrameSurface>,
	registry: Arc<dyn TextureRegistry>,
	texture_id: TextureId,
	queue: TaskQueue,
	worker: Option<thread::JoinHandle<()>>,
}

impl FrameBridge {
	pub fn new(factory: &dyn EngineFactory, registry: Arc<dyn TextureRegistry>) -> Result<Self> {
		let engine = factory.session()?;
		let surface = Arc::new(FrameSurface::new(engine.clone()));
		let texture_id = registry.register(surface.clone());

		let (queue, tasks) = queue::channel();

		// The engine may keep firing callbacks while the bridge tears down;
		// a failed commit is the expected outcome then, not an error.
		let updates = queue.clone();
		engine.set_update_callback(Box::new(move || {
			if let Err(err) = updates.commit(Task::Update) {
				tracing::trace!(%err, "update callback ignored");
			}
		}));

		let wakeups = queue.clone();
		engine.set_wakeup_callback(Box::new(move || {
			if let Err(err) = wakeups.commit(Task::Event) {
				tracing::trace!(%err, "wakeup callback ignored");
			}
		}));

		let worker = thread::Builder::new()
			.name(format!("vidtex-{}", texture_id.0))
			.spawn({
				let engine = engine.clone();
				let registry = registry.clone();
				move || pump(tasks, engine, registry, texture_id)
			})
			.expect("failed to spawn worker thread");

		tracing::debug!(texture = texture_id.0, "frame bridge created");

		Ok(Self {
			surface,
			registry,
			texture_id,
			queue,
			worker: Some(worker),
		})
	}

	/// The identity the host's texture registry assigned at creation.
	pub fn texture_id(&self) -> TextureId {
		self.texture_id
	}

	/// Ask the engine to load and play a source.
	///
	/// Fire-and-forget: playback progress is only reported through frame
	/// updates on the texture.
	pub fn play(&self, source: &MediaSource) -> Result<()> {
		tracing::debug!(texture = self.texture_id.0, %source, "play");
		self.surface.engine.load(source)
	}

	/// The host's texture-paint pull path.
	///
	/// Renders the current frame at the requested size into the bridge's
	/// buffer, reusing the allocation unless the dimensions changed.
	pub fn pull_frame(&self, width: u32, height: u32) -> Result<FrameRef<'_>> {
		self.surface.pull(width, height)
	}

	/// Stop the worker and release the texture registration. Idempotent.
	///
	/// Ordering is load-bearing: the worker is joined before the engine
	/// session can be released, so an in-flight task never touches a dead
	/// session, and no redraw signal fires after `unregister`.
	fn close(&mut self) {
		let Some(worker) = self.worker.take() else {
			return;
		};

		self.queue.stop();
		if worker.join().is_err() {
			tracing::warn!(texture = self.texture_id.0, "worker panicked");
		}

		self.registry.unregister(self.texture_id);
		tracing::debug!(texture = self.texture_id.0, "frame bridge closed");
	}
}

impl Drop for FrameBridge {
	fn drop(&mut self) {
		self.close();
	}
}

fn pump(tasks: TaskReceiver, engine: Arc<dyn MediaEngine>, registry: Arc<dyn TextureRegistry>, texture_id: TextureId) {
	while let Some(task) = tasks.recv() {
		match task {
			Task::Update => {
				if engine.poll_update().contains(UpdateFlags::FRAME) {
					registry.mark_frame_available(texture_id);
				}
			}
			Task::Event => {
				let mut drained = 0usize;
				while engine.next_event().is_some() {
					// Contents are the engine's business; we only pump.
					drained += 1;
				}
				if drained > 0 {
					tracing::trace!(drained, "engine events drained");
				}
			}
		}
	}
}
