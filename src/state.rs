use std::sync::Arc;

use crate::bridge::FrameBridge;
use crate::engine::EngineFactory;
use crate::handle::{Handle, HandleMap};
use crate::registry::{TextureId, TextureRegistry};
use crate::{MediaSource, Result};

/// All live frame bridges, keyed by handle.
///
/// Every operation validates the handle against the table: stale, closed or
/// foreign values fail with an explicit error instead of being trusted.
#[derive(Default)]
pub struct State {
	bridges: HandleMap<FrameBridge>,
}

impl State {
	pub fn create(&mut self, factory: &dyn EngineFactory, registry: Arc<dyn TextureRegistry>) -> Result<Handle> {
		let bridge = FrameBridge::new(factory, registry)?;
		Ok(self.bridges.insert(bridge))
	}

	pub fn texture_id(&self, handle: Handle) -> Result<TextureId> {
		Ok(self.bridges.get(handle)?.texture_id())
	}

	pub fn close(&mut self, handle: Handle) -> Result<()> {
		// Dropping the bridge stops its worker and releases the texture.
		drop(self.bridges.remove(handle)?);
		Ok(())
	}

	pub fn play(&self, handle: Handle, source: &MediaSource) -> Result<()> {
		self.bridges.get(handle)?.play(source)
	}

	pub fn len(&self) -> usize {
		self.bridges.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bridges.is_empty()
	}
}
