//! Generation-checked handles for live frame bridges.
//!
//! The host addresses a bridge by a single integer over the method channel.
//! Casting a pointer to an integer would make every stale handle undefined
//! behavior, so a handle is instead a slot in a [slab::Slab] plus a generation
//! counter. A handle that was closed, or that aliases a reused slot, fails
//! validation with an explicit error.

use crate::{Error, Result};

const SLOT_BITS: u32 = 32;

// The generation occupies the upper half of the i64 but must leave the sign
// bit clear so every encoded handle stays positive.
const GENERATION_MASK: u32 = 0x7fff_ffff;

/// An opaque identity for one live frame bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
	slot: u32,
	generation: u32,
}

impl Handle {
	/// Encode as a method-channel integer; always positive and non-zero.
	pub fn to_raw(self) -> i64 {
		((self.generation as i64) << SLOT_BITS) | (self.slot as i64 + 1)
	}

	/// Decode a method-channel integer.
	///
	/// Only the shape is validated here; liveness is checked by the
	/// [HandleMap] lookup.
	pub fn from_raw(raw: i64) -> Result<Self> {
		if raw <= 0 {
			return Err(Error::InvalidHandle);
		}

		let slot = (raw & 0xffff_ffff) as u32;
		if slot == 0 {
			return Err(Error::InvalidHandle);
		}

		Ok(Self {
			slot: slot - 1,
			generation: (raw >> SLOT_BITS) as u32,
		})
	}
}

/// Slab-backed storage with a per-slot generation.
///
/// Removing an entry bumps its slot's generation, so handles to the old
/// occupant keep failing even after the slot is reused.
pub struct HandleMap<T> {
	slots: slab::Slab<T>,
	generations: Vec<u32>,
}

impl<T> Default for HandleMap<T> {
	fn default() -> Self {
		Self {
			slots: slab::Slab::new(),
			generations: Vec::new(),
		}
	}
}

impl<T> HandleMap<T> {
	pub fn insert(&mut self, value: T) -> Handle {
		let slot = self.slots.insert(value);
		debug_assert!(slot < u32::MAX as usize);

		if slot >= self.generations.len() {
			self.generations.resize(slot + 1, 0);
		}

		Handle {
			slot: slot as u32,
			generation: self.generations[slot],
		}
	}

	pub fn get(&self, handle: Handle) -> Result<&T> {
		self.check(handle)?;
		self.slots.get(handle.slot as usize).ok_or(Error::NotFound)
	}

	pub fn get_mut(&mut self, handle: Handle) -> Result<&mut T> {
		self.check(handle)?;
		self.slots.get_mut(handle.slot as usize).ok_or(Error::NotFound)
	}

	pub fn remove(&mut self, handle: Handle) -> Result<T> {
		self.check(handle)?;
		let slot = handle.slot as usize;
		if !self.slots.contains(slot) {
			return Err(Error::NotFound);
		}

		self.generations[slot] = (self.generations[slot] + 1) & GENERATION_MASK;
		Ok(self.slots.remove(slot))
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	fn check(&self, handle: Handle) -> Result<()> {
		let expected = self.generations.get(handle.slot as usize).copied().unwrap_or(0);
		if handle.generation != expected {
			return Err(Error::NotFound);
		}

		Ok(())
	}
}
