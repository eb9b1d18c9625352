//! The method-channel dispatcher.
//!
//! The host's plugin glue decodes each channel invocation into a method name
//! and a flat list of [Value] arguments, calls [Dispatcher::dispatch], and
//! encodes the [MethodReply] back onto the channel. Everything else (handle
//! validation, routing, error codes) lives here, where it can be tested
//! without a host runtime.

use std::panic;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::engine::EngineFactory;
use crate::handle::Handle;
use crate::registry::TextureRegistry;
use crate::state::State;
use crate::{Error, MediaSource, Result};

/// A method-channel argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Int(i64),
	Str(String),
}

/// The reply sent back over the method channel.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodReply {
	/// The call succeeded; `Some` carries an integer result (a handle or a
	/// texture id), `None` is an empty success.
	Success(Option<i64>),

	/// The call failed; `code` is stable (see [Error::code]), `message` is
	/// human-oriented.
	Error { code: i32, message: String },

	/// The method name is not part of this plugin's surface.
	NotImplemented,
}

/// Routes named method invocations to the live-bridge table.
pub struct Dispatcher {
	factory: Arc<dyn EngineFactory>,
	registry: Arc<dyn TextureRegistry>,
	state: Mutex<State>,
}

impl Dispatcher {
	pub fn new(factory: Arc<dyn EngineFactory>, registry: Arc<dyn TextureRegistry>) -> Self {
		Self {
			factory,
			registry,
			state: Mutex::new(State::default()),
		}
	}

	/// Handle one method invocation from the host.
	///
	/// Never panics across the host boundary: a panic inside an operation (or
	/// the poisoned lock it leaves behind) is reported as [Error::Panic].
	pub fn dispatch(&self, method: &str, args: &[Value]) -> MethodReply {
		let result = panic::catch_unwind(panic::AssertUnwindSafe(|| self.call(method, args)));

		match result {
			Ok(Some(Ok(value))) => MethodReply::Success(value),
			Ok(Some(Err(err))) => {
				tracing::debug!(method, %err, "method failed");
				MethodReply::Error {
					code: err.code(),
					message: err.to_string(),
				}
			}
			Ok(None) => {
				tracing::debug!(method, "method not implemented");
				MethodReply::NotImplemented
			}
			Err(_) => MethodReply::Error {
				code: Error::Panic.code(),
				message: Error::Panic.to_string(),
			},
		}
	}

	/// `None` means the method name is unknown.
	fn call(&self, method: &str, args: &[Value]) -> Option<Result<Option<i64>>> {
		Some(match method {
			"createTexture" => self.create_texture(),
			"getTextureId" => self.get_texture_id(args),
			"closeTexture" => self.close_texture(args),
			"play" => self.play(args),
			_ => return None,
		})
	}

	fn create_texture(&self) -> Result<Option<i64>> {
		let handle = self.state()?.create(self.factory.as_ref(), self.registry.clone())?;
		Ok(Some(handle.to_raw()))
	}

	fn get_texture_id(&self, args: &[Value]) -> Result<Option<i64>> {
		let handle = arg_handle(args, 0)?;
		let id = self.state()?.texture_id(handle)?;
		Ok(Some(id.0))
	}

	fn close_texture(&self, args: &[Value]) -> Result<Option<i64>> {
		let handle = arg_handle(args, 0)?;
		self.state()?.close(handle)?;
		Ok(None)
	}

	fn play(&self, args: &[Value]) -> Result<Option<i64>> {
		let handle = arg_handle(args, 0)?;
		let source: MediaSource = arg_str(args, 1)?.parse()?;
		self.state()?.play(handle, &source)?;
		Ok(None)
	}

	fn state(&self) -> Result<MutexGuard<'_, State>> {
		self.state.lock().map_err(|_| Error::Panic)
	}
}

fn arg_handle(args: &[Value], index: usize) -> Result<Handle> {
	match args.get(index) {
		Some(Value::Int(raw)) => Handle::from_raw(*raw),
		_ => Err(Error::InvalidArgument),
	}
}

fn arg_str(args: &[Value], index: usize) -> Result<&str> {
	match args.get(index) {
		Some(Value::Str(value)) => Ok(value),
		_ => Err(Error::InvalidArgument),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::mock::{MockEngine, MockFactory};
	use crate::registry::TextureId;
	use crate::registry::mock::MockRegistry;

	fn dispatcher() -> (Dispatcher, Arc<MockEngine>, Arc<MockRegistry>) {
		let factory = Arc::new(MockFactory::new());
		let engine = factory.engine.clone();
		let registry = Arc::new(MockRegistry::default());
		(Dispatcher::new(factory, registry.clone()), engine, registry)
	}

	fn create(dispatcher: &Dispatcher) -> i64 {
		match dispatcher.dispatch("createTexture", &[]) {
			MethodReply::Success(Some(handle)) => handle,
			other => panic!("unexpected reply: {other:?}"),
		}
	}

	#[test]
	fn test_create_returns_handle() {
		let (dispatcher, _engine, _registry) = dispatcher();
		let handle = create(&dispatcher);
		assert!(handle > 0);
	}

	#[test]
	fn test_texture_id_is_stable() {
		let (dispatcher, _engine, _registry) = dispatcher();
		let handle = create(&dispatcher);
		let args = [Value::Int(handle)];

		let first = dispatcher.dispatch("getTextureId", &args);
		let MethodReply::Success(Some(id)) = first else {
			panic!("unexpected reply: {first:?}");
		};
		assert!(id >= 0);

		for _ in 0..3 {
			assert_eq!(dispatcher.dispatch("getTextureId", &args), MethodReply::Success(Some(id)));
		}
	}

	#[test]
	fn test_close_invalidates_handle() {
		let (dispatcher, _engine, registry) = dispatcher();
		let handle = create(&dispatcher);
		let args = [Value::Int(handle)];

		let MethodReply::Success(Some(id)) = dispatcher.dispatch("getTextureId", &args) else {
			panic!("expected texture id");
		};

		assert_eq!(dispatcher.dispatch("closeTexture", &args), MethodReply::Success(None));
		assert!(registry.was_unregistered(TextureId(id)));

		// Explicit failure, not a crash, on the dead handle.
		let reply = dispatcher.dispatch("getTextureId", &args);
		assert_eq!(
			reply,
			MethodReply::Error {
				code: Error::NotFound.code(),
				message: Error::NotFound.to_string(),
			}
		);

		// Double close reports the same.
		let reply = dispatcher.dispatch("closeTexture", &args);
		assert!(matches!(reply, MethodReply::Error { code, .. } if code == Error::NotFound.code()));
	}

	#[test]
	fn test_play_takes_explicit_source() {
		let (dispatcher, engine, _registry) = dispatcher();
		let handle = create(&dispatcher);

		let args = [Value::Int(handle), Value::Str("https://example.com/live.m3u8".into())];
		assert_eq!(dispatcher.dispatch("play", &args), MethodReply::Success(None));
		assert_eq!(engine.loaded().len(), 1);

		// The source is required, not baked in.
		let reply = dispatcher.dispatch("play", &[Value::Int(handle)]);
		assert!(matches!(reply, MethodReply::Error { code, .. } if code == Error::InvalidArgument.code()));

		let reply = dispatcher.dispatch("play", &[Value::Int(handle), Value::Str(String::new())]);
		assert!(matches!(reply, MethodReply::Error { code, .. } if code == Error::InvalidSource(String::new()).code()));
	}

	#[test]
	fn test_unknown_method_not_implemented() {
		let (dispatcher, _engine, _registry) = dispatcher();

		assert_eq!(dispatcher.dispatch("pause", &[]), MethodReply::NotImplemented);
		assert_eq!(dispatcher.dispatch("", &[]), MethodReply::NotImplemented);
	}

	#[test]
	fn test_malformed_handles_are_rejected() {
		let (dispatcher, _engine, _registry) = dispatcher();
		create(&dispatcher);

		for raw in [0i64, -1, i64::MIN] {
			let reply = dispatcher.dispatch("getTextureId", &[Value::Int(raw)]);
			assert!(
				matches!(reply, MethodReply::Error { code, .. } if code == Error::InvalidHandle.code()),
				"raw={raw}"
			);
		}

		// Well-formed but never issued.
		let reply = dispatcher.dispatch("getTextureId", &[Value::Int((7 << 32) | 42)]);
		assert!(matches!(reply, MethodReply::Error { code, .. } if code == Error::NotFound.code()));

		// Wrong argument type.
		let reply = dispatcher.dispatch("getTextureId", &[Value::Str("1".into())]);
		assert!(matches!(reply, MethodReply::Error { code, .. } if code == Error::InvalidArgument.code()));

		// Missing argument.
		let reply = dispatcher.dispatch("closeTexture", &[]);
		assert!(matches!(reply, MethodReply::Error { code, .. } if code == Error::InvalidArgument.code()));
	}

	#[test]
	fn test_create_surfaces_engine_failure() {
		let registry = Arc::new(MockRegistry::default());
		let dispatcher = Dispatcher::new(Arc::new(MockFactory::failing()), registry);

		let reply = dispatcher.dispatch("createTexture", &[]);
		let MethodReply::Error { code, message } = reply else {
			panic!("expected an error: {reply:?}");
		};
		assert!(code < 0);
		assert!(message.contains("engine init failed"));
	}

	#[test]
	fn test_stale_handle_after_reuse_via_channel() {
		let (dispatcher, _engine, _registry) = dispatcher();

		let first = create(&dispatcher);
		assert_eq!(dispatcher.dispatch("closeTexture", &[Value::Int(first)]), MethodReply::Success(None));

		let second = create(&dispatcher);
		assert_ne!(first, second);

		let reply = dispatcher.dispatch("getTextureId", &[Value::Int(first)]);
		assert!(matches!(reply, MethodReply::Error { code, .. } if code == Error::NotFound.code()));
		assert!(matches!(dispatcher.dispatch("getTextureId", &[Value::Int(second)]), MethodReply::Success(Some(_))));
	}
}
