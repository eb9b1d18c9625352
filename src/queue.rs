//! The bridge's task queue.
//!
//! Engine callbacks commit tasks from whatever thread the engine fires them
//! on; the bridge's worker blocks on the other end. The channel gives the
//! FIFO ordering and the enqueue-before-observe happens-before edge; the
//! worker sleeps when idle instead of spinning.
//!
//! The queue never grows without bound: the engine's flag query and event
//! poll are level-triggered, so a second `Update` (or `Event`) committed
//! while the first is still queued adds nothing and is acknowledged without
//! enqueueing. The pending flag clears when the worker dequeues, not when it
//! finishes, so a commit that races the worker's processing still lands.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{Error, Result};

/// One unit of work for the bridge worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Task {
	/// Query the engine's render-update flags; notify on a ready frame.
	Update,
	/// Drain the engine's pending events.
	Event,
}

enum Item {
	Task(Task),
	Stop,
}

struct Shared {
	stopped: AtomicBool,
	update_queued: AtomicBool,
	event_queued: AtomicBool,
}

impl Shared {
	fn queued(&self, task: Task) -> &AtomicBool {
		match task {
			Task::Update => &self.update_queued,
			Task::Event => &self.event_queued,
		}
	}
}

/// The commit half; cloned into each engine callback.
#[derive(Clone)]
pub(crate) struct TaskQueue {
	tx: crossbeam_channel::Sender<Item>,
	shared: Arc<Shared>,
}

impl TaskQueue {
	/// Enqueue a task. Safe from any thread.
	///
	/// Fails with [Error::Stopped] once [Self::stop] ran; the task is never
	/// silently dropped.
	pub fn commit(&self, task: Task) -> Result<()> {
		if self.shared.stopped.load(Ordering::Acquire) {
			return Err(Error::Stopped);
		}

		if self.shared.queued(task).swap(true, Ordering::AcqRel) {
			// Already queued and not yet dequeued.
			tracing::trace!(?task, "task coalesced");
			return Ok(());
		}

		self.tx.send(Item::Task(task)).map_err(|_| Error::Stopped)
	}

	/// Reject new commits and wake the worker for exit.
	///
	/// Tasks committed before the stop are still drained, in order; the
	/// sentinel sits behind them.
	pub fn stop(&self) {
		self.shared.stopped.store(true, Ordering::Release);
		let _ = self.tx.send(Item::Stop);
	}
}

/// The worker half.
pub(crate) struct TaskReceiver {
	rx: crossbeam_channel::Receiver<Item>,
	shared: Arc<Shared>,
}

impl TaskReceiver {
	/// Block until the next task; `None` once stopped.
	pub fn recv(&self) -> Option<Task> {
		match self.rx.recv() {
			Ok(Item::Task(task)) => {
				self.shared.queued(task).store(false, Ordering::Release);
				Some(task)
			}
			Ok(Item::Stop) | Err(_) => None,
		}
	}
}

pub(crate) fn channel() -> (TaskQueue, TaskReceiver) {
	let (tx, rx) = crossbeam_channel::unbounded();
	let shared = Arc::new(Shared {
		stopped: AtomicBool::new(false),
		update_queued: AtomicBool::new(false),
		event_queued: AtomicBool::new(false),
	});

	(
		TaskQueue {
			tx,
			shared: shared.clone(),
		},
		TaskReceiver { rx, shared },
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_fifo_order() {
		let (queue, tasks) = channel();

		queue.commit(Task::Update).unwrap();
		queue.commit(Task::Event).unwrap();
		queue.stop();

		assert_eq!(tasks.recv(), Some(Task::Update));
		assert_eq!(tasks.recv(), Some(Task::Event));
		assert_eq!(tasks.recv(), None);
	}

	#[test]
	fn test_redundant_tasks_coalesce() {
		let (queue, tasks) = channel();

		for _ in 0..5 {
			queue.commit(Task::Update).unwrap();
		}
		queue.commit(Task::Event).unwrap();
		queue.commit(Task::Event).unwrap();
		queue.stop();

		// One of each survives, in commit order.
		assert_eq!(tasks.recv(), Some(Task::Update));
		assert_eq!(tasks.recv(), Some(Task::Event));
		assert_eq!(tasks.recv(), None);
	}

	#[test]
	fn test_commit_lands_after_dequeue() {
		let (queue, tasks) = channel();

		queue.commit(Task::Update).unwrap();
		assert_eq!(tasks.recv(), Some(Task::Update));

		// The pending flag cleared on dequeue, so this is a fresh task.
		queue.commit(Task::Update).unwrap();
		assert_eq!(tasks.recv(), Some(Task::Update));
	}

	#[test]
	fn test_commit_after_stop_fails() {
		let (queue, tasks) = channel();
		queue.stop();

		assert!(matches!(queue.commit(Task::Update), Err(Error::Stopped)));
		assert!(matches!(queue.commit(Task::Event), Err(Error::Stopped)));
		assert_eq!(tasks.recv(), None);
	}

	#[test]
	fn test_tasks_before_stop_are_drained() {
		let (queue, tasks) = channel();

		queue.commit(Task::Event).unwrap();
		queue.stop();
		assert!(matches!(queue.commit(Task::Update), Err(Error::Stopped)));

		assert_eq!(tasks.recv(), Some(Task::Event));
		assert_eq!(tasks.recv(), None);
	}

	#[test]
	fn test_concurrent_commits() {
		let (queue, tasks) = channel();

		let committers: Vec<_> = (0..4)
			.map(|_| {
				let queue = queue.clone();
				std::thread::spawn(move || {
					for _ in 0..100 {
						queue.commit(Task::Update).unwrap();
						queue.commit(Task::Event).unwrap();
					}
				})
			})
			.collect();

		let drainer = std::thread::spawn(move || {
			let mut drained = 0;
			while tasks.recv().is_some() {
				drained += 1;
			}
			drained
		});

		for committer in committers {
			committer.join().unwrap();
		}
		queue.stop();

		// Coalescing may collapse commits, but nothing is lost outright:
		// every commit either enqueued or rode on a queued task.
		assert!(drainer.join().unwrap() >= 1);
	}
}
