//! Background polling watchers feeding alert views.
//!
//! Views tolerate 30 seconds of staleness, so watchers poll on the configured interval
//! and publish each successful snapshot into a `watch` channel. A failed round keeps the
//! last good snapshot; an expired session stops the watcher for good. Start times are
//! jittered so many freshly mounted views do not fire in lockstep.

// crates.io
use rand::Rng;
use tokio::{sync::watch, task::JoinHandle, time};
// self
use crate::{
	_prelude::*,
	alerts::{Alert, AlertFilter, AlertStatistics, StatisticsFilter},
	client::Client,
	http::ApiTransport,
	obs::{self, OpKind, OpOutcome},
	resources::Page,
};

/// Handle to a background polling task; dropping it stops the polling.
#[derive(Debug)]
pub struct PollWatch<S> {
	receiver: watch::Receiver<Option<S>>,
	handle: JoinHandle<()>,
}
impl<S> PollWatch<S> {
	/// Returns a receiver observing each published snapshot.
	pub fn receiver(&self) -> watch::Receiver<Option<S>> {
		self.receiver.clone()
	}

	/// Returns a copy of the most recent snapshot, if one has arrived yet.
	pub fn latest(&self) -> Option<S>
	where
		S: Clone,
	{
		self.receiver.borrow().clone()
	}
}
impl<S> Drop for PollWatch<S> {
	fn drop(&mut self) {
		self.handle.abort();
	}
}

impl<T> Client<T>
where
	T: ?Sized + ApiTransport,
{
	/// Spawns a watcher polling the alert listing for the given filter.
	///
	/// Must be called from within a Tokio runtime context.
	pub fn watch_alerts(&self, filter: AlertFilter) -> PollWatch<Page<Alert>> {
		let (sender, receiver) = watch::channel(None);
		let client = self.clone();
		let interval = self.config.poll_interval;
		let handle = tokio::spawn(async move {
			time::sleep(poll_start_jitter(interval)).await;

			loop {
				obs::record_op_outcome(OpKind::Poll, OpOutcome::Attempt);

				match client.list_alerts(&filter).await {
					Ok(page) => {
						obs::record_op_outcome(OpKind::Poll, OpOutcome::Success);

						if sender.send(Some(page)).is_err() {
							break;
						}
					},
					Err(Error::SessionExpired) => {
						obs::record_op_outcome(OpKind::Poll, OpOutcome::Failure);

						break;
					},
					Err(_) => {
						obs::record_op_outcome(OpKind::Poll, OpOutcome::Failure);
					},
				}

				time::sleep(interval).await;
			}
		});

		PollWatch { receiver, handle }
	}

	/// Spawns a watcher polling the aggregated alert statistics for the given scope.
	///
	/// Must be called from within a Tokio runtime context.
	pub fn watch_alert_statistics(&self, filter: StatisticsFilter) -> PollWatch<AlertStatistics> {
		let (sender, receiver) = watch::channel(None);
		let client = self.clone();
		let interval = self.config.poll_interval;
		let handle = tokio::spawn(async move {
			time::sleep(poll_start_jitter(interval)).await;

			loop {
				obs::record_op_outcome(OpKind::Poll, OpOutcome::Attempt);

				match client.alert_statistics(&filter).await {
					Ok(stats) => {
						obs::record_op_outcome(OpKind::Poll, OpOutcome::Success);

						if sender.send(Some(stats)).is_err() {
							break;
						}
					},
					Err(Error::SessionExpired) => {
						obs::record_op_outcome(OpKind::Poll, OpOutcome::Failure);

						break;
					},
					Err(_) => {
						obs::record_op_outcome(OpKind::Poll, OpOutcome::Failure);
					},
				}

				time::sleep(interval).await;
			}
		});

		PollWatch { receiver, handle }
	}
}

/// Spreads watcher start times across up to a tenth of the interval.
fn poll_start_jitter(interval: StdDuration) -> StdDuration {
	let cap = (interval / 10).as_millis().max(1) as u64;

	StdDuration::from_millis(rand::rng().random_range(0..cap))
}
