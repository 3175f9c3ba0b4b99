// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Periodic fan-out of reconciliations over all watch targets.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, instrument, Instrument};

use crate::config::WatchTarget;
use crate::sync::target::{Reconcile, ReconcileOutcome};

/// Starts one reconciliation per watch target on every tick.
///
/// Cycles are detached tasks: a tick does not wait for earlier cycles, and
/// cancellation only stops new ticks.
pub struct Scheduler {
    interval: Duration,
    targets: Arc<Vec<WatchTarget>>,
    reconciler: Arc<dyn Reconcile>,
}

impl Scheduler {
    pub fn new(
        interval: Duration,
        targets: Vec<WatchTarget>,
        reconciler: Arc<dyn Reconcile>,
    ) -> Self {
        Self {
            interval,
            targets: Arc::new(targets),
            reconciler,
        }
    }

    #[instrument(skip_all)]
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            "Scheduler started, syncing {} target(s) every {}s",
            self.targets.len(),
            self.interval.as_secs()
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Scheduler stopped");
                    return;
                }
                _ = ticker.tick() => self.dispatch(),
            }
        }
    }

    fn dispatch(&self) {
        for index in 0..self.targets.len() {
            let targets = self.targets.clone();
            let reconciler = self.reconciler.clone();
            let span = info_span!("sync", secret = %self.targets[index].secret_ref());

            tokio::spawn(
                async move {
                    let target = &targets[index];
                    match reconciler.reconcile(target).await {
                        Ok(ReconcileOutcome::InSync { certificate_id }) => {
                            info!(
                                "Secret {} is in sync with certificate {}",
                                target.secret_ref(),
                                certificate_id
                            );
                        }
                        Ok(ReconcileOutcome::Updated {
                            certificate_id,
                            records,
                            failed_cleanups,
                        }) => {
                            info!(
                                "Secret {} pushed to certificate {} ({} deploy record(s), {} failed cleanup(s))",
                                target.secret_ref(),
                                certificate_id,
                                records,
                                failed_cleanups
                            );
                        }
                        Err(e) => {
                            error!("Failed to sync secret {}: {}", target.secret_ref(), e);
                        }
                    }
                }
                .instrument(span),
            );
        }
    }
}
