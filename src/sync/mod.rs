// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Periodic reconciliation of watch targets.

pub mod scheduler;
pub mod target;

pub use scheduler::Scheduler;
pub use target::{Reconcile, ReconcileOutcome, TargetReconciler};
