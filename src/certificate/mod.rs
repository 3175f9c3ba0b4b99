// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cloud certificate lifecycle: lookup, upload, update and deploy tracking.

pub mod lifecycle;
pub mod poller;
pub mod service;

pub use lifecycle::CertificateManager;
pub use poller::{all_converged, DeploymentPoller};
pub use service::{CertificateService, CertificateServiceFactory, TencentCertificateServiceFactory};
