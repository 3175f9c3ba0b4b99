// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Certificate material and deploy status types shared across modules.

pub mod certificate;

pub use certificate::{CertificateSummary, DeployRecord, SecretMaterial};
