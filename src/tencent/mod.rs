// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Tencent Cloud API access: request signing, credentials and the SSL client.

pub mod client;
pub mod credentials;
pub mod models;
pub mod signer;

pub use client::SslClient;
pub use credentials::{resolve_credentials, Credential};
