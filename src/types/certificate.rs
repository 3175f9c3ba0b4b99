// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TendoError};

/// Certificate key pair, both halves base64-encoded.
///
/// Local secrets and remote certificate details are normalised to this
/// encoding before they are compared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SecretMaterial {
    pub public_key: String,
    pub private_key: String,
}

impl SecretMaterial {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    /// Encode raw PEM material.
    pub fn from_raw(public_key: &[u8], private_key: &[u8]) -> Self {
        Self {
            public_key: STANDARD.encode(public_key),
            private_key: STANDARD.encode(private_key),
        }
    }

    /// Decode both halves back into the PEM strings the cloud API expects.
    pub fn decode(&self) -> Result<(String, String)> {
        let public_key = decode_pem(&self.public_key, "public")?;
        let private_key = decode_pem(&self.private_key, "private")?;
        Ok((public_key, private_key))
    }
}

fn decode_pem(encoded: &str, which: &str) -> Result<String> {
    let bytes = STANDARD.decode(encoded).map_err(|e| {
        TendoError::Decode(format!("unable to decode {} key for certificate: {}", which, e))
    })?;

    String::from_utf8(bytes).map_err(|e| {
        TendoError::Decode(format!("{} key for certificate is not valid UTF-8: {}", which, e))
    })
}

/// Entry of a `DescribeCertificates` listing
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CertificateSummary {
    pub certificate_id: String,
    #[serde(default)]
    pub alias: Option<String>,
}

/// One resource attachment tracked by a certificate redeploy
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct DeployRecord {
    pub id: i64,
    pub cert_id: String,
    pub old_cert_id: String,
    #[serde(default)]
    pub resource_types: Vec<String>,
    pub status: i64,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}
