// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reading TLS material from, and recording certificate ids into, cluster secrets

use crate::constants::secret_keys;
use crate::error::{Result, TendoError};
use crate::types::SecretMaterial;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{ObjectMeta, PostParams},
    Api, Client,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Cluster secret operations needed by the reconciliation loop
#[async_trait]
pub trait SecretGateway: Send + Sync {
    /// Read the TLS key pair of a secret, base64-encoded
    async fn get_secret_material(&self, namespace: &str, name: &str) -> Result<SecretMaterial>;

    /// Create an opaque secret holding `payload`, unless a secret with that name exists
    async fn ensure_opaque_secret(
        &self,
        namespace: &str,
        name: &str,
        payload: BTreeMap<String, String>,
    ) -> Result<()>;
}

/// `SecretGateway` backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeSecretGateway {
    client: Client,
}

impl KubeSecretGateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretGateway for KubeSecretGateway {
    #[instrument(skip(self))]
    async fn get_secret_material(&self, namespace: &str, name: &str) -> Result<SecretMaterial> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);

        let secret = match secrets.get(name).await {
            Ok(secret) => secret,
            Err(kube::Error::Api(err)) if err.code == 404 => {
                return Err(TendoError::SecretNotFound {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let data = secret.data.unwrap_or_default();
        let value = |key: &str| {
            data.get(key).map(|v| v.0.as_slice()).ok_or_else(|| TendoError::MissingSecretKey {
                namespace: namespace.to_string(),
                name: name.to_string(),
                key: key.to_string(),
            })
        };

        let material = SecretMaterial::from_raw(
            value(secret_keys::PUBLIC_KEY)?,
            value(secret_keys::PRIVATE_KEY)?,
        );

        debug!("Read TLS material from secret {}/{}", namespace, name);
        Ok(material)
    }

    #[instrument(skip(self, payload))]
    async fn ensure_opaque_secret(
        &self,
        namespace: &str,
        name: &str,
        payload: BTreeMap<String, String>,
    ) -> Result<()> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);

        match secrets.get(name).await {
            Ok(_) => {
                debug!("Secret {}/{} already exists", namespace, name);
                Ok(())
            }
            Err(kube::Error::Api(err)) if err.code == 404 => {
                info!("Secret {}/{} not found, creating a new one", namespace, name);
                let secret = Secret {
                    metadata: ObjectMeta {
                        name: Some(name.to_string()),
                        namespace: Some(namespace.to_string()),
                        ..Default::default()
                    },
                    type_: Some("Opaque".to_string()),
                    string_data: Some(payload),
                    ..Default::default()
                };
                secrets.create(&PostParams::default(), &secret).await?;
                info!("Secret {}/{} created successfully", namespace, name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
