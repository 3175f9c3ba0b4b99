// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses and the certificate service.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use http::{Request, Response};
use kube::client::Body;
use kube::Client;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

use crate::certificate::{CertificateService, CertificateServiceFactory};
use crate::config::{ResourceBinding, WatchTarget};
use crate::error::TendoError;
use crate::types::{CertificateSummary, DeployRecord};

type Responses = HashMap<(String, String), (u16, String)>;

/// A mock HTTP service that returns predefined responses based on request paths
/// and remembers every request it served.
#[derive(Clone, Default)]
pub struct MockService {
    responses: Arc<Mutex<Responses>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// `(method, path)` of every request served so far
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests served with the given method
    pub fn count(&self, method: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let key = (req.method().to_string(), req.uri().path().to_string());
        self.requests.lock().unwrap().push(key.clone());

        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| (404, not_found_json("resource", &key.1)));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// API path of a namespaced secret
pub fn secret_path(namespace: &str, name: &str) -> String {
    format!("/api/v1/namespaces/{}/secrets/{}", namespace, name)
}

/// Create a mock secret JSON response; `data` values are raw and get base64-encoded
pub fn secret_json(namespace: &str, name: &str, data: &[(&str, &str)]) -> String {
    let data: serde_json::Map<String, serde_json::Value> = data
        .iter()
        .map(|(k, v)| (k.to_string(), STANDARD.encode(v).into()))
        .collect();

    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "test-uid"
        },
        "type": "Opaque",
        "data": data
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// In-memory certificate service recording every call as a short string,
/// e.g. `"delete cert-1"` or `"rename cert-2 svc-cert"`.
#[derive(Default)]
pub struct FakeCertificateService {
    certificates: Mutex<Vec<(CertificateSummary, (String, String))>>,
    upload_id: Mutex<Option<String>>,
    deploy_rounds: Mutex<VecDeque<Vec<DeployRecord>>>,
    failing: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCertificateService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A certificate already held by the service, with raw key material
    pub fn with_certificate(
        self,
        id: &str,
        alias: &str,
        public_key: &str,
        private_key: &str,
    ) -> Self {
        self.certificates.lock().unwrap().push((
            CertificateSummary {
                certificate_id: id.to_string(),
                alias: Some(alias.to_string()),
            },
            (public_key.to_string(), private_key.to_string()),
        ));
        self
    }

    /// Id handed out by the next upload
    pub fn with_upload_id(self, id: &str) -> Self {
        *self.upload_id.lock().unwrap() = Some(id.to_string());
        self
    }

    /// Successive answers of `deploy_records`; the last one repeats
    pub fn with_deploy_rounds(self, rounds: Vec<Vec<DeployRecord>>) -> Self {
        *self.deploy_rounds.lock().unwrap() = rounds.into();
        self
    }

    /// Make every call whose recorded form equals `call` fail
    pub fn failing(self, call: &str) -> Self {
        self.failing.lock().unwrap().push(call.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) -> crate::error::Result<()> {
        self.calls.lock().unwrap().push(call.clone());
        if self.failing.lock().unwrap().contains(&call) {
            return Err(TendoError::Api {
                action: call,
                code: "FailedOperation".to_string(),
                message: "injected failure".to_string(),
                request_id: "test".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CertificateService for FakeCertificateService {
    async fn find_certificates(
        &self,
        name: &str,
    ) -> crate::error::Result<Vec<CertificateSummary>> {
        self.record(format!("find {}", name))?;
        Ok(self
            .certificates
            .lock()
            .unwrap()
            .iter()
            .filter(|(summary, _)| summary.alias.as_deref() == Some(name))
            .map(|(summary, _)| summary.clone())
            .collect())
    }

    async fn certificate_keys(
        &self,
        certificate_id: &str,
    ) -> crate::error::Result<(String, String)> {
        self.record(format!("keys {}", certificate_id))?;
        self.certificates
            .lock()
            .unwrap()
            .iter()
            .find(|(summary, _)| summary.certificate_id == certificate_id)
            .map(|(_, keys)| keys.clone())
            .ok_or_else(|| TendoError::Api {
                action: "DescribeCertificateDetail".to_string(),
                code: "FailedOperation.CertificateNotFound".to_string(),
                message: format!("no certificate {}", certificate_id),
                request_id: "test".to_string(),
            })
    }

    async fn upload_certificate(
        &self,
        name: &str,
        public_key: &str,
        private_key: &str,
    ) -> crate::error::Result<String> {
        self.record(format!("upload {}", name))?;
        let id = self
            .upload_id
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| "cert-new".to_string());

        self.certificates.lock().unwrap().push((
            CertificateSummary {
                certificate_id: id.clone(),
                alias: Some(name.to_string()),
            },
            (public_key.to_string(), private_key.to_string()),
        ));
        Ok(id)
    }

    async fn update_certificate(
        &self,
        certificate_id: &str,
        _public_key: &str,
        _private_key: &str,
        bindings: &[ResourceBinding],
    ) -> crate::error::Result<()> {
        let targets: Vec<String> = bindings
            .iter()
            .map(|b| format!("{}[{}]", b.name, b.regions.join(",")))
            .collect();
        self.record(format!("update {} {}", certificate_id, targets.join(" ")))
    }

    async fn deploy_records(
        &self,
        old_certificate_id: &str,
    ) -> crate::error::Result<Vec<DeployRecord>> {
        self.record(format!("records {}", old_certificate_id))?;
        let mut rounds = self.deploy_rounds.lock().unwrap();
        let records = if rounds.len() > 1 {
            rounds.pop_front().unwrap_or_default()
        } else {
            rounds.front().cloned().unwrap_or_default()
        };
        Ok(records)
    }

    async fn delete_certificate(&self, certificate_id: &str) -> crate::error::Result<()> {
        self.record(format!("delete {}", certificate_id))
    }

    async fn rename_certificate(
        &self,
        certificate_id: &str,
        name: &str,
    ) -> crate::error::Result<()> {
        self.record(format!("rename {} {}", certificate_id, name))
    }
}

/// Hands out the same fake service for every region and remembers the regions
pub struct FakeCertificateFactory {
    pub service: Arc<FakeCertificateService>,
    pub regions: Mutex<Vec<String>>,
}

impl FakeCertificateFactory {
    pub fn new(service: Arc<FakeCertificateService>) -> Self {
        Self {
            service,
            regions: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CertificateServiceFactory for FakeCertificateFactory {
    async fn connect(&self, region: &str) -> crate::error::Result<Arc<dyn CertificateService>> {
        self.regions.lock().unwrap().push(region.to_string());
        let service: Arc<dyn CertificateService> = self.service.clone();
        Ok(service)
    }
}

/// A deploy record of a swap from `old_id` to `new_id`
pub fn deploy_record(id: i64, new_id: &str, old_id: &str, status: i64) -> DeployRecord {
    DeployRecord {
        id,
        cert_id: new_id.to_string(),
        old_cert_id: old_id.to_string(),
        resource_types: vec!["cdn".to_string()],
        status,
        create_time: None,
        update_time: None,
    }
}

/// A watch target for `default/tls-secret` and certificate `svc-cert`
pub fn watch_target(certificate_id: Option<&str>) -> WatchTarget {
    WatchTarget {
        secret_name: "tls-secret".to_string(),
        secret_namespace: "default".to_string(),
        opaque_secret_name: "tls-secret-id".to_string(),
        certificate_id: certificate_id.map(str::to_string),
        certificate_name: "svc-cert".to_string(),
        certificate_region: "ap-singapore".to_string(),
        certificate_resource_types: vec![ResourceBinding {
            name: "cdn".to_string(),
            regions: vec!["ap-singapore".to_string()],
        }],
    }
}
