// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Tencent Cloud SSL certificate API client

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

use crate::certificate::CertificateService;
use crate::config::ResourceBinding;
use crate::constants::ssl;
use crate::error::{Result, TendoError};
use crate::tencent::credentials::Credential;
use crate::tencent::models::*;
use crate::tencent::signer::{self, CONTENT_TYPE};
use crate::types::{CertificateSummary, DeployRecord};

/// Signed JSON client for the SSL API of one region
#[derive(Clone, Debug)]
pub struct SslClient {
    http: reqwest::Client,
    endpoint: String,
    host: String,
    region: String,
    credential: Credential,
}

impl SslClient {
    pub fn new(http: reqwest::Client, credential: Credential, region: &str) -> Self {
        Self {
            http,
            endpoint: ssl::ENDPOINT.to_string(),
            host: ssl::HOST.to_string(),
            region: region.to_string(),
            credential,
        }
    }

    /// Point the client at another endpoint, such as a local mock server
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        let url = url::Url::parse(endpoint)
            .map_err(|e| TendoError::Config(format!("invalid endpoint {}: {}", endpoint, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| TendoError::Config(format!("endpoint {} has no host", endpoint)))?;

        self.host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        self.endpoint = url.to_string();
        Ok(self)
    }

    async fn call<Req, Resp>(&self, action: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let payload = serde_json::to_string(request).map_err(|e| {
            TendoError::InvalidResponse(format!("unable to encode {} request: {}", action, e))
        })?;
        let now = Utc::now();
        let authorization = signer::authorization(
            &self.credential,
            ssl::SERVICE,
            &self.host,
            action,
            &payload,
            now,
        )?;

        let mut builder = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .header("X-TC-Action", action)
            .header("X-TC-Version", ssl::VERSION)
            .header("X-TC-Region", &self.region)
            .header("X-TC-Timestamp", now.timestamp().to_string());

        if let Some(token) = &self.credential.token {
            builder = builder.header("X-TC-Token", token);
        }

        debug!("Calling {} in region {}", action, self.region);
        let response = builder.body(payload).send().await?;
        let status = response.status();
        let body = response.text().await?;

        parse_response(action, status, &body)
    }
}

/// Unwrap the `{"Response": {...}}` envelope of an API 3.0 reply
pub(crate) fn parse_response<T: DeserializeOwned>(
    action: &str,
    status: StatusCode,
    body: &str,
) -> Result<T> {
    let api_error = |code: String, message: String, request_id: String| TendoError::Api {
        action: action.to_string(),
        code,
        message,
        request_id,
    };

    let envelope: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => {
            return Err(api_error(
                format!("HTTP{}", status.as_u16()),
                body.to_string(),
                String::new(),
            ))
        }
        Err(e) => {
            return Err(TendoError::InvalidResponse(format!(
                "{} returned malformed JSON: {}",
                action, e
            )))
        }
    };

    let Some(response) = envelope.get("Response") else {
        return Err(TendoError::InvalidResponse(format!(
            "{} response has no Response member",
            action
        )));
    };

    let request_id = response
        .get("RequestId")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    if let Some(error) = response.get("Error") {
        let field = |name: &str| {
            error
                .get(name)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        return Err(api_error(field("Code"), field("Message"), request_id));
    }

    if !status.is_success() {
        return Err(api_error(
            format!("HTTP{}", status.as_u16()),
            body.to_string(),
            request_id,
        ));
    }

    T::deserialize(response).map_err(|e| {
        TendoError::InvalidResponse(format!("unable to parse {} response: {}", action, e))
    })
}

#[async_trait]
impl CertificateService for SslClient {
    #[instrument(skip(self))]
    async fn find_certificates(&self, name: &str) -> Result<Vec<CertificateSummary>> {
        let request = DescribeCertificatesRequest {
            limit: 1,
            search_key: name,
            certificate_status: vec![ssl::STATUS_ISSUED],
        };

        let response: DescribeCertificatesResponse =
            self.call("DescribeCertificates", &request).await?;

        if response.total_count == 0 {
            return Ok(Vec::new());
        }
        Ok(response.certificates.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn certificate_keys(&self, certificate_id: &str) -> Result<(String, String)> {
        let response: DescribeCertificateDetailResponse = self
            .call(
                "DescribeCertificateDetail",
                &CertificateIdRequest { certificate_id },
            )
            .await?;

        Ok((
            response.certificate_public_key.unwrap_or_default(),
            response.certificate_private_key.unwrap_or_default(),
        ))
    }

    #[instrument(skip(self, public_key, private_key))]
    async fn upload_certificate(
        &self,
        name: &str,
        public_key: &str,
        private_key: &str,
    ) -> Result<String> {
        let request = UploadCertificateRequest {
            certificate_public_key: public_key,
            certificate_private_key: private_key,
            alias: name,
            repeatable: true,
        };

        let response: UploadCertificateResponse =
            self.call("UploadCertificate", &request).await?;
        Ok(response.certificate_id)
    }

    #[instrument(skip(self, public_key, private_key, bindings))]
    async fn update_certificate(
        &self,
        certificate_id: &str,
        public_key: &str,
        private_key: &str,
        bindings: &[ResourceBinding],
    ) -> Result<()> {
        let request = UpdateCertificateInstanceRequest {
            old_certificate_id: certificate_id,
            certificate_id,
            certificate_public_key: public_key,
            certificate_private_key: private_key,
            resource_types: bindings.iter().map(|b| b.name.as_str()).collect(),
            resource_types_regions: bindings
                .iter()
                .map(|b| ResourceTypeRegions {
                    resource_type: &b.name,
                    regions: &b.regions,
                })
                .collect(),
            repeatable: true,
            allow_download: true,
            expiring_notification_switch: 0,
        };

        let response: UpdateCertificateInstanceResponse =
            self.call("UpdateCertificateInstance", &request).await?;
        debug!(
            "Update of certificate {} accepted, deploy record {:?} status {:?}",
            certificate_id, response.deploy_record_id, response.deploy_status
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn deploy_records(&self, old_certificate_id: &str) -> Result<Vec<DeployRecord>> {
        let response: DescribeHostUpdateRecordResponse = self
            .call(
                "DescribeHostUpdateRecord",
                &DescribeHostUpdateRecordRequest { old_certificate_id },
            )
            .await?;

        if response.total_count == 0 {
            return Ok(Vec::new());
        }
        Ok(response.deploy_record_list.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn delete_certificate(&self, certificate_id: &str) -> Result<()> {
        let response: DeleteCertificateResponse = self
            .call("DeleteCertificate", &CertificateIdRequest { certificate_id })
            .await?;

        match response.delete_result {
            Some(false) => Err(TendoError::InvalidResponse(format!(
                "certificate {} was not deleted",
                certificate_id
            ))),
            _ => Ok(()),
        }
    }

    #[instrument(skip(self))]
    async fn rename_certificate(&self, certificate_id: &str, name: &str) -> Result<()> {
        let _: Empty = self
            .call(
                "ModifyCertificateAlias",
                &ModifyCertificateAliasRequest {
                    certificate_id,
                    alias: name,
                },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, header_exists, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> SslClient {
        SslClient::new(
            reqwest::Client::new(),
            Credential::new("AKID", "KEY").with_token("TOKEN"),
            "ap-singapore",
        )
        .with_endpoint(&server.uri())
        .unwrap()
    }

    fn ok(response: serde_json::Value) -> ResponseTemplate {
        let mut response = response;
        response["RequestId"] = json!("req-1");
        ResponseTemplate::new(200).set_body_json(json!({ "Response": response }))
    }

    #[tokio::test]
    async fn test_request_is_signed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-TC-Action", "DescribeCertificates"))
            .and(header("X-TC-Version", "2019-12-05"))
            .and(header("X-TC-Region", "ap-singapore"))
            .and(header("X-TC-Token", "TOKEN"))
            .and(header("Content-Type", CONTENT_TYPE))
            .and(header_exists("X-TC-Timestamp"))
            .and(header_exists("Authorization"))
            .and(body_partial_json(json!({
                "Limit": 1,
                "SearchKey": "svc-cert",
                "CertificateStatus": [1]
            })))
            .respond_with(ok(json!({
                "TotalCount": 1,
                "Certificates": [{"CertificateId": "cert-1", "Alias": "svc-cert"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let certificates = client(&server)
            .await
            .find_certificates("svc-cert")
            .await
            .unwrap();

        assert_eq!(
            certificates,
            vec![CertificateSummary {
                certificate_id: "cert-1".to_string(),
                alias: Some("svc-cert".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_find_certificates_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ok(json!({"TotalCount": 0, "Certificates": []})))
            .mount(&server)
            .await;

        let certificates = client(&server)
            .await
            .find_certificates("svc-cert")
            .await
            .unwrap();
        assert!(certificates.is_empty());
    }

    #[tokio::test]
    async fn test_api_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ok(json!({
                "Error": {
                    "Code": "AuthFailure.SignatureFailure",
                    "Message": "signature mismatch"
                }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .certificate_keys("cert-1")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TendoError::Api { action, code, request_id, .. }
                if action == "DescribeCertificateDetail"
                    && code == "AuthFailure.SignatureFailure"
                    && request_id == "req-1"
        ));
    }

    #[tokio::test]
    async fn test_http_error_without_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .delete_certificate("cert-1")
            .await
            .unwrap_err();

        assert!(matches!(err, TendoError::Api { code, .. } if code == "HTTP502"));
    }

    #[tokio::test]
    async fn test_certificate_keys() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-TC-Action", "DescribeCertificateDetail"))
            .and(body_partial_json(json!({"CertificateId": "cert-1"})))
            .respond_with(ok(json!({
                "CertificateId": "cert-1",
                "CertificatePublicKey": "PUBLIC",
                "CertificatePrivateKey": null
            })))
            .mount(&server)
            .await;

        let keys = client(&server)
            .await
            .certificate_keys("cert-1")
            .await
            .unwrap();
        assert_eq!(keys, ("PUBLIC".to_string(), String::new()));
    }

    #[tokio::test]
    async fn test_upload_certificate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-TC-Action", "UploadCertificate"))
            .and(body_partial_json(json!({
                "CertificatePublicKey": "PUBLIC",
                "CertificatePrivateKey": "PRIVATE",
                "Alias": "svc-cert",
                "Repeatable": true
            })))
            .respond_with(ok(json!({"CertificateId": "cert-1"})))
            .mount(&server)
            .await;

        let id = client(&server)
            .await
            .upload_certificate("svc-cert", "PUBLIC", "PRIVATE")
            .await
            .unwrap();
        assert_eq!(id, "cert-1");
    }

    #[tokio::test]
    async fn test_update_certificate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-TC-Action", "UpdateCertificateInstance"))
            .and(body_partial_json(json!({
                "OldCertificateId": "cert-1",
                "CertificateId": "cert-1",
                "ResourceTypes": ["cdn"],
                "ResourceTypesRegions": [{"ResourceType": "cdn", "Regions": ["ap-singapore"]}]
            })))
            .respond_with(ok(json!({"DeployRecordId": 7, "DeployStatus": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let bindings = vec![ResourceBinding {
            name: "cdn".to_string(),
            regions: vec!["ap-singapore".to_string()],
        }];

        client(&server)
            .await
            .update_certificate("cert-1", "PUBLIC", "PRIVATE", &bindings)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_deploy_records() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-TC-Action", "DescribeHostUpdateRecord"))
            .and(body_partial_json(json!({"OldCertificateId": "cert-1"})))
            .respond_with(ok(json!({
                "TotalCount": 1,
                "DeployRecordList": [{
                    "Id": 1,
                    "CertId": "cert-2",
                    "OldCertId": "cert-1",
                    "ResourceTypes": ["cdn"],
                    "Status": 0,
                    "CreateTime": "2024-01-01 00:00:00",
                    "UpdateTime": "2024-01-01 00:00:00"
                }]
            })))
            .mount(&server)
            .await;

        let records = client(&server)
            .await
            .deploy_records("cert-1")
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cert_id, "cert-2");
        assert_eq!(records[0].status, 0);
    }

    #[tokio::test]
    async fn test_delete_result_false_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-TC-Action", "DeleteCertificate"))
            .respond_with(ok(json!({"DeleteResult": false})))
            .mount(&server)
            .await;

        assert!(client(&server)
            .await
            .delete_certificate("cert-1")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_rename_certificate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-TC-Action", "ModifyCertificateAlias"))
            .and(body_partial_json(json!({"CertificateId": "cert-2", "Alias": "svc-cert"})))
            .respond_with(ok(json!({"CertificateId": "cert-2"})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .await
            .rename_certificate("cert-2", "svc-cert")
            .await
            .unwrap();
    }

    #[test]
    fn test_parse_response_malformed() {
        let err = parse_response::<Empty>("DeleteCertificate", StatusCode::OK, "not json")
            .unwrap_err();
        assert!(matches!(err, TendoError::InvalidResponse(_)));

        let err = parse_response::<Empty>("DeleteCertificate", StatusCode::OK, "{}").unwrap_err();
        assert!(matches!(err, TendoError::InvalidResponse(msg) if msg.contains("no Response")));
    }

    #[test]
    fn test_with_endpoint_sets_host_with_port() {
        let client = SslClient::new(reqwest::Client::new(), Credential::new("a", "b"), "ap-sg")
            .with_endpoint("http://127.0.0.1:8080")
            .unwrap();
        assert_eq!(client.host, "127.0.0.1:8080");
    }
}
