// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Request and response payloads of the SSL certificate API (2019-12-05)

use serde::{Deserialize, Serialize};

use crate::types::{CertificateSummary, DeployRecord};

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeCertificatesRequest<'a> {
    pub limit: u64,
    pub search_key: &'a str,
    pub certificate_status: Vec<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeCertificatesResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub certificates: Option<Vec<CertificateSummary>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CertificateIdRequest<'a> {
    pub certificate_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeCertificateDetailResponse {
    #[serde(default)]
    pub certificate_public_key: Option<String>,
    #[serde(default)]
    pub certificate_private_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UploadCertificateRequest<'a> {
    pub certificate_public_key: &'a str,
    pub certificate_private_key: &'a str,
    pub alias: &'a str,
    pub repeatable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UploadCertificateResponse {
    pub certificate_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceTypeRegions<'a> {
    pub resource_type: &'a str,
    pub regions: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateCertificateInstanceRequest<'a> {
    pub old_certificate_id: &'a str,
    pub certificate_id: &'a str,
    pub certificate_public_key: &'a str,
    pub certificate_private_key: &'a str,
    pub resource_types: Vec<&'a str>,
    pub resource_types_regions: Vec<ResourceTypeRegions<'a>>,
    pub repeatable: bool,
    pub allow_download: bool,
    pub expiring_notification_switch: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateCertificateInstanceResponse {
    #[serde(default)]
    pub deploy_record_id: Option<i64>,
    #[serde(default)]
    pub deploy_status: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeHostUpdateRecordRequest<'a> {
    pub old_certificate_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeHostUpdateRecordResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub deploy_record_list: Option<Vec<DeployRecord>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteCertificateResponse {
    #[serde(default)]
    pub delete_result: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyCertificateAliasRequest<'a> {
    pub certificate_id: &'a str,
    pub alias: &'a str,
}

/// Responses whose payload carries nothing but the request id
#[derive(Debug, Deserialize)]
pub struct Empty {}
