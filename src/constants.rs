// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes secret keys used by Tendo
pub mod secret_keys {
    /// TLS secret key holding the certificate chain
    pub const PUBLIC_KEY: &str = "tls.crt";
    /// TLS secret key holding the private key
    pub const PRIVATE_KEY: &str = "tls.key";
    /// Opaque secret key receiving the Tencent Cloud certificate id
    pub const CERTIFICATE_ID: &str = "qcloud_cert_id";
}

/// The operator name, used as the default application name
pub const OPERATOR_NAME: &str = "Tendo";

/// Tencent Cloud SSL certificate API
pub mod ssl {
    pub const ENDPOINT: &str = "https://ssl.tencentcloudapi.com";
    pub const HOST: &str = "ssl.tencentcloudapi.com";
    pub const SERVICE: &str = "ssl";
    pub const VERSION: &str = "2019-12-05";
    /// `CertificateStatus` filter value for issued certificates
    pub const STATUS_ISSUED: u64 = 1;
    /// Deploy record status reported once a resource picked up the new certificate
    pub const DEPLOY_SUCCESS: i64 = 1;
}

/// Tencent Cloud STS API, used for TKE OIDC role credentials
pub mod sts {
    pub const ENDPOINT: &str = "https://sts.tencentcloudapi.com";
    pub const VERSION: &str = "2018-08-13";
    pub const SESSION_NAME: &str = "tendo";
    pub const DURATION_SECS: u64 = 7200;
}

/// CVM metadata service exposing instance role credentials
pub const CVM_METADATA_ENDPOINT: &str =
    "http://metadata.tencentyun.com/latest/meta-data/cam/security-credentials/";

/// Deployment polling defaults
pub mod deployment {
    /// Delay between two deploy status queries
    pub const POLL_INTERVAL_SECS: u64 = 5;
    /// Delay between the update request and the first status query
    pub const SETTLE_DELAY_SECS: u64 = 5;
}
