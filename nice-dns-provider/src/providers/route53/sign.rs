//! AWS Signature Version 4
//!
//! Reference: <https://docs.aws.amazon.com/IAM/latest/UserGuide/reference_sigv-create-signed-request.html>

use std::fmt::Write;

use crate::providers::common::{hmac_sha256, sha256_hex};
use crate::utils::log_sanitizer::truncate_for_log;

use super::{ROUTE53_SERVICE, Route53Api};

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Inputs that identify the signer.
pub(crate) struct SigningKey<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub region: &'a str,
    pub service: &'a str,
}

/// Build the canonical query string: parameters sorted by name, names and
/// values percent-encoded with the RFC 3986 unreserved set.
pub(crate) fn canonical_query(params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| {
            (
                urlencoding::encode(k).into_owned(),
                urlencoding::encode(v).into_owned(),
            )
        })
        .collect();
    encoded.sort();
    encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Derive the per-day signing key.
pub(crate) fn derive_signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

/// Compute the `Authorization` header value.
///
/// `query` must already be canonical (see [`canonical_query`]); `amz_date` is
/// the `X-Amz-Date` value (`YYYYMMDDTHHMMSSZ`) and must also appear in
/// `headers`.
pub(crate) fn authorization(
    key: &SigningKey<'_>,
    method: &str,
    path: &str,
    query: &str,
    headers: &[(String, String)],
    payload: &str,
    amz_date: &str,
) -> String {
    // 1. Canonical headers, sorted by lowercase name
    let mut sorted_headers: Vec<(String, String)> = headers
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.trim().to_string()))
        .collect();
    sorted_headers.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_headers = sorted_headers
        .iter()
        .fold(String::new(), |mut acc, (k, v)| {
            let _ = writeln!(acc, "{k}:{v}");
            acc
        });
    let signed_headers = sorted_headers
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";");

    // 2. Canonical request
    let canonical_uri = if path.is_empty() { "/" } else { path };
    let hashed_payload = sha256_hex(payload.as_bytes());
    let canonical_request = format!(
        "{method}\n{canonical_uri}\n{query}\n{canonical_headers}\n{signed_headers}\n{hashed_payload}"
    );
    log::debug!("CanonicalRequest:\n{}", truncate_for_log(&canonical_request));

    // 3. String to sign
    let date = amz_date.get(..8).unwrap_or(amz_date);
    let scope = format!("{date}/{}/{}/aws4_request", key.region, key.service);
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    );
    log::debug!("StringToSign:\n{string_to_sign}");

    // 4. Signature
    let signing_key = derive_signing_key(key.secret_access_key, date, key.region, key.service);
    let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));

    format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
        key.access_key_id
    )
}

impl Route53Api {
    /// Sign a request against this client's credentials and region.
    pub(crate) fn sign(
        &self,
        method: &str,
        path: &str,
        query: &str,
        headers: &[(String, String)],
        payload: &str,
        amz_date: &str,
    ) -> String {
        let key = SigningKey {
            access_key_id: &self.access_key_id,
            secret_access_key: &self.secret_access_key,
            region: &self.region,
            service: ROUTE53_SERVICE,
        };
        authorization(&key, method, path, query, headers, payload, amz_date)
    }
}
