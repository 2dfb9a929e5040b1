//! Route 53 HTTP 请求方法

use chrono::Utc;
use reqwest::Method;
use serde_json::Value;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::normalizer::one_or_many;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::truncate_for_log;

use super::sign::canonical_query;
use super::{Route53Api, xml};

const XML_CONTENT_TYPE: &str = "text/xml";

impl Route53Api {
    // ==================== 辅助方法 ====================

    /// Decode a response body, mapping error documents to [`crate::DnsError`].
    ///
    /// Route 53 sends two error shapes: `<ErrorResponse><Error>` with
    /// `Type`/`Code`/`Message`, and `<InvalidChangeBatch>` with a list of
    /// `Messages` for rejected batches.
    fn handle_response(&self, status: u16, response_text: &str, ctx: ErrorContext) -> Result<Value> {
        let decoded = xml::decode(response_text);

        if (200..300).contains(&status) {
            return decoded.map(|(_, doc)| doc).map_err(|e| {
                log::error!("[{}] XML parse failed: {e}", self.provider_name());
                log::error!(
                    "[{}] Raw response: {}",
                    self.provider_name(),
                    truncate_for_log(response_text)
                );
                self.parse_error(e)
            });
        }

        let text = |doc: &Value, key: &str| {
            doc.get(key)
                .and_then(Value::as_str)
                .map(ToString::to_string)
        };

        match decoded {
            Ok((root, doc)) if root == "ErrorResponse" => {
                let error = doc.get("Error").unwrap_or(&doc);
                let raw = RawApiError::with_code(
                    status,
                    text(error, "Code").unwrap_or_default(),
                    text(error, "Message").unwrap_or_default(),
                )
                .with_type(text(error, "Type"));
                Err(self.map_error(raw, ctx))
            }
            Ok((root, doc)) if root == "InvalidChangeBatch" => {
                let messages: Vec<&str> =
                    one_or_many(doc.get("Messages").and_then(|m| m.get("Message")))
                        .into_iter()
                        .filter_map(Value::as_str)
                        .collect();
                let message = if messages.is_empty() {
                    text(&doc, "Message").unwrap_or_default()
                } else {
                    messages.join("; ")
                };
                let raw = RawApiError::with_code(status, "InvalidChangeBatch", message)
                    .with_type(Some("Sender".to_string()));
                Err(self.map_error(raw, ctx))
            }
            // 回退到通用错误
            _ => Err(self.unknown_error(RawApiError::new(
                status,
                format!("HTTP {status}: {}", truncate_for_log(response_text)),
            ))),
        }
    }

    /// Sign and send one request. A fresh timestamp is used on every call.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &str,
        payload: &str,
    ) -> Result<(u16, String)> {
        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

        let mut headers = vec![
            ("Host".to_string(), self.host.clone()),
            ("X-Amz-Date".to_string(), amz_date.clone()),
        ];
        if let Some(token) = &self.session_token {
            headers.push(("X-Amz-Security-Token".to_string(), token.clone()));
        }
        if !payload.is_empty() {
            headers.push(("Content-Type".to_string(), XML_CONTENT_TYPE.to_string()));
        }

        let authorization = self.sign(method.as_str(), path, query, &headers, payload, &amz_date);

        let url = if query.is_empty() {
            format!("{}{path}", self.endpoint)
        } else {
            format!("{}{path}?{query}", self.endpoint)
        };

        let mut request = self.client.request(method.clone(), &url);
        for (name, value) in &headers {
            request = request.header(name, value);
        }
        request = request.header("Authorization", authorization);
        if !payload.is_empty() {
            log::debug!("Request Body: {}", truncate_for_log(payload));
            request = request.body(payload.to_string());
        }

        HttpUtils::execute_request(request, self.provider_name(), method.as_str(), &url).await
    }

    // ==================== 公开 API 方法 ====================

    /// 执行 GET 请求（幂等，按 `max_retries` 重试）
    pub(crate) async fn get(
        &self,
        path: &str,
        params: &[(&str, &str)],
        ctx: ErrorContext,
    ) -> Result<Value> {
        let query = canonical_query(params);
        let (query, ctx) = (query.as_str(), &ctx);
        HttpUtils::with_retry(self.provider_name(), self.max_retries, move || {
            let ctx = ctx.clone();
            async move {
                let (status, response_text) = self.send(Method::GET, path, query, "").await?;
                self.handle_response(status, &response_text, ctx)
            }
        })
        .await
    }

    /// 执行 POST 请求（不重试）
    pub(crate) async fn post(&self, path: &str, body: &str, ctx: ErrorContext) -> Result<Value> {
        let (status, response_text) = self.send(Method::POST, path, "", body).await?;
        self.handle_response(status, &response_text, ctx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::DnsError;

    fn api() -> Route53Api {
        Route53Api::new("AKID".into(), "secret".into()).unwrap()
    }

    #[test]
    fn success_body_is_decoded() {
        let body = "<GetChangeResponse><ChangeInfo><Id>/change/C1</Id>\
                    <Status>INSYNC</Status><SubmittedAt>2024-01-01T00:00:00.000Z</SubmittedAt>\
                    </ChangeInfo></GetChangeResponse>";
        let doc = api()
            .handle_response(200, body, ErrorContext::default())
            .unwrap();
        assert_eq!(doc["ChangeInfo"]["Status"], "INSYNC");
    }

    #[test]
    fn malformed_success_body_is_parse_error() {
        let result = api().handle_response(200, "<oops", ErrorContext::default());
        assert!(matches!(result, Err(DnsError::Parse { .. })));
    }

    #[test]
    fn error_response_is_mapped() {
        let body = r#"<ErrorResponse xmlns="https://route53.amazonaws.com/doc/2013-04-01/">
            <Error><Type>Sender</Type><Code>NoSuchHostedZone</Code>
            <Message>No hosted zone found with ID: Z1</Message></Error>
            <RequestId>1d3d5c5b</RequestId></ErrorResponse>"#;
        let err = api()
            .handle_response(404, body, ErrorContext::zone("Z1"))
            .unwrap_err();
        let shape = err.shape();
        assert!(matches!(err, DnsError::ZoneNotFound { .. }));
        assert_eq!(shape.error_type, "NoSuchHostedZone");
        assert_eq!(shape.code, "404");
        assert_eq!(shape.msg, "No hosted zone found with ID: Z1");
    }

    #[test]
    fn invalid_change_batch_messages_are_joined() {
        let body = r#"<InvalidChangeBatch xmlns="https://route53.amazonaws.com/doc/2013-04-01/">
            <Messages>
              <Message>Tried to delete resource record set [name='old.example.com.', type='A'] but it was not found</Message>
              <Message>second problem</Message>
            </Messages><RequestId>b25f48e8</RequestId></InvalidChangeBatch>"#;
        let err = api()
            .handle_response(400, body, ErrorContext::zone("Z1"))
            .unwrap_err();
        let DnsError::InvalidChangeBatch { fault, .. } = &err else {
            unreachable!("unexpected {err:?}");
        };
        assert!(fault.message.starts_with("Tried to delete resource record set"));
        assert!(fault.message.ends_with("; second problem"));
    }

    #[test]
    fn non_xml_error_falls_back_to_provider_error() {
        let err = api()
            .handle_response(500, "Internal Server Error", ErrorContext::default())
            .unwrap_err();
        assert!(matches!(err, DnsError::Provider { .. }));
    }
}
