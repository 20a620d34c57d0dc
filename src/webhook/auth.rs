use axum::http::{HeaderMap, header::AUTHORIZATION};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use secrecy::{ExposeSecret, SecretString};

use crate::error::WebhookError;

pub const ACTIVITY_ID_HEADER: &str = "x-vss-activityid";
pub const SUBSCRIPTION_ID_HEADER: &str = "x-vss-subscriptionid";
pub const REQUEST_ID_HEADER: &str = "request-id";

/// The username/password pair a service-hook subscription is configured to send.
#[derive(Clone, Debug)]
pub struct WebhookCredentials {
    pub username: String,
    password: SecretString,
}

impl WebhookCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Credentials presented in an `Authorization: Basic` header.
#[derive(Debug)]
pub struct BasicCredentials {
    pub username: String,
    pub password: SecretString,
}

impl BasicCredentials {
    /// Parses the value of an `Authorization` header.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let (_, encoded) = header
            .trim()
            .split_once(' ')
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("basic"))
            .ok_or_else(|| WebhookError::Authentication("expected Basic authorization".into()))?;
        let decoded = BASE64
            .decode(encoded.trim().as_bytes())
            .map_err(|_| WebhookError::Authentication("malformed Basic authorization".into()))?;
        let creds = String::from_utf8(decoded)
            .map_err(|_| WebhookError::Authentication("malformed Basic authorization".into()))?;
        let (username, password) = creds
            .split_once(':')
            .ok_or_else(|| WebhookError::Authentication("malformed Basic authorization".into()))?;

        Ok(Self {
            username: username.to_string(),
            password: SecretString::from(password.to_string()),
        })
    }

    /// Compares against the expected pair without short-circuiting on the first mismatch.
    pub fn verify(&self, expected: &WebhookCredentials) -> Result<(), WebhookError> {
        let user_ok = constant_time_eq(self.username.as_bytes(), expected.username.as_bytes());
        let pass_ok = constant_time_eq(
            self.password.expose_secret().as_bytes(),
            expected.password.expose_secret().as_bytes(),
        );
        if user_ok & pass_ok {
            Ok(())
        } else {
            Err(WebhookError::Authentication(
                "credentials do not match".into(),
            ))
        }
    }
}

/// Authenticates a delivery and hands back its body untouched.
pub fn validate_payload<'a>(
    headers: &HeaderMap,
    payload: &'a [u8],
    expected: &WebhookCredentials,
) -> Result<&'a [u8], WebhookError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| WebhookError::Authentication("missing Authorization header".into()))?
        .to_str()
        .map_err(|_| WebhookError::Authentication("malformed Authorization header".into()))?;

    BasicCredentials::parse(header)?.verify(expected)?;
    Ok(payload)
}

/// Value of the `X-VSS-ActivityId` header, or `""` when absent.
pub fn activity_id(headers: &HeaderMap) -> &str {
    header_str(headers, ACTIVITY_ID_HEADER)
}

/// Value of the `X-VSS-SubscriptionId` header, or `""` when absent.
pub fn subscription_id(headers: &HeaderMap) -> &str {
    header_str(headers, SUBSCRIPTION_ID_HEADER)
}

/// Value of the `Request-Id` header, or `""` when absent.
pub fn request_id(headers: &HeaderMap) -> &str {
    header_str(headers, REQUEST_ID_HEADER)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderName, HeaderValue};

    use super::*;

    fn basic_header(user: &str, pass: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = format!("Basic {}", BASE64.encode(format!("{}:{}", user, pass)));
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
        headers
    }

    #[test]
    fn matching_credentials_return_payload_unchanged() {
        let creds = WebhookCredentials::new("testuser", "testpass");
        let headers = basic_header("testuser", "testpass");
        let payload = b"testpayload";

        let got = validate_payload(&headers, payload, &creds).unwrap();
        assert_eq!(got, payload);
    }

    #[test]
    fn single_byte_difference_is_rejected() {
        let creds = WebhookCredentials::new("testuser", "testpass");
        for (user, pass) in [
            ("testuseR", "testpass"),
            ("testuser", "testpasS"),
            ("testuse", "testpass"),
            ("testuser", "testpass1"),
            ("", "testpass"),
        ] {
            let headers = basic_header(user, pass);
            let err = validate_payload(&headers, b"{}", &creds).unwrap_err();
            assert!(
                matches!(err, WebhookError::Authentication(_)),
                "{user}:{pass} should be rejected"
            );
        }
    }

    #[test]
    fn missing_or_malformed_header_is_rejected() {
        let creds = WebhookCredentials::new("u", "p");
        assert!(matches!(
            validate_payload(&HeaderMap::new(), b"{}", &creds),
            Err(WebhookError::Authentication(_))
        ));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert!(validate_payload(&headers, b"{}", &creds).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic !!notbase64"));
        assert!(validate_payload(&headers, b"{}", &creds).is_err());

        // no colon separator
        let value = format!("Basic {}", BASE64.encode("justuser"));
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
        assert!(validate_payload(&headers, b"{}", &creds).is_err());
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let creds = WebhookCredentials::new("u", "p");
        for scheme in ["Basic", "basic", "BASIC", "bAsIc"] {
            let mut headers = HeaderMap::new();
            let value = format!("{} {}", scheme, BASE64.encode("u:p"));
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
            assert!(
                validate_payload(&headers, b"{}", &creds).is_ok(),
                "{scheme} should be accepted"
            );
        }
    }

    #[test]
    fn password_may_contain_colons() {
        let parsed = BasicCredentials::parse(&format!(
            "Basic {}",
            BASE64.encode("svc:pa:ss")
        ))
        .unwrap();
        assert_eq!(parsed.username, "svc");
        assert_eq!(parsed.password.expose_secret(), "pa:ss");
    }

    #[test]
    fn correlation_headers_are_exposed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(b"X-VSS-ActivityId").unwrap(),
            HeaderValue::from_static("8970a780-244e-11e7-91ca-da3aabcb9793"),
        );
        headers.insert(
            HeaderName::from_bytes(b"X-VSS-SubscriptionId").unwrap(),
            HeaderValue::from_static("6b9490e4-940d-4d16-8dae-d36580e7e2b4"),
        );
        headers.insert(
            HeaderName::from_bytes(b"Request-Id").unwrap(),
            HeaderValue::from_static("|2c08c6334570ae4bb625b27e533afd00.1fc0bd4d_1fc0bd50_791563."),
        );

        assert_eq!(activity_id(&headers), "8970a780-244e-11e7-91ca-da3aabcb9793");
        assert_eq!(subscription_id(&headers), "6b9490e4-940d-4d16-8dae-d36580e7e2b4");
        assert_eq!(
            request_id(&headers),
            "|2c08c6334570ae4bb625b27e533afd00.1fc0bd4d_1fc0bd50_791563."
        );
        assert_eq!(activity_id(&HeaderMap::new()), "");
    }
}
