use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

pub const AUTHORIZATION_HEADER: &str = "authorization";
const BEARER_PREFIX: &str = "bearer ";

/// Inbound authorizer event as delivered by the gateway.
///
/// Both the REQUEST (`headers`) and TOKEN (`authorizationToken`) event styles
/// are accepted. Gateway REQUEST events also carry `resource` as the route
/// template, so `methodArn` takes precedence when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthorizerRequest {
    pub headers: Headers,
    #[serde(rename = "methodArn")]
    pub method_arn: Option<String>,
    pub resource: Option<String>,
    #[serde(rename = "authorizationToken")]
    pub authorization_token: Option<String>,
    pub token: Option<String>,
}

impl AuthorizerRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(name, value);
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// The ARN-like identifier of the resource being invoked.
    pub fn resource_identifier(&self) -> Option<&str> {
        self.method_arn.as_deref().or(self.resource.as_deref())
    }

    pub fn authorization_header(&self) -> Option<&str> {
        self.headers.get(AUTHORIZATION_HEADER)
    }

    /// Header value first, then the alternate token field. Blank values are
    /// treated as absent.
    pub fn raw_token(&self) -> Option<&str> {
        let present = |v: &&str| !v.trim().is_empty();
        self.authorization_header()
            .filter(present)
            .or_else(|| self.authorization_token.as_deref().filter(present))
            .or_else(|| self.token.as_deref().filter(present))
    }

    /// The normalized bearer token, if the request carries one.
    pub fn bearer_token(&self) -> Option<&str> {
        self.raw_token()
            .map(normalize_token)
            .filter(|token| !token.is_empty())
    }
}

/// Trims whitespace and strips a case-insensitive `Bearer ` prefix.
pub fn normalize_token(raw: &str) -> &str {
    let token = raw.trim();
    match token.get(..BEARER_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(BEARER_PREFIX) => {
            &token[BEARER_PREFIX.len()..]
        }
        _ => token,
    }
}

/// Header list in arrival order with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value whose name matches ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of header names to string values")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Headers::default())
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Headers::default())
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_map(self)
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut headers = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, value)) = map.next_entry::<String, Option<String>>()? {
                    if let Some(value) = value {
                        headers.push((name, value));
                    }
                }
                Ok(Headers(headers))
            }
        }

        deserializer.deserialize_option(HeadersVisitor)
    }
}
