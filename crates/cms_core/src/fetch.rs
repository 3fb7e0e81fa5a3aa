use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Request, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::trace;
use url::Url;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Credentials {
    Omit,
    SameOrigin,
    Include,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestCache {
    Default,
    NoStore,
    Reload,
    NoCache,
    ForceCache,
    OnlyIfCached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    Cors,
    NoCors,
    SameOrigin,
    Navigate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestRedirect {
    Follow,
    Error,
    Manual,
}

/// The standard request configuration. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<RequestCache>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<RequestMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<RequestRedirect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keepalive: Option<bool>,
}

impl RequestInit {
    /// The request method, `GET` when none was set.
    pub fn method(&self) -> Result<Method> {
        match self.method.as_deref() {
            None => Ok(Method::GET),
            Some(raw) => Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes())
                .map_err(|_| Error::InvalidMethod(raw.to_string())),
        }
    }

    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            headers.append(header_name, header_value);
        }
        Ok(headers)
    }
}

/// Caching directives carried next to the request configuration.
///
/// Both fields absent means the executor applies its default caching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestDirectives {
    /// Seconds the fetched resource stays fresh. Must be finite and not negative.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "seconds")]
    pub revalidate: Option<f64>,
    /// Labels for group invalidation, in caller order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Whole seconds go out as integers, so `60` stays `60` on the wire.
mod seconds {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match *value {
            Some(secs) if secs.fract() == 0.0 && secs >= 0.0 && secs <= u64::MAX as f64 => {
                serializer.serialize_u64(secs as u64)
            }
            Some(secs) => serializer.serialize_f64(secs),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = Option::<f64>::deserialize(deserializer)?;
        match value {
            Some(secs) if !secs.is_finite() || secs < 0.0 => Err(D::Error::custom(format!(
                "revalidate must be a non-negative number of seconds, got {}",
                secs
            ))),
            _ => Ok(value),
        }
    }
}

impl RequestDirectives {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revalidate_secs(mut self, secs: u64) -> Self {
        self.revalidate = Some(secs as f64);
        self
    }

    /// Keeps sub-second precision, so `500ms` becomes `0.5`.
    pub fn revalidate_after(mut self, ttl: Duration) -> Self {
        self.revalidate = Some(ttl.as_secs_f64());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags
            .get_or_insert_with(Vec::new)
            .extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn revalidate(&self) -> Option<Duration> {
        self.revalidate
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub fn tag_list(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.revalidate.is_none() && self.tags.is_none()
    }
}

/// Options for a single fetch: the standard configuration plus `next`.
///
/// Serializes as one flat object, e.g.
/// `{"method":"GET","next":{"revalidate":60,"tags":["articles"]}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchOptions {
    #[serde(flatten)]
    pub init: RequestInit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<RequestDirectives>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get() -> Self {
        Self::new().method("GET")
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.init.method = Some(method.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.init.headers.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.init.body = Some(body.into());
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.init.credentials = Some(credentials);
        self
    }

    pub fn cache(mut self, cache: RequestCache) -> Self {
        self.init.cache = Some(cache);
        self
    }

    pub fn next(mut self, directives: RequestDirectives) -> Self {
        self.next = Some(directives);
        self
    }

    pub fn directives(&self) -> Option<&RequestDirectives> {
        self.next.as_ref()
    }

    /// Builds a request for `url` carrying this configuration's method,
    /// headers and body. Nothing is sent; `next` is left to the caller.
    pub fn prepare(&self, client: &Client, url: &str) -> Result<RequestBuilder> {
        let url = Url::parse(url)?;
        let method = self.init.method()?;
        let headers = self.init.header_map()?;

        trace!("Preparing {} {} with {} headers", method, url, headers.len());

        let mut builder = client.request(method, url).headers(headers);
        if let Some(body) = &self.init.body {
            builder = builder.body(body.clone());
        }
        Ok(builder)
    }

    /// Like [`FetchOptions::prepare`], finished into a [`reqwest::Request`].
    pub fn build_request(&self, client: &Client, url: &str) -> Result<Request> {
        Ok(self.prepare(client, url)?.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_wire_form() {
        let options = FetchOptions::get()
            .header("accept", "application/json")
            .credentials(Credentials::SameOrigin)
            .cache(RequestCache::NoStore)
            .next(RequestDirectives::new().revalidate_secs(60).tag("articles"));

        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({
                "method": "GET",
                "headers": { "accept": "application/json" },
                "credentials": "same-origin",
                "cache": "no-store",
                "next": { "revalidate": 60, "tags": ["articles"] }
            })
        );
    }

    #[test]
    fn test_referrer_policy_is_camel_case() {
        let options: FetchOptions = serde_json::from_value(json!({
            "referrerPolicy": "no-referrer",
            "keepalive": true,
            "redirect": "manual"
        }))
        .unwrap();
        assert_eq!(options.init.referrer_policy.as_deref(), Some("no-referrer"));
        assert_eq!(options.init.keepalive, Some(true));
        assert_eq!(options.init.redirect, Some(RequestRedirect::Manual));
        assert!(options.next.is_none());
    }

    #[test]
    fn test_directive_builders() {
        let directives = RequestDirectives::new()
            .revalidate_after(Duration::from_millis(90_500))
            .tags(["a", "b"])
            .tag("c");
        assert_eq!(directives.revalidate, Some(90.5));
        assert_eq!(directives.revalidate(), Some(Duration::from_millis(90_500)));
        assert_eq!(directives.tag_list(), ["a", "b", "c"]);
        assert!(!directives.is_empty());
        assert!(RequestDirectives::new().is_empty());
        assert!(RequestDirectives::new().tag_list().is_empty());
    }

    #[test]
    fn test_sub_second_ttl_is_not_zero() {
        let directives = RequestDirectives::new().revalidate_after(Duration::from_millis(500));
        assert_eq!(directives.revalidate, Some(0.5));
        assert_eq!(directives.revalidate(), Some(Duration::from_millis(500)));
        assert_eq!(serde_json::to_value(&directives).unwrap(), json!({ "revalidate": 0.5 }));

        let whole = RequestDirectives::new().revalidate_after(Duration::from_secs(60));
        assert_eq!(serde_json::to_string(&whole).unwrap(), r#"{"revalidate":60}"#);
    }

    #[test]
    fn test_revalidate_set_out_of_range_has_no_duration() {
        let directives = RequestDirectives {
            revalidate: Some(-3.0),
            tags: None,
        };
        assert_eq!(directives.revalidate(), None);
    }

    #[test]
    fn test_method_defaults_to_get() {
        assert_eq!(RequestInit::default().method().unwrap(), Method::GET);
        assert_eq!(FetchOptions::new().method("post").init.method().unwrap(), Method::POST);
        assert!(matches!(
            FetchOptions::new().method("GE T").init.method(),
            Err(Error::InvalidMethod(_))
        ));
    }

    #[test]
    fn test_prepare_builds_request() {
        let client = Client::new();
        let request = FetchOptions::new()
            .method("POST")
            .header("x-api-key", "secret")
            .body(r#"{"query":"{}"}"#)
            .next(RequestDirectives::new().tag("articles"))
            .build_request(&client, "https://cms.example.com/api/graphql")
            .unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().as_str(), "https://cms.example.com/api/graphql");
        assert_eq!(request.headers()["x-api-key"], "secret");
        assert_eq!(
            request.body().and_then(|b| b.as_bytes()),
            Some(br#"{"query":"{}"}"#.as_slice())
        );
    }

    #[test]
    fn test_prepare_rejects_bad_input() {
        let client = Client::new();
        assert!(matches!(
            FetchOptions::new().prepare(&client, "not a url"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            FetchOptions::new()
                .header("bad header", "v")
                .prepare(&client, "https://cms.example.com"),
            Err(Error::InvalidHeader { .. })
        ));
    }
}
