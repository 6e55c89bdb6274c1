//! Request descriptions handed to [`ApiClient`](super::ApiClient).
//!
//! A request may be sent twice (original attempt plus one retry after a
//! token refresh), so everything here is owned and replayable. reqwest's
//! multipart `Form` is consumed on send; [`MultipartBody`] keeps the parts
//! and builds a fresh form per attempt.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::errors::{ApiError, ApiResult};

/// Method, extra headers and body of one API call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Merged over the client's defaults.
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self { method, headers: HeaderMap::new(), body: RequestBody::Empty }
    }

    #[must_use]
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    #[must_use]
    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    #[must_use]
    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    #[must_use]
    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Serialize `body` as the JSON payload.
    ///
    /// # Errors
    /// Returns [`ApiError::Serialization`] if `body` cannot be represented as
    /// JSON.
    pub fn with_serialized<T: Serialize + ?Sized>(self, body: &T) -> ApiResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Serialization(format!("failed to serialize body: {e}")))?;
        Ok(self.with_json(value))
    }

    #[must_use]
    pub fn with_multipart(mut self, body: MultipartBody) -> Self {
        self.body = RequestBody::Multipart(body);
        self
    }

    #[must_use]
    pub fn with_bytes(mut self, data: Vec<u8>, content_type: Option<&str>) -> Self {
        self.body = RequestBody::Bytes { data, content_type: content_type.map(String::from) };
        self
    }
}

/// Request payload.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// Sent as `multipart/form-data`; the transport sets the boundary.
    Multipart(MultipartBody),
    /// Raw bytes with an optional content type.
    Bytes { data: Vec<u8>, content_type: Option<String> },
}

impl RequestBody {
    /// Whether the JSON content type applies to this body.
    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Empty | Self::Json(_))
    }
}

#[derive(Debug, Clone)]
enum PartData {
    Text(String),
    File { file_name: String, mime: Option<String>, data: Vec<u8> },
}

/// Replayable multipart form.
#[derive(Debug, Clone, Default)]
pub struct MultipartBody {
    parts: Vec<(String, PartData)>,
}

impl MultipartBody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), PartData::Text(value.into())));
        self
    }

    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        data: Vec<u8>,
        mime: Option<&str>,
    ) -> Self {
        self.parts.push((
            name.into(),
            PartData::File { file_name: file_name.into(), mime: mime.map(String::from), data },
        ));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Build a fresh reqwest form from the stored parts.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] when a part carries an invalid MIME type.
    pub fn to_form(&self) -> ApiResult<Form> {
        let mut form = Form::new();
        for (name, data) in &self.parts {
            form = match data {
                PartData::Text(value) => form.text(name.clone(), value.clone()),
                PartData::File { file_name, mime, data } => {
                    let mut part = Part::bytes(data.clone()).file_name(file_name.clone());
                    if let Some(mime) = mime {
                        part = part.mime_str(mime).map_err(|e| {
                            ApiError::Config(format!("invalid MIME type '{mime}': {e}"))
                        })?;
                    }
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}
