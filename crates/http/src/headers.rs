//! Alert headers attached to entity mutations and failures.
//!
//! Clients read `X-{app}-alert` / `X-{app}-error` to show a notification and
//! `X-{app}-params` to interpolate it.

use std::fmt::Display;

use anyhow::Context;
use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AlertHeaders {
    app_name: String,
    alert: HeaderName,
    error: HeaderName,
    params: HeaderName,
}

impl AlertHeaders {
    /// Build the header family for an application name.
    pub fn new(app_name: &str) -> anyhow::Result<Self> {
        let name = |suffix: &str| {
            let raw = format!("X-{app_name}-{suffix}");
            HeaderName::from_bytes(raw.as_bytes())
                .with_context(|| format!("'{raw}' is not a valid header name"))
        };

        Ok(Self {
            app_name: app_name.to_string(),
            alert: name("alert")?,
            error: name("error")?,
            params: name("params")?,
        })
    }

    /// Header names a browser client must be allowed to read.
    pub fn exposed(&self) -> [HeaderName; 3] {
        [self.alert.clone(), self.error.clone(), self.params.clone()]
    }

    pub fn entity_created(&self, entity: &str, id: impl Display) -> HeaderMap {
        self.alert(&format!("{}.{entity}.created", self.app_name), &id.to_string())
    }

    pub fn entity_updated(&self, entity: &str, id: impl Display) -> HeaderMap {
        self.alert(&format!("{}.{entity}.updated", self.app_name), &id.to_string())
    }

    pub fn entity_deleted(&self, entity: &str, id: impl Display) -> HeaderMap {
        self.alert(&format!("{}.{entity}.deleted", self.app_name), &id.to_string())
    }

    /// Headers describing a rejected request against `entity`.
    pub fn failure(&self, entity: &str, error_key: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        insert(&mut headers, &self.error, &format!("error.{error_key}"));
        insert(&mut headers, &self.params, entity);
        headers
    }

    /// A 400 response carrying the failure headers.
    pub fn bad_request(
        &self,
        message: impl Into<String>,
        entity: &str,
        error_key: &str,
    ) -> AppError {
        AppError::BadRequestAlert {
            message: message.into(),
            code: format!("error.{error_key}"),
            headers: self.failure(entity, error_key),
        }
    }

    fn alert(&self, message: &str, param: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        insert(&mut headers, &self.alert, message);
        insert(&mut headers, &self.params, param);
        headers
    }
}

// Values that are not valid header text are dropped; the alert is advisory.
fn insert(headers: &mut HeaderMap, name: &HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name.clone(), value);
    }
}
