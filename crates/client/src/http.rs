//! HTTP adapter for the storefront API.
//!
//! Implements the catalog and booking ports over `reqwest`, attaching
//! the session's bearer token when one is stored.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use doorstep_auth::{MeResponse, Session, UserProfile};
use doorstep_booking::{BookingGateway, BookingRequest, SubmitError};
use doorstep_catalog::{CatalogError, CatalogSource, Category, Service, ServiceQuery};

use crate::error::{ClientError, extract_error_message};

/// Shown when a booking failure carries no usable message.
const BOOKING_FALLBACK: &str = "Failed to create booking";

#[derive(Deserialize)]
struct CategoriesEnvelope {
    categories: Vec<Category>,
}

#[derive(Deserialize)]
struct ServicesEnvelope {
    services: Vec<Service>,
}

pub struct StorefrontClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<Session>,
}

impl StorefrontClient {
    /// `base_url` is the API origin, e.g. `https://api.example.com`.
    pub fn new(base_url: &str, session: Arc<Session>) -> Result<Self, ClientError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
            session,
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.base_url.join(path)?;
        let mut builder = self.http.request(method, url);
        if let Some(token) = self.session.access_token() {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn failure_message(response: Response, fallback: &str) -> String {
        match response.text().await {
            Ok(body) => extract_error_message(&body, fallback),
            Err(_) => fallback.to_owned(),
        }
    }

    async fn get_categories(&self) -> Result<Vec<Category>, ClientError> {
        let envelope: CategoriesEnvelope = self
            .request(Method::GET, "/categories")?
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(count = envelope.categories.len(), "categories fetched");
        Ok(envelope.categories)
    }

    async fn get_services(&self, query: &ServiceQuery) -> Result<Vec<Service>, ClientError> {
        let envelope: ServicesEnvelope = self
            .request(Method::GET, "/services")?
            .query(&query.to_query_pairs())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(count = envelope.services.len(), "services fetched");
        Ok(envelope.services)
    }
}

#[async_trait]
impl CatalogSource for StorefrontClient {
    async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.get_categories()
            .await
            .map_err(|e| CatalogError::new(e.to_string()))
    }

    async fn fetch_services(&self, query: &ServiceQuery) -> Result<Vec<Service>, CatalogError> {
        self.get_services(query)
            .await
            .map_err(|e| CatalogError::new(e.to_string()))
    }
}

#[async_trait]
impl BookingGateway for StorefrontClient {
    async fn create_booking(&self, request: &BookingRequest) -> Result<(), SubmitError> {
        let builder = self
            .request(Method::POST, "/bookings")
            .map_err(|e| SubmitError::new(e.to_string()))?;

        let response = match builder.json(request).send().await {
            Ok(response) => response,
            // Network failures get the generic message; there is no
            // server body to mine.
            Err(e) => {
                debug!(error = %e, "booking request never completed");
                return Err(SubmitError::new(BOOKING_FALLBACK));
            }
        };

        if response.status().is_success() {
            return Ok(());
        }
        Err(SubmitError::new(
            Self::failure_message(response, BOOKING_FALLBACK).await,
        ))
    }

    async fn me(&self) -> Result<UserProfile, SubmitError> {
        let me: MeResponse = self
            .request(Method::GET, "/auth/me")
            .map_err(|e| SubmitError::new(e.to_string()))?
            .send()
            .await
            .map_err(|e| SubmitError::new(e.to_string()))?
            .error_for_status()
            .map_err(|e| SubmitError::new(e.to_string()))?
            .json()
            .await
            .map_err(|e| SubmitError::new(e.to_string()))?;
        Ok(me.user)
    }
}
