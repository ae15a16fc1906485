use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{Credentials, ErrorResponse, LoginResponse, RegisterResponse};

#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with an error; holds its message
    #[error("{0}")]
    Rejected(String),

    #[error("Could not connect to the server.")]
    Connection(#[source] reqwest::Error),

    #[error("Unexpected response from the server.")]
    UnexpectedResponse(#[source] reqwest::Error),
}

/// HTTP client for the registration and login routes
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn register(&self, name: &str, password: &str) -> Result<RegisterResponse, ClientError> {
        self.post(
            "/api/register",
            &Credentials::new(name, password),
            "That company name is already in use.",
        )
        .await
    }

    pub async fn login(&self, name: &str, password: &str) -> Result<LoginResponse, ClientError> {
        self.post(
            "/api/login",
            &Credentials::new(name, password),
            "Incorrect company name or password.",
        )
        .await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Credentials,
        fallback: &str,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {url}");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("Request to {url} failed: {e}");
                ClientError::Connection(e)
            })?;

        if response.status().is_success() {
            return response
                .json::<T>()
                .await
                .map_err(ClientError::UnexpectedResponse);
        }

        let status = response.status();
        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| fallback.to_string());
        debug!("{url} answered {status}: {message}");

        Err(ClientError::Rejected(message))
    }
}
