//! REST client for the company-management endpoints.
//!
//! Every call reads the bearer token from the shared [`SessionManager`]
//! first; without a live session no request is sent.

use std::sync::Arc;

use bizdesk_core::company::{Company, CompanyForm};
use bizdesk_core::session::SessionManager;
use bizdesk_core::types::DbId;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Response to a create or update.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanySaved {
    pub message: String,
    pub company: Company,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for the company endpoints of one backend.
pub struct CompanyApi {
    client: reqwest::Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl CompanyApi {
    /// Build a client with the configured request timeout.
    pub fn new(config: &ClientConfig, session: Arc<SessionManager>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(client, &config.api_base_url, session))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        session: Arc<SessionManager>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    /// `GET /app/?action=companyDetails`
    pub async fn list(&self) -> Result<Vec<Company>, ClientError> {
        let token = self.token()?;
        let response = self
            .client
            .get(self.app_url())
            .query(&[("action", "companyDetails")])
            .bearer_auth(token)
            .send()
            .await?;

        let companies: Vec<Company> = Self::parse_response(response).await?;
        tracing::debug!(count = companies.len(), "Fetched companies");
        Ok(companies)
    }

    /// `POST /app/?action=addCompany` with a multipart body.
    pub async fn create(&self, form: &CompanyForm) -> Result<CompanySaved, ClientError> {
        form.validate()?;
        let token = self.token()?;
        let response = self
            .client
            .post(self.app_url())
            .query(&[("action", "addCompany")])
            .bearer_auth(token)
            .multipart(Self::multipart(form)?)
            .send()
            .await?;

        let saved: CompanySaved = Self::parse_response(response).await?;
        tracing::info!(company_id = saved.company.id, "Company created");
        Ok(saved)
    }

    /// `PUT /updateCompany/{id}` with a multipart body.
    pub async fn update(&self, id: DbId, form: &CompanyForm) -> Result<CompanySaved, ClientError> {
        form.validate()?;
        let token = self.token()?;
        let response = self
            .client
            .put(format!("{}/updateCompany/{}", self.base_url, id))
            .bearer_auth(token)
            .multipart(Self::multipart(form)?)
            .send()
            .await?;

        let saved: CompanySaved = Self::parse_response(response).await?;
        tracing::info!(company_id = id, "Company updated");
        Ok(saved)
    }

    /// `DELETE /app/?action=deleteCompany&id={id}`
    pub async fn delete(&self, id: DbId) -> Result<(), ClientError> {
        let token = self.token()?;
        let response = self
            .client
            .delete(self.app_url())
            .query(&[("action", "deleteCompany".to_string()), ("id", id.to_string())])
            .bearer_auth(token)
            .send()
            .await?;

        Self::ensure_success(response).await?;
        tracing::info!(company_id = id, "Company deleted");
        Ok(())
    }

    // ---- private helpers ----

    fn app_url(&self) -> String {
        format!("{}/app/", self.base_url)
    }

    fn token(&self) -> Result<String, ClientError> {
        self.session.bearer_token().ok_or_else(|| {
            tracing::warn!("Company request attempted without a session");
            ClientError::NotAuthenticated
        })
    }

    fn multipart(form: &CompanyForm) -> Result<Form, ClientError> {
        let mut body = Form::new();
        for (name, value) in form.text_fields() {
            body = body.text(name, value.to_string());
        }

        if let Some(upload) = form.logo_upload() {
            let part = Part::bytes(upload.bytes.clone())
                .file_name(upload.file_name.clone())
                .mime_str(&upload.content_type)?;
            body = body.part("logo", part);
        } else if form.clears_logo() {
            body = body.text("clear_logo", "true");
        }

        Ok(body)
    }

    /// Map non-2xx responses onto [`ClientError`], using the body's
    /// `message` when the backend sent one.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!(status = status.as_u16(), "Backend rejected credentials");
            return Err(ClientError::AuthRejected {
                status: status.as_u16(),
            });
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

        tracing::warn!(status = status.as_u16(), message = %message, "Company request failed");
        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
