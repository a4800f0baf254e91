use crate::domain::model::{PersonResponse, RawPerson};
use crate::domain::ports::PersonSource;
use crate::utils::error::FetchError;
use reqwest::{Client, StatusCode};

/// 對固定端點發出單次 GET；不重試
pub struct PersonFetcher {
    client: Client,
    endpoint: String,
}

impl PersonFetcher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl PersonSource for PersonFetcher {
    async fn fetch(&self) -> Result<RawPerson, FetchError> {
        tracing::debug!("Making API request to: {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let parsed: PersonResponse = serde_json::from_slice(&body)?;

        parsed
            .results
            .into_iter()
            .next()
            .ok_or(FetchError::EmptyResults)
    }
}
