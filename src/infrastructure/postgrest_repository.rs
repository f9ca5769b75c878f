// PostgREST repository implementation
use crate::application::reading_repository::{ReadingRepository, StoreError};
use crate::domain::reading::{Reading, TimeRange};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

/// Reads `loop_fullness_logs` rows through a PostgREST endpoint
/// (`<url>/rest/v1/<table>`), as exposed by a hosted Postgres backend.
#[derive(Debug, Clone)]
pub struct PostgrestRepository {
    base_url: String,
    api_key: String,
    table: String,
    client: reqwest::Client,
}

impl PostgrestRepository {
    pub fn new(base_url: String, api_key: String, table: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            table,
            client: reqwest::Client::new(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn build_range_url(&self, range: &TimeRange) -> String {
        let mut url = format!("{}?select=*&order=timestamp.asc", self.table_url());
        if let Some(start) = range.start {
            url.push_str(&format!("&timestamp=gte.{}", encode_instant(start)));
        }
        if let Some(end) = range.end {
            url.push_str(&format!("&timestamp=lte.{}", encode_instant(end)));
        }
        url
    }

    fn build_latest_url(&self, instant: DateTime<Utc>) -> String {
        format!(
            "{}?select=*&timestamp=lte.{}&order=timestamp.desc,id.desc&limit=1",
            self.table_url(),
            encode_instant(instant)
        )
    }

    async fn execute_query(&self, url: &str) -> Result<Vec<Reading>, StoreError> {
        tracing::debug!("Executing reading store query: {}", url);

        let response = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        response
            .json::<Vec<Reading>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

fn encode_instant(instant: DateTime<Utc>) -> String {
    urlencoding::encode(&instant.to_rfc3339_opts(SecondsFormat::Millis, true)).into_owned()
}

#[async_trait]
impl ReadingRepository for PostgrestRepository {
    async fn readings_in_range(&self, range: &TimeRange) -> Result<Vec<Reading>, StoreError> {
        let readings = self.execute_query(&self.build_range_url(range)).await?;
        tracing::debug!("Store returned {} readings", readings.len());
        Ok(readings)
    }

    async fn latest_at_or_before(
        &self,
        instant: DateTime<Utc>,
    ) -> Result<Option<Reading>, StoreError> {
        let readings = self.execute_query(&self.build_latest_url(instant)).await?;
        Ok(readings.into_iter().next())
    }
}
