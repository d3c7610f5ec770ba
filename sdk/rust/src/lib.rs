//! Thin async client for the quake-finder JSON API.

use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCity {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSummary {
    pub path: String,
    #[serde(default)]
    pub name: Option<String>,
    pub component: String,
    #[serde(default)]
    pub meta: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSubmitted {
    pub task_id: String,
}

/// Error body returned for any non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

pub struct QuakeClient {
    client: Client,
    base_url: String,
}

impl QuakeClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn list_routes(&self) -> Result<Vec<RouteSummary>, Error> {
        let resp = self.client.get(self.url("/api/routes")).send().await?;
        decode(resp).await
    }

    pub async fn list_cities(&self) -> Result<Vec<City>, Error> {
        let resp = self.client.get(self.url("/api/cities")).send().await?;
        decode(resp).await
    }

    pub async fn create_city(&self, city: &NewCity) -> Result<City, Error> {
        let resp = self.client.post(self.url("/api/cities")).json(city).send().await?;
        decode(resp).await
    }

    /// Run a search and wait for it. The outcome is either a closest
    /// earthquake or `{"message": "No results found"}`, so it is returned
    /// as raw JSON.
    pub async fn search(
        &self,
        city_id: u64,
        start_date: &str,
        end_date: &str,
    ) -> Result<serde_json::Value, Error> {
        let resp = self
            .client
            .get(self.url(&format!("/api/cities/{}/earthquakes", city_id)))
            .query(&[("start_date", start_date), ("end_date", end_date)])
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn submit_search(
        &self,
        city_id: u64,
        start_date: &str,
        end_date: &str,
    ) -> Result<TaskSubmitted, Error> {
        let resp = self
            .client
            .post(self.url(&format!("/api/cities/{}/earthquakes", city_id)))
            .query(&[("start_date", start_date), ("end_date", end_date)])
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn task_status(&self, task_id: &str) -> Result<serde_json::Value, Error> {
        let resp = self
            .client
            .get(self.url(&format!("/api/cities/results/{}", task_id)))
            .send()
            .await?;
        decode(resp).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, Error> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ApiMessage>(&text)
            .map(|m| m.message)
            .unwrap_or(text);
        return Err(format!("quake-finder returned {}: {}", status, message).into());
    }

    Ok(serde_json::from_str(&text)?)
}
