//! Async HTTP client wrapping the Escala JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use escala_core::{
  assignment::{Assignment, InstrumentSlots, Period},
  person::{Instrument, Person, PersonKind},
  roster::{MonthKey, MonthlyRoster},
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// Connection settings for the Escala API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Body of `POST /people`.
#[derive(Debug, Clone, Serialize)]
pub struct PersonRequest {
  pub nome:         String,
  pub tipo:         PersonKind,
  pub instrumentos: Vec<Instrument>,
}

/// Body of `POST /assignments` and `PATCH /assignments`. References are
/// person ids.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentRequest {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id:                Option<Uuid>,
  pub data:              String,
  pub periodo:           Option<Period>,
  pub minister:          Option<Uuid>,
  pub backing_vocalists: Vec<Uuid>,
  pub instrument_slots:  InstrumentSlots<Uuid>,
}

/// Async HTTP client for the Escala JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let req = self.client.request(method, self.url(path));
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// Send `req` and decode a JSON body, turning `{"error": …}` replies into
  /// errors that carry the server's message.
  async fn send<T: DeserializeOwned>(&self, what: &str, req: RequestBuilder) -> Result<T> {
    let resp = req.send().await.with_context(|| format!("{what} failed"))?;
    let resp = check(what, resp).await?;
    resp
      .json()
      .await
      .with_context(|| format!("deserialising {what} response"))
  }

  // ── People ────────────────────────────────────────────────────────────────

  /// `GET /people`
  pub async fn list_people(&self) -> Result<Vec<Person>> {
    self.send("GET /people", self.request(Method::GET, "/people")).await
  }

  /// `POST /people`
  pub async fn add_person(&self, body: &PersonRequest) -> Result<Person> {
    self
      .send("POST /people", self.request(Method::POST, "/people").json(body))
      .await
  }

  /// `DELETE /people?id=<id>`
  pub async fn delete_person(&self, id: Uuid) -> Result<()> {
    let req = self
      .request(Method::DELETE, "/people")
      .query(&[("id", id.to_string())]);
    let _: serde_json::Value = self.send("DELETE /people", req).await?;
    Ok(())
  }

  // ── Assignments ───────────────────────────────────────────────────────────

  /// `GET /assignments`
  pub async fn list_assignments(&self) -> Result<Vec<Assignment>> {
    self
      .send("GET /assignments", self.request(Method::GET, "/assignments"))
      .await
  }

  /// `POST /assignments`
  pub async fn add_assignment(&self, body: &AssignmentRequest) -> Result<Assignment> {
    self
      .send(
        "POST /assignments",
        self.request(Method::POST, "/assignments").json(body),
      )
      .await
  }

  /// `PATCH /assignments`
  pub async fn update_assignment(&self, body: &AssignmentRequest) -> Result<Assignment> {
    self
      .send(
        "PATCH /assignments",
        self.request(Method::PATCH, "/assignments").json(body),
      )
      .await
  }

  /// `DELETE /assignments?id=<id>`
  pub async fn delete_assignment(&self, id: Uuid) -> Result<()> {
    let req = self
      .request(Method::DELETE, "/assignments")
      .query(&[("id", id.to_string())]);
    let _: serde_json::Value = self.send("DELETE /assignments", req).await?;
    Ok(())
  }

  // ── Roster ────────────────────────────────────────────────────────────────

  /// `GET /roster?month=YYYY-MM`
  pub async fn roster(&self, month: MonthKey) -> Result<MonthlyRoster> {
    let req = self
      .request(Method::GET, "/roster")
      .query(&[("month", month.to_string())]);
    self.send("GET /roster", req).await
  }
}

async fn check(what: &str, resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<serde_json::Value>()
    .await
    .ok()
    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned));
  match message {
    Some(msg) => Err(anyhow!("{what} → {status}: {msg}")),
    None => Err(anyhow!("{what} → {status}")),
  }
}
