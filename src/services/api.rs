//! HTTP client for the remote trip store. One full-replace payload per
//! trip, plus join/load/delete and the auth endpoints.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use url::Url;

use crate::error::AppError;
use crate::models::{
    expense::Expense,
    itinerary::ItineraryItem,
    note::Note,
    recommendation::Recommendation,
    trip::{ShortCode, Trip},
    user::{AuthSession, User},
};
use crate::services::sync::{RemoteSink, SyncPayload};
use crate::store::AppState;

/// Child entities of a single trip, as returned by `GET /trips/{id}/full`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripDetail {
    #[serde(default)]
    pub itinerary: Vec<ItineraryItem>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// Public snapshot by short code (`GET /trip/{shortId}`), used for the
/// preview/import flow that needs no credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct TripBundle {
    pub trip: Trip,
    #[serde(flatten)]
    pub detail: TripDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyMember,
}

#[derive(Debug, Deserialize)]
struct JoinResponse {
    #[serde(rename = "alreadyMember", default)]
    already_member: bool,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base: Url, request_timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            http,
            base,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        self.base
            .join(path)
            .map_err(|err| AppError::Config(format!("bad endpoint {path}: {err}")))
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Run a request and fold the status code into the error taxonomy.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        match AppError::from_status(status, body) {
            Some(err) => Err(err),
            None => Err(AppError::Remote(format!("unexpected status {status}"))),
        }
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<(), AppError> {
        let url = self.endpoint("/auth/register")?;
        let response = self
            .http
            .post(url)
            .json(&json!({ "email": email, "password": password, "name": name }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let url = self.endpoint("/auth/login")?;
        let response = self
            .http
            .post(url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Trips the caller is a member of, tombstoned trips excluded and each
    /// annotated with the caller's membership.
    pub async fn list_trips(&self) -> Result<Vec<Trip>, AppError> {
        let url = self.endpoint("/trips")?;
        let response = self.authed(self.http.get(url)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn trip_detail(&self, trip_id: &str) -> Result<TripDetail, AppError> {
        let url = self.endpoint(&format!("/trips/{trip_id}/full"))?;
        let response = self.authed(self.http.get(url)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Read-only snapshot by short code; no credentials needed.
    pub async fn fetch_by_short_code(&self, code: &ShortCode) -> Result<TripBundle, AppError> {
        let url = self.endpoint(&format!("/trip/{code}"))?;
        let response = self.http.get(url).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Join a trip as EDITOR. Joining something you are already in is a
    /// success, not an error.
    pub async fn join(&self, code: &ShortCode) -> Result<JoinOutcome, AppError> {
        let url = self.endpoint("/trips/join")?;
        let response = self
            .authed(self.http.post(url))
            .json(&json!({ "shortId": code }))
            .send()
            .await?;
        let parsed: JoinResponse = Self::check(response).await?.json().await?;
        if parsed.already_member {
            Ok(JoinOutcome::AlreadyMember)
        } else {
            Ok(JoinOutcome::Joined)
        }
    }

    /// Bootstrap: the trip list first, then the details of every trip in
    /// parallel. A trip whose detail fetch fails is loaded bare (logged
    /// and skipped) rather than sinking the whole snapshot.
    pub async fn load_all(&self, user: &User) -> Result<AppState, AppError> {
        let trips = self.list_trips().await?;
        info!(count = trips.len(), user = %user.email, "loading trips");

        let details = join_all(
            trips
                .iter()
                .map(|trip| async move { (trip.id.clone(), self.trip_detail(&trip.id).await) }),
        )
        .await;

        let mut state = AppState {
            trips,
            ..AppState::default()
        };
        for (trip_id, detail) in details {
            match detail {
                Ok(detail) => {
                    state.itinerary.extend(detail.itinerary);
                    state.expenses.extend(detail.expenses);
                    state.recommendations.extend(detail.recommendations);
                    state.notes.extend(detail.notes);
                }
                Err(err) => {
                    warn!(trip_id = %trip_id, error = %err, "trip detail fetch failed, loading without children");
                }
            }
        }
        Ok(state)
    }
}

#[async_trait]
impl RemoteSink for ApiClient {
    async fn push_trip(&self, payload: SyncPayload) -> Result<(), AppError> {
        let url = self.endpoint("/sync")?;
        let response = self.authed(self.http.post(url)).json(&payload).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_trip(&self, trip_id: &str) -> Result<(), AppError> {
        let url = self.endpoint(&format!("/trips/{trip_id}"))?;
        let response = self.authed(self.http.delete(url)).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}
