//! # 원격 동기화 어댑터 (Remote Sync Adapter)
//!
//! 초안과 원격 여행 관리 API 사이의 요청/응답 변환을 담당합니다.
//!
//! 모든 호출은:
//! 1. 현재 식별자를 `X-User-Email` 헤더(계약에 따라 본문/쿼리에도)로 붙이고
//! 2. `envelope::unwrap_provider_response`로 응답 봉투를 풀고
//! 3. 실패하면 상태 코드와 서버 메시지를 담은 `SyncError`를 돌려줍니다.
//!
//! 재시도나 백오프는 없습니다. 호출 한 번에 시도 한 번입니다.

use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::SyncError,
    models::{
        PreferencesPayload, ProfilePayload, RemoteActivity, RemoteTrip, RouteDescriptor,
        SavePayload, SaveReceipt, TripListing,
    },
    services::envelope::unwrap_provider_response,
};

/// 원격 API가 식별자를 읽는 헤더
pub const IDENTITY_HEADER: &str = "X-User-Email";

/// 원격 여행 관리 API 클라이언트
///
/// `reqwest::Client`는 내부적으로 Arc로 커넥션 풀을 공유하므로
/// clone해도 같은 풀을 씁니다.
#[derive(Clone)]
pub struct TripApi {
    client: reqwest::Client,
    base_url: String,
}

impl TripApi {
    /// 요청 제한 시간을 지정해 클라이언트를 만듭니다.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// 이미 있는 `reqwest::Client`를 재사용합니다.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 요청을 보내고 (HTTP 상태, 안쪽 객체)를 돌려줍니다.
    async fn send(
        &self,
        request: RequestBuilder,
        member: Option<&str>,
    ) -> Result<(u16, Value), SyncError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let raw = response.bytes().await?;
        let value = unwrap_provider_response(status, &raw, member)?;
        Ok((status, value))
    }

    fn decode<T: DeserializeOwned>(status: u16, value: Value, what: &str) -> Result<T, SyncError> {
        serde_json::from_value(value).map_err(|e| SyncError::RemoteCallFailed {
            status,
            message: format!("Unexpected {} format: {}", what, e),
        })
    }

    /// `GET /trips/{id}`: 여행 기본 정보
    ///
    /// 응답에 여행 객체가 없으면 실패로 봅니다.
    /// `{"message": "Trip not found"}`처럼 200이지만 id도 출발 도시도 없는 응답도 마찬가지입니다.
    pub async fn fetch_trip(&self, trip_id: &str, identity: &str) -> Result<RemoteTrip, SyncError> {
        let request = self
            .client
            .get(self.url(&format!("/trips/{}", trip_id)))
            .header(IDENTITY_HEADER, identity);
        let (status, value) = self.send(request, Some("trip")).await?;

        let no_trip = || SyncError::RemoteCallFailed {
            status,
            message: "The trip service returned no trip".to_string(),
        };
        if !value.is_object() {
            return Err(no_trip());
        }

        let trip: RemoteTrip = Self::decode(status, value, "trip")?;
        if !trip.is_usable() {
            return Err(no_trip());
        }
        tracing::debug!(trip_id, "Fetched trip");
        Ok(trip)
    }

    /// `GET /trips/{id}/itinerary`: 일자별 활동 목록
    pub async fn fetch_itinerary(
        &self,
        trip_id: &str,
        identity: &str,
    ) -> Result<Vec<RemoteActivity>, SyncError> {
        let request = self
            .client
            .get(self.url(&format!("/trips/{}/itinerary", trip_id)))
            .header(IDENTITY_HEADER, identity);
        let (status, value) = self.send(request, Some("activities")).await?;
        Self::decode(status, value, "itinerary")
    }

    /// `GET /trips?user_id=`: 사용자의 여행 목록
    pub async fn list_trips(&self, identity: &str) -> Result<Vec<TripListing>, SyncError> {
        let request = self
            .client
            .get(self.url("/trips"))
            .query(&[("user_id", identity)])
            .header(IDENTITY_HEADER, identity);
        let (status, value) = self.send(request, Some("trips")).await?;

        // 여행이 하나도 없으면 `{}`가 오기도 합니다.
        if value.as_object().is_some_and(|fields| fields.is_empty()) {
            return Ok(Vec::new());
        }
        Self::decode(status, value, "trip list")
    }

    /// 초안을 저장합니다.
    ///
    /// - 이미 저장된 여행: `PUT /trips/{id}` + `{ trip, activities }`
    /// - 새 여행: `POST /trips` + `{ trip, locations, everyday, everyday_locations }`
    pub async fn save_trip(
        &self,
        payload: &SavePayload,
        identity: &str,
    ) -> Result<SaveReceipt, SyncError> {
        let (request, known_id) = match payload {
            SavePayload::Update { trip_id, body } => (
                self.client
                    .put(self.url(&format!("/trips/{}", trip_id)))
                    .json(body),
                Some(trip_id.clone()),
            ),
            SavePayload::Create(body) => (self.client.post(self.url("/trips")).json(body), None),
        };
        let (status, value) = self
            .send(request.header(IDENTITY_HEADER, identity), None)
            .await?;

        let returned_id = ["tripId", "trip_id", "id"]
            .iter()
            .find_map(|key| value.get(*key))
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        let trip_id = returned_id.or(known_id).ok_or_else(|| SyncError::RemoteCallFailed {
            status,
            message: "The trip service did not return a trip id".to_string(),
        })?;

        tracing::info!(%trip_id, title = %payload.trip().title, "Trip saved");
        Ok(SaveReceipt {
            trip_id,
            message: value.get("message").and_then(|m| m.as_str()).map(str::to_string),
        })
    }

    /// `PUT /user/preferences`
    pub async fn update_preferences(
        &self,
        payload: &PreferencesPayload,
        identity: &str,
    ) -> Result<Value, SyncError> {
        let request = self
            .client
            .put(self.url("/user/preferences"))
            .header(IDENTITY_HEADER, identity)
            .json(payload);
        let (_, value) = self.send(request, Some("updatedFields")).await?;
        Ok(value)
    }

    /// `PUT /user/profile`
    pub async fn update_profile(
        &self,
        payload: &ProfilePayload,
        identity: &str,
    ) -> Result<Value, SyncError> {
        let request = self
            .client
            .put(self.url("/user/profile"))
            .header(IDENTITY_HEADER, identity)
            .json(payload);
        let (_, value) = self.send(request, Some("updatedFields")).await?;
        Ok(value)
    }

    /// `GET /routes?trip_id=`: 일자별 경로 (지도 표시용)
    pub async fn fetch_routes(
        &self,
        trip_id: &str,
        identity: &str,
    ) -> Result<Vec<RouteDescriptor>, SyncError> {
        let request = self
            .client
            .get(self.url("/routes"))
            .query(&[("trip_id", trip_id)])
            .header(IDENTITY_HEADER, identity);
        let (status, value) = self.send(request, Some("results")).await?;
        let mut routes: Vec<RouteDescriptor> = Self::decode(status, value, "route list")?;
        routes.sort_by_key(|r| r.day_number);
        Ok(routes)
    }
}
