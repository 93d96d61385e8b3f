//! HTTP handlers for the Events API
//!
//! Provides 4 REST endpoints for event management:
//! - GET    /events            — list events (paginated, filterable, sortable)
//! - POST   /events            — create event
//! - DELETE /events/:id        — delete event
//! - GET    /events/locations  — distinct locations

use crate::config::PaginationConfig;
use crate::error::Error;
use crate::events::service::EventService;
use crate::events::types::*;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

/// Shared state for event handlers
#[derive(Clone)]
pub struct EventsState {
    pub service: EventService,
    pub pagination: PaginationConfig,
}

/// Create the events router with all REST endpoints
pub fn events_router(state: EventsState) -> Router {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/locations", get(list_locations))
        .route("/events/:id", delete(delete_event))
        .with_state(state)
}

// =============================================================================
// Query parameter types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListEventsQuery {
    page: Option<u32>,
    size: Option<u32>,
    name: Option<String>,
    location: Option<String>,
    /// Field to sort ascending by
    sort_by: Option<String>,
    /// `field[,asc|desc]`, used when `sortBy` is absent
    sort: Option<String>,
}

impl ListEventsQuery {
    fn resolve_sort(&self) -> Result<Option<Sort>, Error> {
        if let Some(field) = self.sort_by.as_deref().filter(|s| !s.is_empty()) {
            let field = field.parse().map_err(|e| Error::field("sortBy", e))?;
            return Ok(Some(Sort::asc(field)));
        }
        match self.sort.as_deref().filter(|s| !s.is_empty()) {
            Some(expr) => Sort::parse(expr)
                .map(Some)
                .map_err(|e| Error::field("sort", e)),
            None => Ok(None),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /events
async fn list_events(
    State(state): State<EventsState>,
    params: Result<Query<ListEventsQuery>, QueryRejection>,
) -> Result<Json<Page<Event>>, Error> {
    let Query(params) = params.map_err(|e| Error::field("query", e.body_text()))?;
    let sort = params.resolve_sort()?;
    let page = params.page.unwrap_or(0);
    let size = params
        .size
        .unwrap_or(state.pagination.default_size)
        .clamp(1, state.pagination.max_size);

    let result = state
        .service
        .get_events(page, size, params.name, params.location, sort)
        .await?;
    Ok(Json(result))
}

/// POST /events
async fn create_event(
    State(state): State<EventsState>,
    body: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiError::bad_request(rejection.body_text())),
            )
                .into_response()
        }
    };

    match state.service.create_event(request).await {
        Ok(event) => (StatusCode::CREATED, Json(event)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// DELETE /events/:id
async fn delete_event(
    State(state): State<EventsState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, Error> {
    let Path(id) = id.map_err(|e| Error::field("id", e.body_text()))?;
    state.service.delete_event(id).await?;
    Ok(Json(MessageResponse {
        message: "Event deleted successfully".to_string(),
    }))
}

/// GET /events/locations
async fn list_locations(State(state): State<EventsState>) -> Result<Json<Vec<String>>, Error> {
    Ok(Json(state.service.list_locations().await?))
}

// =============================================================================
// Error mapping
// =============================================================================

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if !self.is_client_error() {
            tracing::error!("Request failed: {}", self);
        }
        let (status, body) = match self {
            Error::Validation(fields) => (StatusCode::BAD_REQUEST, ApiError::validation(fields)),
            Error::InvalidDate(message) => {
                (StatusCode::BAD_REQUEST, ApiError::invalid_date(message))
            }
            e @ Error::EventNotFound(_) => (StatusCode::NOT_FOUND, ApiError::not_found(e.to_string())),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal("Internal server error"),
            ),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::events::store::{EventStore, SqliteEventStore};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{Days, Local};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn make_app() -> Router {
        let store = Arc::new(SqliteEventStore::in_memory().unwrap());
        events_router(EventsState {
            service: EventService::new(store),
            pagination: PaginationConfig::default(),
        })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn date_in(days: u64) -> String {
        Local::now()
            .date_naive()
            .checked_add_days(Days::new(days))
            .unwrap()
            .to_string()
    }

    async fn post_json(app: &Router, body: serde_json::Value) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/events")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn get(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn delete_req(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn create(app: &Router, name: &str, location: &str, days: u64) -> serde_json::Value {
        let resp = post_json(
            app,
            serde_json::json!({
                "name": name,
                "description": format!("{} description", name),
                "date": date_in(days),
                "location": location
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await
    }

    #[tokio::test]
    async fn test_list_events_empty() {
        let app = make_app();
        let resp = get(&app, "/events").await;

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["content"].as_array().unwrap().len(), 0);
        assert_eq!(json["totalElements"], 0);
        assert_eq!(json["size"], 5);
        assert_eq!(json["number"], 0);
    }

    #[tokio::test]
    async fn test_create_event() {
        let app = make_app();
        let created = create(&app, "RustConf", "Montreal", 1).await;

        assert!(created["id"].as_i64().unwrap() > 0);
        assert_eq!(created["name"], "RustConf");
        assert_eq!(created["date"], date_in(1));
        assert_eq!(created["location"], "Montreal");
    }

    #[tokio::test]
    async fn test_create_event_ignores_client_id() {
        let app = make_app();
        let resp = post_json(
            &app,
            serde_json::json!({
                "id": 999,
                "name": "Named",
                "date": date_in(2),
                "location": "Oslo"
            }),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp).await;
        assert_ne!(json["id"], 999);
        assert!(json["description"].is_null());
    }

    #[tokio::test]
    async fn test_create_event_past_date() {
        let app = make_app();
        let resp = post_json(
            &app,
            serde_json::json!({
                "name": "Too late",
                "date": Local::now().date_naive().to_string(),
                "location": "Nowhere"
            }),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "INVALID_DATE");
        assert_eq!(json["error"]["message"], "Event date must be in the future");

        let list = body_json(get(&app, "/events").await).await;
        assert_eq!(list["totalElements"], 0);
    }

    #[tokio::test]
    async fn test_create_event_missing_fields() {
        let app = make_app();
        let resp = post_json(&app, serde_json::json!({})).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
        let fields: Vec<&str> = json["error"]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, ["name", "date", "location"]);
    }

    #[tokio::test]
    async fn test_create_event_name_too_long() {
        let app = make_app();
        let resp = post_json(
            &app,
            serde_json::json!({
                "name": "n".repeat(101),
                "date": date_in(1),
                "location": "Oslo"
            }),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(
            json["error"]["fields"][0]["message"],
            "Event name must not exceed 100 characters"
        );
    }

    #[tokio::test]
    async fn test_create_event_malformed_json() {
        let app = make_app();
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/events")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"name\": "))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_list_events_pagination_and_default_sort() {
        let app = make_app();
        for (name, days) in [("Third", 3), ("First", 1), ("Fifth", 5), ("Second", 2), ("Fourth", 4)] {
            create(&app, name, "Berlin", days).await;
        }

        let json = body_json(get(&app, "/events?page=0&size=2").await).await;
        let content = json["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["name"], "First");
        assert_eq!(content[1]["name"], "Second");
        assert_eq!(json["totalElements"], 5);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["first"], true);
        assert_eq!(json["last"], false);
    }

    #[tokio::test]
    async fn test_list_events_default_size_is_five() {
        let app = make_app();
        for i in 0..7 {
            create(&app, &format!("Event {}", i), "Berlin", i + 1).await;
        }

        let json = body_json(get(&app, "/events").await).await;
        assert_eq!(json["content"].as_array().unwrap().len(), 5);
        assert_eq!(json["totalPages"], 2);
    }

    #[tokio::test]
    async fn test_list_events_name_filter() {
        let app = make_app();
        create(&app, "Conference", "Paris", 1).await;
        create(&app, "MyConf2024", "Lyon", 2).await;
        create(&app, "Meeting", "Paris", 3).await;

        let json = body_json(get(&app, "/events?name=conf").await).await;
        let names: Vec<&str> = json["content"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Conference", "MyConf2024"]);

        let json = body_json(get(&app, "/events?name=conf&location=PARIS").await).await;
        assert_eq!(json["totalElements"], 1);
        assert_eq!(json["content"][0]["name"], "Conference");
    }

    #[tokio::test]
    async fn test_list_events_sort_by() {
        let app = make_app();
        create(&app, "Beta", "Rome", 1).await;
        create(&app, "Alpha", "Oslo", 2).await;

        let json = body_json(get(&app, "/events?sortBy=name").await).await;
        assert_eq!(json["content"][0]["name"], "Alpha");

        let json = body_json(get(&app, "/events?sort=date,desc").await).await;
        assert_eq!(json["content"][0]["name"], "Alpha");

        let json = body_json(get(&app, "/events?sortBy=location&sort=date,desc").await).await;
        assert_eq!(json["content"][0]["location"], "Oslo");
    }

    #[tokio::test]
    async fn test_list_events_unknown_sort_field() {
        let app = make_app();
        let resp = get(&app, "/events?sortBy=password").await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["fields"][0]["field"], "sortBy");
    }

    #[tokio::test]
    async fn test_list_events_bad_page() {
        let app = make_app();
        let resp = get(&app, "/events?page=-1").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_events_size_clamped() {
        let app = make_app();
        let json = body_json(get(&app, "/events?size=1000").await).await;
        assert_eq!(json["size"], 100);

        let json = body_json(get(&app, "/events?size=0").await).await;
        assert_eq!(json["size"], 1);
    }

    #[tokio::test]
    async fn test_delete_event() {
        let app = make_app();
        let created = create(&app, "Doomed", "Kyiv", 1).await;
        let id = created["id"].as_i64().unwrap();

        let resp = delete_req(&app, &format!("/events/{}", id)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "Event deleted successfully");

        let list = body_json(get(&app, "/events").await).await;
        assert_eq!(list["totalElements"], 0);

        let resp = delete_req(&app, &format!("/events/{}", id)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(
            json["error"]["message"],
            format!("Event with ID {} not found", id)
        );
    }

    #[tokio::test]
    async fn test_delete_event_bad_id() {
        let app = make_app();
        let resp = delete_req(&app, "/events/abc").await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn test_list_locations() {
        let app = make_app();
        create(&app, "A", "Vienna", 1).await;
        create(&app, "B", "Athens", 2).await;
        create(&app, "C", "Vienna", 3).await;

        let resp = get(&app, "/events/locations").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json, serde_json::json!(["Athens", "Vienna"]));
    }

    struct BrokenStore;

    #[async_trait]
    impl EventStore for BrokenStore {
        async fn save(&self, _event: NewEvent) -> Result<Event> {
            Err(Error::Internal("disk on fire".into()))
        }
        async fn exists(&self, _id: i64) -> Result<bool> {
            Err(Error::Database(rusqlite::Error::QueryReturnedNoRows))
        }
        async fn delete_by_id(&self, _id: i64) -> Result<()> {
            Ok(())
        }
        async fn find_filtered(&self, _query: EventQuery) -> Result<Page<Event>> {
            Err(Error::Internal("disk on fire".into()))
        }
        async fn distinct_locations(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal_error() {
        let app = events_router(EventsState {
            service: EventService::new(Arc::new(BrokenStore)),
            pagination: PaginationConfig::default(),
        });

        let resp = get(&app, "/events").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        assert!(!json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("disk on fire"));

        let resp = delete_req(&app, "/events/1").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_status_follows_client_classification() {
        let errors = [
            Error::field("name", "Event name is required"),
            Error::InvalidDate("Event date must be in the future".into()),
            Error::EventNotFound(7),
            Error::Database(rusqlite::Error::QueryReturnedNoRows),
            Error::Migration("bad sql".into()),
            Error::Internal("boom".into()),
        ];
        for err in errors {
            let client = err.is_client_error();
            let status = err.into_response().status();
            assert_eq!(status.is_client_error(), client, "status {}", status);
            assert_eq!(status.is_server_error(), !client, "status {}", status);
        }
    }

    #[tokio::test]
    async fn test_list_events_filter_folds_accents_case() {
        let app = make_app();
        create(&app, "ÉCOLE Festival", "Zürich", 1).await;
        create(&app, "Meeting", "Paris", 2).await;

        // école, ZÜRICH
        let json = body_json(get(&app, "/events?name=%C3%A9cole").await).await;
        assert_eq!(json["totalElements"], 1);
        assert_eq!(json["content"][0]["name"], "ÉCOLE Festival");

        let json = body_json(get(&app, "/events?location=Z%C3%9CRICH").await).await;
        assert_eq!(json["totalElements"], 1);
        assert_eq!(json["content"][0]["location"], "Zürich");
    }
}
