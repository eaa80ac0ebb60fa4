//! Users API Tests
//!
//! Drives the axum router directly with `tower::ServiceExt::oneshot`,
//! exercising bearer authentication and the HTTP mapping of service errors.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header::AUTHORIZATION, header::CONTENT_TYPE, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use sg_registry::middleware::{AppState, AuthLayer};
use sg_registry::user::{
    users_router, InMemoryUserRepository, User, UserCreation, UserId, UserRepository, UserService,
    UsersState,
};
use sg_registry::RegistryError;

fn app(users: Vec<User>) -> Router {
    let repo = Arc::new(InMemoryUserRepository::seeded(users));
    let user_service = Arc::new(UserService::new(repo as Arc<dyn UserRepository>));

    let app_state = AppState {
        user_service: Arc::clone(&user_service),
    };
    let users_state = UsersState { user_service };

    let (router, _openapi) = users_router(users_state).split_for_parts();
    Router::new()
        .nest("/api/users", router)
        .layer(AuthLayer::new(app_state))
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, bearer: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {bearer}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn requests_without_bearer_are_unauthorized() {
    let app = app(vec![User::new(1, "Denis", 1)]);
    let response = app.oneshot(get("/api/users/me", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_bearer_is_unauthorized() {
    let app = app(vec![User::new(1, "Denis", 1)]);
    let response = app.oneshot(get("/api/users/me", Some("99"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_bearer_is_unauthorized() {
    let app = app(vec![User::new(1, "Denis", 1)]);
    let response = app
        .oneshot(get("/api/users/me", Some("not-a-number")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_the_caller() {
    let app = app(vec![User::new(1, "Denis", 1)]);
    let response = app.oneshot(get("/api/users/me", Some("1"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "id": 1, "name": "Denis", "scope": 1 })
    );
}

#[tokio::test]
async fn get_user_maps_absence_to_404() {
    let app = app(vec![User::new(1, "Denis", 1)]);
    let response = app.oneshot(get("/api/users/42", Some("1"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_user_returns_201_with_assigned_id() {
    let app = app(vec![User::new(1, "Denis", 2)]);
    let response = app
        .oneshot(send_json(
            "POST",
            "/api/users",
            "1",
            json!({ "name": "Zoé", "scope": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await,
        json!({ "id": 2, "name": "Zoé", "scope": 1 })
    );
}

#[tokio::test]
async fn create_user_above_caller_scope_is_403() {
    let app = app(vec![User::new(1, "Denis", 1)]);
    let response = app
        .oneshot(send_json(
            "POST",
            "/api/users",
            "1",
            json!({ "name": "Zoé", "scope": 10 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "FORBIDDEN");
}

#[tokio::test]
async fn create_user_with_taken_name_is_409() {
    let app = app(vec![User::new(1, "Denis", 5), User::new(2, "Zoé", 0)]);
    let response = app
        .oneshot(send_json(
            "POST",
            "/api/users",
            "1",
            json!({ "name": "Zoé", "scope": 0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "CONFLICT");
}

#[tokio::test]
async fn update_user_below_caller_succeeds() {
    let app = app(vec![User::new(1, "Denis", 2), User::new(2, "Zoé", 0)]);
    let response = app
        .oneshot(send_json(
            "PUT",
            "/api/users/2",
            "1",
            json!({ "name": "Zöé", "scope": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "id": 2, "name": "Zöé", "scope": 1 })
    );
}

#[tokio::test]
async fn update_stronger_target_is_403() {
    let app = app(vec![User::new(1, "Denis", 1), User::new(2, "Zoé", 5)]);
    let response = app
        .oneshot(send_json(
            "PUT",
            "/api/users/2",
            "1",
            json!({ "name": "Zoé", "scope": 0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn update_missing_user_is_404() {
    let app = app(vec![User::new(1, "Denis", 1)]);
    let response = app
        .oneshot(send_json(
            "PUT",
            "/api/users/42",
            "1",
            json!({ "name": "X", "scope": 0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_user_returns_the_removed_user() {
    let app = app(vec![User::new(1, "Denis", 2), User::new(7, "Zoé", 2)]);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/users/7")
                .header(AUTHORIZATION, "Bearer 1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "id": 7, "name": "Zoé", "scope": 2 })
    );

    let lookup = app.oneshot(get("/api/users/7", Some("1"))).await.unwrap();
    assert_eq!(lookup.status(), StatusCode::NOT_FOUND);
}

/// Repository whose every operation fails, as a stand-in for a store that is
/// down.
struct UnavailableRepository;

#[async_trait::async_trait]
impl UserRepository for UnavailableRepository {
    async fn fetch_by_id(&self, _id: UserId) -> sg_registry::Result<Option<User>> {
        Err(RegistryError::internal("database unavailable"))
    }

    async fn fetch_by_name(&self, _name: &str) -> sg_registry::Result<Option<User>> {
        Err(RegistryError::internal("database unavailable"))
    }

    async fn save(&self, _id: UserId, _user: &User) -> sg_registry::Result<()> {
        Err(RegistryError::internal("database unavailable"))
    }

    async fn create(&self, _creation: &UserCreation) -> sg_registry::Result<User> {
        Err(RegistryError::internal("database unavailable"))
    }

    async fn remove(&self, _id: UserId) -> sg_registry::Result<User> {
        Err(RegistryError::internal("database unavailable"))
    }

    async fn last_id(&self) -> sg_registry::Result<UserId> {
        Err(RegistryError::internal("database unavailable"))
    }
}

#[tokio::test]
async fn storage_failure_during_auth_is_500_not_401() {
    let repo: Arc<dyn UserRepository> = Arc::new(UnavailableRepository);
    let user_service = Arc::new(UserService::new(repo));

    let app_state = AppState {
        user_service: Arc::clone(&user_service),
    };
    let users_state = UsersState { user_service };

    let (router, _openapi) = users_router(users_state).split_for_parts();
    let app = Router::new()
        .nest("/api/users", router)
        .layer(AuthLayer::new(app_state));

    // A valid-looking bearer with the store down is an infrastructure
    // failure, not a credential problem.
    let response = app.oneshot(get("/api/users/me", Some("1"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "INTERNAL_ERROR");
}

#[tokio::test]
async fn delete_stronger_target_is_403() {
    let app = app(vec![User::new(1, "Denis", 1), User::new(7, "Zoé", 2)]);
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/users/7")
                .header(AUTHORIZATION, "Bearer 1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
