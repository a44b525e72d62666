use anyhow::Result;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use tower::ServiceExt;

use topics_server::api::{AppState, build_api_router};
use topics_server::auth::User;
use topics_server::config::Config;
use topics_server::form::FormState;
use topics_server::test_helpers;
use topics_server::topic::TopicRecord;

struct ApiTestContext {
    router: Router,
    state: AppState,
}

async fn setup() -> Result<ApiTestContext> {
    let pool = test_helpers::create_test_pool().await?;
    let state = AppState::new(pool, &Config::default());
    let router = build_api_router(state.clone());
    Ok(ApiTestContext { router, state })
}

impl ApiTestContext {
    async fn signed_in_session(&self) -> Result<String> {
        let session = self
            .state
            .sessions
            .create_session(Some(User::local("alice")))
            .await?;
        Ok(session.id)
    }

    async fn send(&self, request: Request<Body>) -> Result<Response> {
        Ok(self.router.clone().oneshot(request).await?)
    }

    async fn submit(&self, body: &str, session: Option<&str>) -> Result<Response> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/topics")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(session) = session {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {session}"));
        }
        self.send(builder.body(Body::from(body.to_string()))?).await
    }

    async fn get(&self, uri: &str) -> Result<Response> {
        self.send(Request::builder().uri(uri).body(Body::empty())?)
            .await
    }
}

async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

const VALID_FORM: &str = "name=rust-lang&description=a+sufficiently+long+description";

#[tokio::test]
async fn invalid_submission_returns_field_errors() -> Result<()> {
    let ctx = setup().await?;
    let session = ctx.signed_in_session().await?;

    let response = ctx
        .submit("name=My+Topic&description=a+long+enough+description", Some(&session))
        .await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let state: FormState = json_body(response).await?;
    assert_eq!(
        state.errors.get("name"),
        Some(&["Must be lowercase letters or dashes without spaces.".to_string()][..])
    );
    assert!(!state.errors.contains("description"));

    let topics: Vec<TopicRecord> = json_body(ctx.get("/").await?).await?;
    assert!(topics.is_empty());
    Ok(())
}

#[tokio::test]
async fn signed_out_submission_is_rejected() -> Result<()> {
    let ctx = setup().await?;

    let response = ctx.submit(VALID_FORM, None).await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = json_body(response).await?;
    assert_eq!(
        body,
        serde_json::json!({ "errors": { "_form": ["You must be signed in to do this."] } })
    );
    Ok(())
}

#[tokio::test]
async fn created_topic_redirects_and_refreshes_listing() -> Result<()> {
    let ctx = setup().await?;
    let session = ctx.signed_in_session().await?;

    // Warm the listing cache before the mutation.
    let before: Vec<TopicRecord> = json_body(ctx.get("/").await?).await?;
    assert!(before.is_empty());
    assert!(ctx.state.cache.get("/").is_some());

    let response = ctx.submit(VALID_FORM, Some(&session)).await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/topics/rust-lang")
    );
    assert!(ctx.state.cache.get("/").is_none());

    let after: Vec<TopicRecord> = json_body(ctx.get("/").await?).await?;
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].slug, "rust-lang");

    let shown: TopicRecord = json_body(ctx.get("/topics/rust-lang").await?).await?;
    assert_eq!(shown.description, "a sufficiently long description");
    Ok(())
}

#[tokio::test]
async fn duplicate_slug_reports_conflict() -> Result<()> {
    let ctx = setup().await?;
    let session = ctx.signed_in_session().await?;

    let first = ctx.submit(VALID_FORM, Some(&session)).await?;
    assert_eq!(first.status(), StatusCode::SEE_OTHER);

    let second = ctx.submit(VALID_FORM, Some(&session)).await?;
    assert_eq!(second.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let state: FormState = json_body(second).await?;
    assert_eq!(
        state.errors.get("_form"),
        Some(&["a topic with slug `rust-lang` already exists".to_string()][..])
    );
    Ok(())
}

#[tokio::test]
async fn session_cookie_authenticates() -> Result<()> {
    let ctx = setup().await?;
    let session = ctx.signed_in_session().await?;

    let request = Request::builder()
        .method("POST")
        .uri("/topics")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, format!("topics_session={session}"))
        .body(Body::from(VALID_FORM))?;
    let response = ctx.send(request).await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    Ok(())
}

#[tokio::test]
async fn logout_revokes_session() -> Result<()> {
    let ctx = setup().await?;
    let session = ctx.signed_in_session().await?;

    let request = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header(header::AUTHORIZATION, format!("Bearer {session}"))
        .body(Body::empty())?;
    let response = ctx.send(request).await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = ctx.submit(VALID_FORM, Some(&session)).await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn unknown_topic_is_not_found() -> Result<()> {
    let ctx = setup().await?;

    let response = ctx.get("/topics/missing").await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn healthz_reports_ok() -> Result<()> {
    let ctx = setup().await?;

    let response = ctx.get("/healthz").await?;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], b"ok");
    Ok(())
}

#[tokio::test]
async fn repeated_field_uses_first_value() -> Result<()> {
    let ctx = setup().await?;
    let session = ctx.signed_in_session().await?;

    let response = ctx
        .submit(
            "name=rust-lang&name=Not+A+Slug&description=a+sufficiently+long+description",
            Some(&session),
        )
        .await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/topics/rust-lang")
    );
    Ok(())
}

#[tokio::test]
async fn expired_session_is_rejected() -> Result<()> {
    let ctx = setup().await?;
    sqlx::query("INSERT INTO sessions (id, user_did, user_handle, created_at) VALUES ('old', 'did:local:old', 'old', 0)")
        .execute(ctx.state.topics.pool())
        .await?;

    let response = ctx.submit(VALID_FORM, Some("old")).await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let state: FormState = json_body(response).await?;
    assert_eq!(
        state.errors.get("_form"),
        Some(&["You must be signed in to do this.".to_string()][..])
    );
    Ok(())
}

#[tokio::test]
async fn session_lookup_failure_is_treated_as_signed_out() -> Result<()> {
    let ctx = setup().await?;
    let session = ctx.signed_in_session().await?;
    ctx.state.topics.pool().close().await;

    let response = ctx.submit(VALID_FORM, Some(&session)).await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let state: FormState = json_body(response).await?;
    assert_eq!(
        state.errors.get("_form"),
        Some(&["You must be signed in to do this.".to_string()][..])
    );
    Ok(())
}

#[tokio::test]
async fn listing_rendered_before_a_create_is_not_cached() -> Result<()> {
    let ctx = setup().await?;
    let session = ctx.signed_in_session().await?;

    // A listing read that started before the create finishes after it.
    let generation = ctx.state.cache.generation();
    let response = ctx.submit(VALID_FORM, Some(&session)).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(!ctx.state.cache.insert_if_current("/", "[]".to_string(), generation));

    let topics: Vec<TopicRecord> = json_body(ctx.get("/").await?).await?;
    assert_eq!(topics.len(), 1);
    Ok(())
}
