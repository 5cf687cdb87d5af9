//! # quill-api Handlers
//!
//! Thin adapters between actix-web requests and the procedure contracts:
//! resolve the caller, hand off to the procedure, shape the JSON reply.

use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use quill_core::traits::{BlogStore, IdentityProvider, UserStore};
use serde_json::json;

use crate::error::ApiError;
use crate::procedures::{self, CreatePostInput, ListInput, SearchInput, UpdatePostInput};
use crate::session;

/// State shared across all actix-web workers. Both storage ports usually
/// point at the same store value.
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub posts: Arc<dyn BlogStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

type ApiResult = Result<HttpResponse, ApiError>;

pub async fn list(
    data: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ListInput>,
) -> ApiResult {
    let caller = session::resolve_caller(&req, &data).await;
    let posts = procedures::list_posts(data.posts.as_ref(), &caller, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn get_by_slug(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> ApiResult {
    let caller = session::resolve_caller(&req, &data).await;
    let post = procedures::get_by_slug(data.posts.as_ref(), &caller, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn search(
    data: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<SearchInput>,
) -> ApiResult {
    let caller = session::resolve_caller(&req, &data).await;
    let posts = procedures::search(data.posts.as_ref(), &caller, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn by_category(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> ApiResult {
    let caller = session::resolve_caller(&req, &data).await;
    let posts =
        procedures::by_category(data.posts.as_ref(), &caller, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn by_series(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> ApiResult {
    let caller = session::resolve_caller(&req, &data).await;
    let posts = procedures::by_series(data.posts.as_ref(), &caller, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn categories(data: web::Data<AppState>) -> ApiResult {
    let names = procedures::categories(data.posts.as_ref()).await?;
    Ok(HttpResponse::Ok().json(names))
}

pub async fn series(data: web::Data<AppState>) -> ApiResult {
    let names = procedures::series(data.posts.as_ref()).await?;
    Ok(HttpResponse::Ok().json(names))
}

pub async fn create(
    data: web::Data<AppState>,
    req: HttpRequest,
    input: web::Json<CreatePostInput>,
) -> ApiResult {
    let caller = session::resolve_caller(&req, &data).await;
    let id = procedures::create_post(data.posts.as_ref(), &caller, input.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "id": id })))
}

pub async fn update(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    input: web::Json<UpdatePostInput>,
) -> ApiResult {
    let caller = session::resolve_caller(&req, &data).await;
    procedures::update_post(
        data.posts.as_ref(),
        &caller,
        path.into_inner(),
        input.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

pub async fn delete(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> ApiResult {
    let caller = session::resolve_caller(&req, &data).await;
    procedures::delete_post(data.posts.as_ref(), &caller, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

pub async fn get_by_id(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> ApiResult {
    let caller = session::resolve_caller(&req, &data).await;
    let post = procedures::get_by_id(data.posts.as_ref(), &caller, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// auth.me — the resolved identity, or JSON null for anonymous callers.
pub async fn me(data: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let caller = session::resolve_caller(&req, &data).await;
    HttpResponse::Ok().json(caller.user())
}

/// auth.logout — clears the session cookie; always succeeds.
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(session::expired_session_cookie())
        .json(json!({ "success": true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use quill_auth_hmac::HmacIdentityProvider;
    use quill_core::models::UserUpsert;
    use quill_core::traits::{IdentityProvider as _, UserStore as _};
    use quill_db_sqlite::SqliteStore;

    const OWNER: &str = "owner-open-id";

    /// In-memory state seeded with the owner identity (admin via the owner
    /// rule), plus a valid session token for it.
    async fn seeded_state() -> (web::Data<AppState>, String) {
        let store = Arc::new(SqliteStore::new(
            Some("sqlite::memory:".into()),
            Some(OWNER.into()),
        ));
        store.upsert_user(UserUpsert::new(OWNER)).await.unwrap();

        let identity = Arc::new(HmacIdentityProvider::new("test-secret"));
        let token = identity.issue(OWNER);

        let state = web::Data::new(AppState {
            users: store.clone(),
            posts: store,
            identity,
        });
        (state, token)
    }

    #[actix_web::test]
    async fn me_resolves_the_session_cookie() {
        let (state, token) = seeded_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state)
                .configure(crate::configure_routes),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/auth/me").to_request(),
        )
        .await;
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body.is_null(), "anonymous caller resolves to null");

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .cookie(Cookie::new(session::SESSION_COOKIE, token))
            .to_request();
        let body: serde_json::Value =
            test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["openId"], OWNER);
        assert_eq!(body["role"], "admin");
    }

    #[actix_web::test]
    async fn create_over_http_requires_an_admin_session() {
        let (state, token) = seeded_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state)
                .configure(crate::configure_routes),
        )
        .await;

        let payload = json!({
            "title": "Hello",
            "slug": "hello",
            "content": "first post",
            "published": 1,
        });

        let anon = test::TestRequest::post()
            .uri("/api/blog/posts")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, anon).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["message"], "Admin access required");

        let admin = test::TestRequest::post()
            .uri("/api/blog/posts")
            .cookie(Cookie::new(session::SESSION_COOKIE, token))
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, admin).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["id"].is_i64());

        // The freshly created post is publicly visible by slug.
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/blog/posts/hello")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let post: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(post["slug"], "hello");
    }

    #[actix_web::test]
    async fn logout_expires_the_session_cookie() {
        let (state, _) = seeded_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state)
                .configure(crate::configure_routes),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post().uri("/api/auth/logout").to_request(),
        )
        .await;
        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .expect("logout must set a cookie")
            .to_str()
            .unwrap()
            .to_owned();
        assert!(set_cookie.starts_with(&format!("{}=", session::SESSION_COOKIE)));
        assert!(set_cookie.contains("Max-Age"));

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
    }

    #[actix_web::test]
    async fn tampered_session_falls_back_to_anonymous() {
        let (state, token) = seeded_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state)
                .configure(crate::configure_routes),
        )
        .await;

        let forged = format!("{token}x");
        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .cookie(Cookie::new(session::SESSION_COOKIE, forged))
            .to_request();
        let body: serde_json::Value =
            test::read_body_json(test::call_service(&app, req).await).await;
        assert!(body.is_null());
    }
}
