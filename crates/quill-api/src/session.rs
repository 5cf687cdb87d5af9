//! Session resolution: cookie → verified identity id → user row.
//!
//! Resolution never fails a request. Missing, malformed, or stale sessions
//! all resolve to the anonymous caller; the policy layer decides what an
//! anonymous caller may do.

use actix_web::cookie::time::Duration;
use actix_web::cookie::Cookie;
use actix_web::HttpRequest;
use log::warn;
use quill_core::policy::Caller;
use quill_core::traits::UserStore as _;

use crate::handlers::AppState;

pub const SESSION_COOKIE: &str = "quill_session";

pub async fn resolve_caller(req: &HttpRequest, state: &AppState) -> Caller {
    let Some(cookie) = req.cookie(SESSION_COOKIE) else {
        return Caller::anonymous();
    };
    let Some(open_id) = state.identity.verify(cookie.value()) else {
        return Caller::anonymous();
    };
    match state.users.get_user_by_open_id(&open_id).await {
        Ok(Some(user)) => Caller::authenticated(user),
        Ok(None) => Caller::anonymous(),
        Err(err) => {
            warn!("failed to resolve session user: {err}");
            Caller::anonymous()
        }
    }
}

/// Cookie instructing the browser to drop the session immediately.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .max_age(Duration::seconds(-1))
        .finish()
}
