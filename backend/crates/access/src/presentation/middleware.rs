//! Access Middleware
//!
//! Runs the access gate in front of protected routes. An admitted request
//! carries its [`AuthorizedPrincipal`] as a request extension.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use platform::cookie::{delete_cookie_header, extract_cookie};

use crate::application::{AccessContext, AccessGate, Denial, GateDecision};
use crate::domain::repository::AccessStore;
use crate::domain::value_object::Portal;

/// Tells the client where to send the user to sign in again
pub const LOGIN_PATH_HEADER: HeaderName = HeaderName::from_static("x-login-path");

/// Middleware that requires a provider session
pub async fn require_provider_session<S, I>(
    State(ctx): State<AccessContext<S, I>>,
    req: Request<Body>,
    next: Next,
) -> Response
where
    S: AccessStore,
    I: Send + Sync + 'static,
{
    require_session(ctx, Portal::Provider, req, next).await
}

/// Middleware that requires an admin session
pub async fn require_admin_session<S, I>(
    State(ctx): State<AccessContext<S, I>>,
    req: Request<Body>,
    next: Next,
) -> Response
where
    S: AccessStore,
    I: Send + Sync + 'static,
{
    require_session(ctx, Portal::Admin, req, next).await
}

async fn require_session<S, I>(
    ctx: AccessContext<S, I>,
    portal: Portal,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    S: AccessStore,
    I: Send + Sync + 'static,
{
    let cookie = ctx.config.cookie(portal);
    let token = extract_cookie(req.headers(), &cookie.name);

    let decision = match AccessGate::new(&ctx).authorize(token.as_deref(), portal).await {
        Ok(decision) => decision,
        Err(e) => return e.into_response(),
    };

    match decision {
        GateDecision::Admitted(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        GateDecision::Denied(denial) => denial_response(&ctx, portal, denial),
    }
}

fn denial_response<S, I>(ctx: &AccessContext<S, I>, portal: Portal, denial: Denial) -> Response {
    let error = match denial {
        Denial::NoSession | Denial::InvalidSession => {
            AppError::unauthorized("Sign in required").with_action("Please sign in again")
        }
        Denial::NotEligible(reason) => AppError::forbidden(reason.message()),
    };

    let mut response = error.into_response();
    let headers = response.headers_mut();
    if let Ok(path) = HeaderValue::from_str(ctx.config.login_path(portal)) {
        headers.insert(LOGIN_PATH_HEADER, path);
    }
    if denial.clears_cookie() {
        headers.append(header::SET_COOKIE, delete_cookie_header(&ctx.config.cookie(portal)));
    }
    response
}
