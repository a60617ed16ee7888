//! Access Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::application::AccessContext;
use crate::domain::identity::IdentityProvider;
use crate::domain::repository::AccessStore;
use crate::presentation::handlers;
use crate::presentation::middleware::{require_admin_session, require_provider_session};

/// Every provider and admin route, with full `/api/...` paths
pub fn access_router<S, I>(ctx: AccessContext<S, I>) -> Router
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    let provider_gated = Router::new()
        .route("/api/provider/me", get(handlers::provider_me::<S, I>))
        .route("/api/provider/pin", post(handlers::change_pin::<S, I>))
        .route_layer(middleware::from_fn_with_state(
            ctx.clone(),
            require_provider_session::<S, I>,
        ));

    let admin_gated = Router::new()
        .route("/api/admin/me", get(handlers::admin_me))
        .route(
            "/api/admin/providers/{id}/approve",
            post(handlers::approve_provider::<S, I>),
        )
        .route(
            "/api/admin/providers/{id}/status",
            post(handlers::set_provider_status::<S, I>),
        )
        .route(
            "/api/admin/providers/{id}/reset-pin",
            post(handlers::reset_provider_pin::<S, I>),
        )
        .route(
            "/api/admin/system-locks",
            get(handlers::get_system_locks::<S, I>).put(handlers::update_system_locks::<S, I>),
        )
        .route_layer(middleware::from_fn_with_state(
            ctx.clone(),
            require_admin_session::<S, I>,
        ));

    Router::new()
        .route("/api/providers", post(handlers::submit_provider::<S, I>))
        .route("/api/provider/login", post(handlers::provider_login::<S, I>))
        .route(
            "/api/provider/otp-login",
            post(handlers::provider_otp_login::<S, I>),
        )
        .route("/api/provider/logout", post(handlers::provider_logout::<S, I>))
        .route("/api/admin/login", post(handlers::admin_login::<S, I>))
        .route("/api/admin/logout", post(handlers::admin_logout::<S, I>))
        .merge(provider_gated)
        .merge(admin_gated)
        .with_state(ctx)
}
