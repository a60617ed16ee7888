//! HTTP Handlers

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use kernel::id::ProviderAccountId;
use platform::client::{ClientInfo, extract_client_info};
use platform::cookie::{delete_cookie_header, set_cookie_header};

use crate::application::{
    AccessContext, AdminLoginInput, AdminLoginUseCase, AuthorizedPrincipal, ChangePinInput,
    IssuedSession, ModerationOutput, ModerationUseCase, OtpLoginUseCase, ProviderAccountUseCase,
    ProviderLoginInput, ProviderLoginUseCase, SubmitProviderInput, SystemLocksUseCase,
};
use crate::domain::identity::IdentityProvider;
use crate::domain::repository::AccessStore;
use crate::domain::value_object::Portal;
use crate::error::{AccessError, AccessResult, LoginError};
use crate::presentation::dto::{
    AdminLoginRequest, AdminLoginResponse, AdminView, ChangePinRequest, ModerationResponse,
    OtpLoginRequest, PrincipalResponse, ProviderLoginRequest, ProviderLoginResponse,
    ProviderView, SetStatusRequest, SubmitProviderRequest, SystemLocksResponse,
    UpdateSystemLocksRequest,
};

/// Client IP (proxy headers first) and User-Agent
pub struct Client(pub ClientInfo);

impl<S> FromRequestParts<S> for Client
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let direct_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());
        Ok(Client(extract_client_info(&parts.headers, direct_ip)))
    }
}

fn session_cookie_response<S, I, B>(
    ctx: &AccessContext<S, I>,
    portal: Portal,
    session: &IssuedSession,
    body: B,
) -> Response
where
    B: serde::Serialize,
{
    let cookie = set_cookie_header(&ctx.config.cookie(portal), &session.token);
    (StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(body)).into_response()
}

fn logout_response<S, I>(ctx: &AccessContext<S, I>, portal: Portal) -> Response {
    let cookie = delete_cookie_header(&ctx.config.cookie(portal));
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]).into_response()
}

fn parse_provider_id(raw: &str) -> AccessResult<ProviderAccountId> {
    ProviderAccountId::parse(raw)
        .map_err(|_| AccessError::InvalidInput("provider id must be a UUID".to_string()))
}

// ============================================================================
// Provider Submission
// ============================================================================

/// POST /api/providers
pub async fn submit_provider<S, I>(
    State(ctx): State<AccessContext<S, I>>,
    Json(req): Json<SubmitProviderRequest>,
) -> AccessResult<impl IntoResponse>
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    let account = ProviderAccountUseCase::new(ctx)
        .submit(SubmitProviderInput {
            phone: req.phone,
            display_name: req.display_name,
            category: req.category,
            area: req.area,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ProviderView::from(&account))))
}

// ============================================================================
// Provider Portal
// ============================================================================

/// POST /api/provider/login
pub async fn provider_login<S, I>(
    State(ctx): State<AccessContext<S, I>>,
    Client(client): Client,
    Json(req): Json<ProviderLoginRequest>,
) -> Result<Response, LoginError>
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    let output = ProviderLoginUseCase::new(ctx.clone())
        .execute(
            ProviderLoginInput {
                phone: req.phone,
                pin: req.pin,
            },
            &client,
        )
        .await?;

    let body = ProviderLoginResponse {
        provider: ProviderView::from(&output.account),
        expires_at: output.session.claims.exp,
    };
    Ok(session_cookie_response(&ctx, Portal::Provider, &output.session, body))
}

/// POST /api/provider/otp-login
pub async fn provider_otp_login<S, I>(
    State(ctx): State<AccessContext<S, I>>,
    Client(client): Client,
    Json(req): Json<OtpLoginRequest>,
) -> Result<Response, LoginError>
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    let output = OtpLoginUseCase::new(ctx.clone())
        .execute(&req.id_token, &client)
        .await?;

    let body = ProviderLoginResponse {
        provider: ProviderView::from(&output.account),
        expires_at: output.session.claims.exp,
    };
    Ok(session_cookie_response(&ctx, Portal::Provider, &output.session, body))
}

/// POST /api/provider/logout
pub async fn provider_logout<S, I>(State(ctx): State<AccessContext<S, I>>) -> Response
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    logout_response(&ctx, Portal::Provider)
}

/// GET /api/provider/me
pub async fn provider_me<S, I>(
    State(ctx): State<AccessContext<S, I>>,
    Extension(principal): Extension<AuthorizedPrincipal>,
) -> AccessResult<Json<ProviderView>>
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    let account = ProviderAccountUseCase::new(ctx).me(&principal).await?;
    Ok(Json(ProviderView::from(&account)))
}

/// POST /api/provider/pin
pub async fn change_pin<S, I>(
    State(ctx): State<AccessContext<S, I>>,
    Extension(principal): Extension<AuthorizedPrincipal>,
    Json(req): Json<ChangePinRequest>,
) -> AccessResult<StatusCode>
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    ProviderAccountUseCase::new(ctx)
        .change_pin(
            &principal,
            ChangePinInput {
                current_pin: req.current_pin,
                new_pin: req.new_pin,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Admin Portal
// ============================================================================

/// POST /api/admin/login
pub async fn admin_login<S, I>(
    State(ctx): State<AccessContext<S, I>>,
    Client(client): Client,
    Json(req): Json<AdminLoginRequest>,
) -> Result<Response, LoginError>
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    let output = AdminLoginUseCase::new(ctx.clone())
        .execute(
            AdminLoginInput {
                email: req.email,
                password: req.password,
            },
            &client,
        )
        .await?;

    let body = AdminLoginResponse {
        admin: AdminView::from(&output.admin),
        expires_at: output.session.claims.exp,
    };
    Ok(session_cookie_response(&ctx, Portal::Admin, &output.session, body))
}

/// POST /api/admin/logout
pub async fn admin_logout<S, I>(State(ctx): State<AccessContext<S, I>>) -> Response
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    logout_response(&ctx, Portal::Admin)
}

/// GET /api/admin/me
pub async fn admin_me(
    Extension(principal): Extension<AuthorizedPrincipal>,
) -> Json<PrincipalResponse> {
    Json(principal.into())
}

/// POST /api/admin/providers/{id}/approve
pub async fn approve_provider<S, I>(
    State(ctx): State<AccessContext<S, I>>,
    Extension(admin): Extension<AuthorizedPrincipal>,
    Path(id): Path<String>,
) -> AccessResult<Json<ModerationResponse>>
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    let id = parse_provider_id(&id)?;
    let output = ModerationUseCase::new(ctx).approve(&admin, &id).await?;
    Ok(Json(moderation_response(output)))
}

/// POST /api/admin/providers/{id}/status
pub async fn set_provider_status<S, I>(
    State(ctx): State<AccessContext<S, I>>,
    Extension(admin): Extension<AuthorizedPrincipal>,
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> AccessResult<Json<ModerationResponse>>
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    let id = parse_provider_id(&id)?;
    let output = ModerationUseCase::new(ctx)
        .set_status(&admin, &id, req.status)
        .await?;
    Ok(Json(moderation_response(output)))
}

/// POST /api/admin/providers/{id}/reset-pin
pub async fn reset_provider_pin<S, I>(
    State(ctx): State<AccessContext<S, I>>,
    Extension(admin): Extension<AuthorizedPrincipal>,
    Path(id): Path<String>,
) -> AccessResult<Json<ModerationResponse>>
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    let id = parse_provider_id(&id)?;
    let output = ModerationUseCase::new(ctx).reset_pin(&admin, &id).await?;
    Ok(Json(moderation_response(output)))
}

fn moderation_response(output: ModerationOutput) -> ModerationResponse {
    ModerationResponse {
        provider: ProviderView::from(&output.account),
        pin: output.minted_pin.map(|pin| pin.reveal().to_string()),
    }
}

/// GET /api/admin/system-locks
pub async fn get_system_locks<S, I>(
    State(ctx): State<AccessContext<S, I>>,
) -> AccessResult<Json<SystemLocksResponse>>
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    let flags = SystemLocksUseCase::new(ctx).get().await?;
    Ok(Json(flags.into()))
}

/// PUT /api/admin/system-locks
pub async fn update_system_locks<S, I>(
    State(ctx): State<AccessContext<S, I>>,
    Extension(admin): Extension<AuthorizedPrincipal>,
    Json(req): Json<UpdateSystemLocksRequest>,
) -> AccessResult<Json<SystemLocksResponse>>
where
    S: AccessStore,
    I: IdentityProvider + Send + Sync + 'static,
{
    let flags = SystemLocksUseCase::new(ctx)
        .update(&admin, req.into())
        .await?;
    Ok(Json(flags.into()))
}
