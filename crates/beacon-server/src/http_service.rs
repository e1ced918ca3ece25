//! HTTP routes for the site backend
//!
//! Each route is a thin adapter: extract, gate, call one service, wrap the
//! result in the JSON envelope.

use crate::api_error::{success, ApiError, ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, HeaderValue, Method},
    routing::{delete, get, patch, post},
    Json, Router,
};
use beacon_core::{
    relay_contact_message, AccountManager, BeaconError, ContentService, EmailDispatcher,
    GrantService, LinkedInAnalyticsService, NewsletterService, TrafficAnalytics,
};
use beacon_types::{
    ContactMessage, CreateAdminUserRequest, DateRangeRequest, GrantStatus, GrantStatusUpdate,
    LinkedInAnalyticsRequest, NewGrantApplication, NewSubscriber, NewsletterCampaign, Profile,
    SendEmailRequest, UnsubscribeRequest,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use uuid::Uuid;

/// Services shared by all handlers. Vendor-backed services are optional so
/// the server still boots with a partial credentials file; their routes
/// answer with a configuration error instead.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountManager>,
    pub traffic: Option<Arc<TrafficAnalytics>>,
    pub linkedin: Option<Arc<LinkedInAnalyticsService>>,
    pub mailer: Option<Arc<EmailDispatcher>>,
    pub newsletter: Arc<NewsletterService>,
    pub grants: Arc<GrantService>,
    pub content: Arc<ContentService>,
    pub contact_inbox: Option<String>,
    /// Reference day for analytics windows
    pub today: fn() -> NaiveDate,
}

pub fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Build the application router with CORS applied
pub fn build_router(state: AppState, allowed_origin: Option<&str>) -> anyhow::Result<Router> {
    let origin = match allowed_origin {
        Some(origin) => AllowOrigin::exact(HeaderValue::from_str(origin)?),
        None => AllowOrigin::any(),
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Ok(routes().layer(cors).with_state(state))
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health_check))
        // Admin
        .route("/api/admin-users", get(list_admin_users).post(create_admin_user))
        .route("/api/admin-users/:id", delete(delete_admin_user))
        .route("/api/analytics", post(get_analytics))
        .route("/api/linkedin-analytics", post(get_linkedin_analytics))
        .route("/api/send-email", post(send_email))
        .route("/api/send-newsletter", post(send_newsletter))
        .route("/api/newsletter/subscribers", get(list_subscribers))
        .route("/api/newsletter/subscribers/:id", delete(delete_subscriber))
        .route(
            "/api/grant-applications",
            get(list_grant_applications).post(submit_grant_application),
        )
        .route("/api/grant-applications/:id", patch(update_grant_status))
        // Public
        .route("/api/contact", post(contact))
        .route("/api/newsletter/subscribe", post(subscribe))
        .route("/api/newsletter/unsubscribe", post(unsubscribe))
        .route("/api/notes", get(list_notes))
        .route("/api/notes/:id", get(get_note))
        .route("/api/articles", get(list_articles))
        .route("/api/articles/:id", get(get_article))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

// ---------------------------------------------------------------------------
// Extraction helpers

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ApiError(BeaconError::Validation(e.body_text())))
}

fn path<T>(param: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    param
        .map(|Path(value)| value)
        .map_err(|e| ApiError(BeaconError::Validation(e.body_text())))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    params
        .map(|Query(value)| value)
        .map_err(|e| ApiError(BeaconError::Validation(e.body_text())))
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim_start().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError(BeaconError::Auth("missing bearer token".to_string())))
}

async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<Profile, ApiError> {
    let token = bearer_token(headers)?;
    Ok(state.accounts.require_admin(token).await?)
}

fn configured<'a, T>(service: &'a Option<Arc<T>>, what: &str) -> Result<&'a T, ApiError> {
    service
        .as_deref()
        .ok_or_else(|| ApiError(BeaconError::Config(format!("{} not configured", what))))
}

// ---------------------------------------------------------------------------
// Admin users

async fn list_admin_users(State(state): State<AppState>, headers: HeaderMap) -> ApiResult {
    require_admin(&state, &headers).await?;
    let users = state.accounts.list_users().await?;
    success(json!({ "users": users }))
}

async fn create_admin_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateAdminUserRequest>, JsonRejection>,
) -> ApiResult {
    let caller = require_admin(&state, &headers).await?;
    let request = body(payload)?;
    let user = state.accounts.create_user(&caller, &request).await?;
    success(json!({ "user": user }))
}

async fn delete_admin_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult {
    let caller = require_admin(&state, &headers).await?;
    let id = path(id)?;
    state.accounts.delete_user(&caller, id).await?;
    success(json!({ "deleted": id }))
}

// ---------------------------------------------------------------------------
// Analytics

async fn get_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<DateRangeRequest>, JsonRejection>,
) -> ApiResult {
    require_admin(&state, &headers).await?;
    let request = body(payload)?;
    let traffic = configured(&state.traffic, "Google Analytics")?;
    success(traffic.summarize(&request, (state.today)()).await?)
}

async fn get_linkedin_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<LinkedInAnalyticsRequest>, JsonRejection>,
) -> ApiResult {
    require_admin(&state, &headers).await?;
    let request = body(payload)?;
    let linkedin = configured(&state.linkedin, "Metricool")?;
    success(linkedin.summarize(&request, (state.today)()).await?)
}

// ---------------------------------------------------------------------------
// Email

async fn send_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> ApiResult {
    require_admin(&state, &headers).await?;
    let request = body(payload)?;
    let mailer = configured(&state.mailer, "Gmail")?;
    success(mailer.send(&request).await?)
}

async fn send_newsletter(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<NewsletterCampaign>, JsonRejection>,
) -> ApiResult {
    require_admin(&state, &headers).await?;
    let campaign = body(payload)?;
    let mailer = configured(&state.mailer, "Gmail")?;
    success(state.newsletter.send_campaign(mailer, &campaign).await?)
}

async fn contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactMessage>, JsonRejection>,
) -> ApiResult {
    let form = body(payload)?;
    let mailer = configured(&state.mailer, "Gmail")?;
    let inbox = state
        .contact_inbox
        .as_deref()
        .ok_or_else(|| ApiError(BeaconError::Config("site.contact_inbox not configured".to_string())))?;

    let message_id = relay_contact_message(mailer, inbox, &form).await?;
    success(json!({ "messageId": message_id }))
}

// ---------------------------------------------------------------------------
// Newsletter

async fn subscribe(
    State(state): State<AppState>,
    payload: Result<Json<NewSubscriber>, JsonRejection>,
) -> ApiResult {
    let signup = body(payload)?;
    let subscriber = state.newsletter.subscribe(&signup).await?;
    success(json!({ "subscriber": subscriber }))
}

async fn unsubscribe(
    State(state): State<AppState>,
    payload: Result<Json<UnsubscribeRequest>, JsonRejection>,
) -> ApiResult {
    let request = body(payload)?;
    let subscriber = state.newsletter.unsubscribe(&request.email).await?;
    success(json!({ "subscriber": subscriber }))
}

async fn list_subscribers(State(state): State<AppState>, headers: HeaderMap) -> ApiResult {
    require_admin(&state, &headers).await?;
    let subscribers = state.newsletter.list().await?;
    success(json!({ "subscribers": subscribers }))
}

async fn delete_subscriber(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult {
    require_admin(&state, &headers).await?;
    let id = path(id)?;
    state.newsletter.delete(id).await?;
    success(json!({ "deleted": id }))
}

// ---------------------------------------------------------------------------
// Grant applications

#[derive(Debug, Deserialize)]
struct GrantFilter {
    status: Option<GrantStatus>,
}

async fn submit_grant_application(
    State(state): State<AppState>,
    payload: Result<Json<NewGrantApplication>, JsonRejection>,
) -> ApiResult {
    let application = body(payload)?;
    let stored = state.grants.submit(&application).await?;
    success(json!({ "application": stored }))
}

async fn list_grant_applications(
    State(state): State<AppState>,
    headers: HeaderMap,
    filter: Result<Query<GrantFilter>, QueryRejection>,
) -> ApiResult {
    require_admin(&state, &headers).await?;
    let filter = query(filter)?;
    let applications = state.grants.list(filter.status).await?;
    success(json!({ "applications": applications }))
}

async fn update_grant_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<GrantStatusUpdate>, JsonRejection>,
) -> ApiResult {
    require_admin(&state, &headers).await?;
    let id = path(id)?;
    let update = body(payload)?;
    let application = state.grants.set_status(id, update.status).await?;
    success(json!({ "application": application }))
}

// ---------------------------------------------------------------------------
// Notes and articles

#[derive(Debug, Deserialize)]
struct Paging {
    page: Option<u32>,
    per_page: Option<u32>,
}

async fn list_notes(State(state): State<AppState>) -> ApiResult {
    let notes = state.content.notes().await?;
    success(json!({ "notes": notes }))
}

async fn get_note(State(state): State<AppState>, id: Result<Path<Uuid>, PathRejection>) -> ApiResult {
    let note = state.content.note(path(id)?).await?;
    success(json!({ "note": note }))
}

async fn list_articles(
    State(state): State<AppState>,
    paging: Result<Query<Paging>, QueryRejection>,
) -> ApiResult {
    let paging = query(paging)?;
    let articles = state.content.articles(paging.page, paging.per_page).await?;
    success(json!({ "articles": articles }))
}

async fn get_article(State(state): State<AppState>, id: Result<Path<u64>, PathRejection>) -> ApiResult {
    let article = state.content.article(path(id)?).await?;
    success(json!({ "article": article }))
}
