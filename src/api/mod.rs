mod comment;
mod doc;
pub mod error;
mod extract;
mod info;
pub mod middleware;
mod post;
mod user;

pub use error::{ApiError, ApiResult};

use crate::app::AppState;
use crate::auth::Client;
use crate::config::{Config, RegexType};
use crate::string::SmallString;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

/// Covers the largest allowed review submission (five images at the upload
/// cap) with headroom for the multipart framing.
const MAX_REQUEST_SIZE: usize = 32 * 1024 * 1024;

pub fn routes(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(doc::ApiDoc::openapi())
        .merge(info::routes())
        .merge(user::routes())
        .merge(post::routes())
        .merge(comment::routes())
        .split_for_parts();
    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(axum::middleware::from_fn_with_state(state.clone(), middleware::auth))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Query parameters accepted by resource-shaped endpoints.
#[derive(Deserialize, IntoParams)]
pub struct ResourceParams {
    /// Comma-separated list of fields to include in the response. All fields
    /// are included when omitted.
    fields: Option<String>,
}

impl ResourceParams {
    fn fields(&self) -> Option<&str> {
        self.fields.as_deref()
    }
}

#[derive(Serialize, ToSchema)]
struct UnpagedResponse<T> {
    results: Vec<T>,
}

/// Returns the logged-in user's id, or fails the request.
fn require_login(client: Client) -> ApiResult<i64> {
    client.id.ok_or(ApiError::NotLoggedIn)
}

fn verify_matches_regex(config: &Config, haystack: &str, regex_type: RegexType) -> ApiResult<()> {
    config
        .regex(regex_type)
        .is_match(haystack)
        .then_some(())
        .ok_or_else(|| ApiError::ExpressionFailsRegex(SmallString::new(haystack), regex_type))
}

/// Trims `value` and rejects the request if nothing remains.
fn verify_nonempty<'a>(value: &'a str, field: &'static str) -> ApiResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}
