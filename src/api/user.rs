use crate::api::doc::USER_TAG;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{Json, Path, Query};
use crate::api::middleware::Device;
use crate::api::{ResourceParams, UnpagedResponse};
use crate::app::AppState;
use crate::auth::{Client, password};
use crate::config::RegexType;
use crate::model::enums::{ResourceProperty, ResourceType};
use crate::model::user::{NewUser, User};
use crate::resource::post::{PostInfo, VoteContext};
use crate::resource::user::{UserInfo, Visibility};
use crate::schema::{post, user};
use crate::string::SmallString;
use crate::{api, resource};
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use axum::extract::{Extension, State};
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create))
        .routes(routes!(me))
        .routes(routes!(get))
        .routes(routes!(list_posts))
}

/// Request body for creating an account.
#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct UserCreateBody {
    /// Must match `username` regex from server's configuration.
    name: String,
    email: String,
    /// Must match `password` regex from server's configuration.
    password: String,
    /// Optional confirmation; the request fails if it differs from
    /// `password`.
    password_confirmation: Option<String>,
}

/// Creates a new account.
///
/// Usernames and emails are unique, case-insensitively. The password is
/// hashed with Argon2id before it is stored.
#[utoipa::path(
    post,
    path = "/users",
    tag = USER_TAG,
    params(ResourceParams),
    request_body = UserCreateBody,
    responses(
        (status = 200, body = UserInfo),
        (status = 400, description = "Username, email, or password is invalid or missing"),
        (status = 409, description = "Username or email is already taken"),
    ),
)]
async fn create(
    State(state): State<AppState>,
    Query(params): Query<ResourceParams>,
    Json(body): Json<UserCreateBody>,
) -> ApiResult<Json<UserInfo>> {
    api::verify_matches_regex(&state.config, &body.name, RegexType::Username)?;
    api::verify_matches_regex(&state.config, &body.email, RegexType::Email)?;
    api::verify_matches_regex(&state.config, &body.password, RegexType::Password)?;
    if let Some(confirmation) = &body.password_confirmation
        && *confirmation != body.password
    {
        return Err(ApiError::PasswordsDoNotMatch);
    }
    let fields = resource::user::Field::create_table(params.fields()).map_err(Box::from)?;

    let salt = SaltString::generate(&mut OsRng);
    let hash = password::hash_password(&state.config, &body.password, &salt)?;
    let new_user = NewUser {
        username: &body.name,
        email: &body.email,
        password_hash: &hash,
        password_salt: salt.as_str(),
    };

    state.get_connection()?.transaction(|conn| {
        let inserted = diesel::insert_into(user::table)
            .values(new_user)
            .returning(User::as_returning())
            .get_result(conn);
        let user = map_account_unique_violation(inserted)?;
        Ok(Json(UserInfo::new(user, &fields, Visibility::Full)))
    })
}

/// Retrieves the account belonging to the presented credentials.
///
/// This is the login check: wrong credentials yield a 401 before the
/// handler runs.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = USER_TAG,
    params(ResourceParams),
    responses(
        (status = 200, body = UserInfo),
        (status = 401, description = "Not logged in or wrong credentials"),
    ),
)]
async fn me(
    State(state): State<AppState>,
    Extension(client): Extension<Client>,
    Query(params): Query<ResourceParams>,
) -> ApiResult<Json<UserInfo>> {
    let client_id = api::require_login(client)?;
    let fields = resource::user::Field::create_table(params.fields()).map_err(Box::from)?;

    state.get_connection()?.transaction(|conn| {
        let user: User = user::table.find(client_id).select(User::as_select()).first(conn)?;
        Ok(Json(UserInfo::new(user, &fields, Visibility::Full)))
    })
}

/// Retrieves public information about an existing account.
#[utoipa::path(
    get,
    path = "/user/{name}",
    tag = USER_TAG,
    params(
        ("name" = String, Path, description = "Username"),
        ResourceParams,
    ),
    responses(
        (status = 200, body = UserInfo),
        (status = 404, description = "User does not exist"),
    ),
)]
async fn get(
    State(state): State<AppState>,
    Extension(client): Extension<Client>,
    Path(name): Path<SmallString>,
    Query(params): Query<ResourceParams>,
) -> ApiResult<Json<UserInfo>> {
    let fields = resource::user::Field::create_table(params.fields()).map_err(Box::from)?;

    state.get_connection()?.transaction(|conn| {
        let user = User::from_name(conn, &name)?.ok_or(ApiError::NotFound(ResourceType::User))?;
        let visibility = match client.id == Some(user.user_id) {
            true => Visibility::Full,
            false => Visibility::PublicOnly,
        };
        Ok(Json(UserInfo::new(user, &fields, visibility)))
    })
}

/// Lists a user's reviews, newest first.
#[utoipa::path(
    get,
    path = "/user/{name}/posts",
    tag = USER_TAG,
    params(
        ("name" = String, Path, description = "Username"),
        ResourceParams,
    ),
    responses(
        (status = 200, body = UnpagedResponse<PostInfo>),
        (status = 404, description = "User does not exist"),
    ),
)]
async fn list_posts(
    State(state): State<AppState>,
    Extension(device): Extension<Device>,
    Path(name): Path<SmallString>,
    Query(params): Query<ResourceParams>,
) -> ApiResult<Json<UnpagedResponse<PostInfo>>> {
    let fields = resource::post::Field::create_table(params.fields()).map_err(Box::from)?;

    state.get_connection()?.transaction(|conn| {
        let user = User::from_name(conn, &name)?.ok_or(ApiError::NotFound(ResourceType::User))?;
        let posts = post::table
            .filter(post::user_id.eq(user.user_id))
            .order_by(post::created_at.desc())
            .load(conn)?;

        let votes = device.0.map(|device| VoteContext {
            ledger: &state.votes,
            device,
        });
        PostInfo::new_batch(conn, posts, &fields, votes)
            .map(|results| UnpagedResponse { results })
            .map(Json)
            .map_err(ApiError::from)
    })
}

/// Usernames and emails have separate unique constraints, so the violated
/// constraint tells us which one to report as taken.
fn map_account_unique_violation<T>(result: QueryResult<T>) -> ApiResult<T> {
    use diesel::result::DatabaseErrorKind;
    use diesel::result::Error as DieselError;

    match result {
        Ok(value) => Ok(value),
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)) => {
            let property = match info.constraint_name() {
                Some(name) if name.contains("email") => ResourceProperty::UserEmail,
                _ => ResourceProperty::Username,
            };
            Err(ApiError::AlreadyExists(property))
        }
        Err(err) => Err(err.into()),
    }
}
