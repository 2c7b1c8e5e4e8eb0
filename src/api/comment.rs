use crate::api::doc::COMMENT_TAG;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{Json, Path, Query};
use crate::api::{ResourceParams, UnpagedResponse, error};
use crate::app::AppState;
use crate::auth::Client;
use crate::model::comment::{Comment, NewComment};
use crate::model::enums::ResourceType;
use crate::resource::comment::CommentInfo;
use crate::schema::{comment, post};
use crate::{api, resource};
use axum::extract::{Extension, State};
use diesel::dsl::exists;
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(list)).routes(routes!(create))
}

/// Lists a post's comments, oldest first.
#[utoipa::path(
    get,
    path = "/post/{id}/comments",
    tag = COMMENT_TAG,
    params(
        ("id" = i64, Path, description = "Post id"),
        ResourceParams,
    ),
    responses(
        (status = 200, body = UnpagedResponse<CommentInfo>),
        (status = 404, description = "Post does not exist"),
    ),
)]
async fn list(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Query(params): Query<ResourceParams>,
) -> ApiResult<Json<UnpagedResponse<CommentInfo>>> {
    let fields = resource::comment::Field::create_table(params.fields()).map_err(Box::from)?;

    state.get_connection()?.transaction(|conn| {
        let post_exists: bool = diesel::select(exists(post::table.find(post_id))).get_result(conn)?;
        if !post_exists {
            return Err(ApiError::NotFound(ResourceType::Post));
        }

        let comments = comment::table
            .filter(comment::post_id.eq(post_id))
            .order_by(comment::created_at.asc())
            .load(conn)?;
        CommentInfo::new_batch(conn, comments, &fields)
            .map(|results| UnpagedResponse { results })
            .map(Json)
            .map_err(ApiError::from)
    })
}

/// Request body for creating a comment.
#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct CommentCreateBody {
    post_id: i64,
    text: String,
}

/// Creates a new comment on a post.
///
/// The post's denormalized comment_count is incremented in the same
/// transaction; it is the count views display.
#[utoipa::path(
    post,
    path = "/comments",
    tag = COMMENT_TAG,
    params(ResourceParams),
    request_body = CommentCreateBody,
    responses(
        (status = 200, body = CommentInfo),
        (status = 400, description = "Comment text is missing or empty"),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Post does not exist"),
    ),
)]
async fn create(
    State(state): State<AppState>,
    Extension(client): Extension<Client>,
    Query(params): Query<ResourceParams>,
    Json(body): Json<CommentCreateBody>,
) -> ApiResult<Json<CommentInfo>> {
    let client_id = api::require_login(client)?;
    let text = api::verify_nonempty(&body.text, "comment text")?;
    let fields = resource::comment::Field::create_table(params.fields()).map_err(Box::from)?;

    let new_comment = NewComment {
        post_id: body.post_id,
        user_id: client_id,
        comment_detail: text,
    };

    state.get_connection()?.transaction(|conn| {
        let inserted = diesel::insert_into(comment::table)
            .values(&new_comment)
            .returning(Comment::as_returning())
            .get_result(conn);
        let created = error::map_foreign_key_violation(inserted, ResourceType::Post)?;

        diesel::update(post::table.find(created.post_id))
            .set(post::comment_count.eq(post::comment_count + 1))
            .execute(conn)?;

        CommentInfo::new(conn, created, &fields).map(Json).map_err(ApiError::from)
    })
}
