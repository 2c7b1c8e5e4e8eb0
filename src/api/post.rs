use crate::api::doc::POST_TAG;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{Json, JsonOrMultipart, Path, Query};
use crate::api::middleware::Device;
use crate::api::{ResourceParams, UnpagedResponse, error};
use crate::app::AppState;
use crate::auth::Client;
use crate::content::upload;
use crate::model::enums::{Region, ResourceType, VoteAction};
use crate::model::post::{NewPost, Post, encode_image_urls};
use crate::resource::post::{PostInfo, VoteContext};
use crate::schema::{comment, post};
use crate::time::DateTime;
use crate::vote::Counters;
use crate::{api, curate, filesystem, resource};
use axum::extract::{Extension, State};
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list, create))
        .routes(routes!(get, delete))
        .routes(routes!(vote))
        .routes(routes!(most_liked))
        .routes(routes!(top_five))
        .routes(routes!(for_you))
        .routes(routes!(region_feed))
        .routes(routes!(region_most_disliked))
}

diesel::define_sql_function! { fn random() -> diesel::sql_types::Double }

const FOR_YOU_COUNT: i64 = 6;

fn vote_context<'a>(state: &'a AppState, device: Device) -> Option<VoteContext<'a>> {
    device.0.map(|device| VoteContext {
        ledger: &state.votes,
        device,
    })
}

/// Query parameters for browsing posts.
#[derive(Deserialize, IntoParams)]
struct PostListParams {
    /// Case-insensitive substring matched against titles and details.
    query: Option<String>,
    /// Restrict results to a single region.
    region: Option<Region>,
    /// Comma-separated list of fields to include in the response.
    fields: Option<String>,
}

/// Lists reviews, newest first.
///
/// Backs the home/browse view: free-text search over title and detail plus
/// an exact region filter. The full working set is returned; there is no
/// paging.
#[utoipa::path(
    get,
    path = "/posts",
    tag = POST_TAG,
    params(PostListParams),
    responses(
        (status = 200, description = "Matching posts, newest first", body = UnpagedResponse<PostInfo>),
    ),
)]
async fn list(
    State(state): State<AppState>,
    Extension(device): Extension<Device>,
    Query(params): Query<PostListParams>,
) -> ApiResult<Json<UnpagedResponse<PostInfo>>> {
    let fields = resource::post::Field::create_table(params.fields.as_deref()).map_err(Box::from)?;

    state.get_connection()?.transaction(|conn| {
        let mut query = post::table
            .select(Post::as_select())
            .order_by(post::created_at.desc())
            .into_boxed();
        if let Some(region) = params.region {
            query = query.filter(post::post_region.eq(region));
        }
        if let Some(search) = params.query.as_deref().map(str::trim).filter(|search| !search.is_empty()) {
            let pattern = format!("%{search}%");
            query = query.filter(post::post_title.ilike(pattern.clone()).or(post::post_detail.ilike(pattern)));
        }

        let posts = query.load(conn)?;
        PostInfo::new_batch(conn, posts, &fields, vote_context(&state, device))
            .map(|results| UnpagedResponse { results })
            .map(Json)
            .map_err(ApiError::from)
    })
}

/// Retrieves a single review.
///
/// When the request carries an X-Device-Id header, the response includes
/// the device's own vote on the post.
#[utoipa::path(
    get,
    path = "/post/{id}",
    tag = POST_TAG,
    params(
        ("id" = i64, Path, description = "Post id"),
        ResourceParams,
    ),
    responses(
        (status = 200, body = PostInfo),
        (status = 404, description = "Post does not exist"),
    ),
)]
async fn get(
    State(state): State<AppState>,
    Extension(device): Extension<Device>,
    Path(post_id): Path<i64>,
    Query(params): Query<ResourceParams>,
) -> ApiResult<Json<PostInfo>> {
    let fields = resource::post::Field::create_table(params.fields()).map_err(Box::from)?;

    state.get_connection()?.transaction(|conn| {
        let post = post::table
            .find(post_id)
            .select(Post::as_select())
            .first(conn)
            .optional()?
            .ok_or(ApiError::NotFound(ResourceType::Post))?;
        PostInfo::new(conn, post, &fields, vote_context(&state, device))
            .map(Json)
            .map_err(ApiError::from)
    })
}

/// Request body for creating a review.
#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct PostCreateBody {
    title: String,
    detail: String,
    /// Isaan is browse-only and rejected here.
    region: Region,
}

/// Creates a new review, optionally with attached images.
///
/// Without images the body is plain JSON. With images the request is a
/// multipart form: a `metadata` part holding the JSON body plus up to
/// `max_images_per_post` `image` parts. Every image is validated and
/// written to the bucket before the review row is inserted; if any single
/// upload fails the submission is aborted and no review is created.
/// Already-written objects are not cleaned up.
#[utoipa::path(
    post,
    path = "/posts",
    tag = POST_TAG,
    params(ResourceParams),
    request_body = PostCreateBody,
    responses(
        (status = 200, body = PostInfo),
        (status = 400, description = "Title, detail, or region is invalid or missing, or an image is oversized"),
        (status = 401, description = "Not logged in"),
        (status = 409, description = "A review with this title and detail already exists"),
    ),
)]
async fn create(
    State(state): State<AppState>,
    Extension(client): Extension<Client>,
    Extension(device): Extension<Device>,
    Query(params): Query<ResourceParams>,
    body: JsonOrMultipart<PostCreateBody>,
) -> ApiResult<Json<PostInfo>> {
    let client_id = api::require_login(client)?;
    let fields = resource::post::Field::create_table(params.fields()).map_err(Box::from)?;

    let (metadata, images) = match body {
        JsonOrMultipart::Json(metadata) => (metadata, Vec::new()),
        JsonOrMultipart::Multipart(form) => {
            let extracted = upload::extract(form, &state.config).await?;
            let metadata = extracted.metadata.ok_or(ApiError::MissingMetadata)?;
            (serde_json::from_slice(&metadata)?, extracted.images)
        }
    };

    let title = api::verify_nonempty(&metadata.title, "title")?;
    let detail = api::verify_nonempty(&metadata.detail, "detail")?;
    if !metadata.region.creatable() {
        return Err(ApiError::RegionNotCreatable(metadata.region));
    }
    for image in &images {
        image.verify_decodable()?;
    }

    // Bucket writes run concurrently and are joined before any database
    // write happens; a single failure fails them all.
    let uploaded_at = DateTime::now();
    let uploads = images.iter().enumerate().map(|(index, image)| {
        let key = filesystem::object_key(uploaded_at, index, image.mime_type);
        let state = &state;
        async move {
            filesystem::save_bucket_object(&state.config, &key, &image.data).await?;
            filesystem::public_url(&state.config, &key).map_err(ApiError::from)
        }
    });
    let image_urls: Vec<String> = futures::future::try_join_all(uploads)
        .await?
        .into_iter()
        .map(String::from)
        .collect();

    let new_post = NewPost {
        user_id: client_id,
        post_title: title,
        post_detail: detail,
        post_region: metadata.region,
        post_image: encode_image_urls(&image_urls),
    };

    let mut conn = state.get_connection()?;
    let created = conn.transaction(|conn| {
        let inserted = diesel::insert_into(post::table)
            .values(&new_post)
            .returning(Post::as_returning())
            .get_result(conn);
        error::map_unique_violation(inserted, ApiError::DuplicateContent)
    })?;
    conn.transaction(|conn| {
        PostInfo::new(conn, created, &fields, vote_context(&state, device))
            .map(Json)
            .map_err(ApiError::from)
    })
}

/// Deletes a review together with its comments.
///
/// Only the review's owner may delete it. Dependent comments are removed
/// first in the same transaction to satisfy the foreign key. Bucket objects
/// referenced by the review are left behind.
#[utoipa::path(
    delete,
    path = "/post/{id}",
    tag = POST_TAG,
    params(
        ("id" = i64, Path, description = "Post id"),
    ),
    responses(
        (status = 200, body = ()),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Not the review's owner"),
        (status = 404, description = "Post does not exist"),
    ),
)]
async fn delete(
    State(state): State<AppState>,
    Extension(client): Extension<Client>,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<()>> {
    let client_id = api::require_login(client)?;

    state.get_connection()?.transaction(|conn| {
        let owner: i64 = post::table
            .find(post_id)
            .select(post::user_id)
            .first(conn)
            .optional()?
            .ok_or(ApiError::NotFound(ResourceType::Post))?;
        if owner != client_id {
            return Err(ApiError::InsufficientPrivileges);
        }

        // Comments must go before their post
        diesel::delete(comment::table.filter(comment::post_id.eq(post_id))).execute(conn)?;
        diesel::delete(post::table.find(post_id)).execute(conn)?;
        Ok(Json(()))
    })
}

/// Request body for toggling a vote.
#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
struct VoteBody {
    action: VoteAction,
}

/// Toggles the device's like or dislike on a review.
///
/// Requires an X-Device-Id header. Repeating an action withdraws it;
/// switching actions moves the vote. The device's vote state is recorded in
/// the ledger before the counters are persisted, and rolled back to its
/// exact prior value if persisting fails. A vote already in flight for the
/// same device and post causes the request to be ignored; the current state
/// is returned unchanged. Counter updates are last-write-wins: concurrent
/// voters on other devices can make totals drift.
#[utoipa::path(
    put,
    path = "/post/{id}/vote",
    tag = POST_TAG,
    params(
        ("id" = i64, Path, description = "Post id"),
        ResourceParams,
    ),
    request_body = VoteBody,
    responses(
        (status = 200, body = PostInfo),
        (status = 400, description = "Missing or malformed X-Device-Id header"),
        (status = 404, description = "Post does not exist"),
    ),
)]
async fn vote(
    State(state): State<AppState>,
    Extension(device): Extension<Device>,
    Path(post_id): Path<i64>,
    Query(params): Query<ResourceParams>,
    Json(body): Json<VoteBody>,
) -> ApiResult<Json<PostInfo>> {
    let device = device.require()?;
    let fields = resource::post::Field::create_table(params.fields()).map_err(Box::from)?;

    let mut conn = state.get_connection()?;
    let (likes, dislikes) = post::table
        .find(post_id)
        .select((post::post_like, post::post_dislike))
        .first(&mut conn)
        .optional()?
        .ok_or(ApiError::NotFound(ResourceType::Post))?;
    let counters = Counters { likes, dislikes };

    // Read-then-write without row locking; drift under concurrent voters is
    // accepted
    state.votes.commit(device, post_id, counters, body.action, |transaction| {
        diesel::update(post::table.find(post_id))
            .set((
                post::post_like.eq(transaction.next_counters.likes),
                post::post_dislike.eq(transaction.next_counters.dislikes),
            ))
            .execute(&mut conn)
            .map(|_| ())
    })?;

    let post = post::table.find(post_id).select(Post::as_select()).first(&mut conn)?;
    conn.transaction(|conn| {
        let votes = VoteContext {
            ledger: &state.votes,
            device,
        };
        PostInfo::new(conn, post, &fields, Some(votes)).map(Json).map_err(ApiError::from)
    })
}

/// The ten most liked reviews.
///
/// Ranking is a stable sort over the full collection, so equally liked
/// posts stay in fetch order.
#[utoipa::path(
    get,
    path = "/posts/most-liked",
    tag = POST_TAG,
    params(ResourceParams),
    responses(
        (status = 200, body = UnpagedResponse<PostInfo>),
    ),
)]
async fn most_liked(
    State(state): State<AppState>,
    Extension(device): Extension<Device>,
    Query(params): Query<ResourceParams>,
) -> ApiResult<Json<UnpagedResponse<PostInfo>>> {
    let fields = resource::post::Field::create_table(params.fields()).map_err(Box::from)?;

    state.get_connection()?.transaction(|conn| {
        let posts: Vec<Post> = post::table
            .select(Post::as_select())
            .order_by(post::post_id.asc())
            .load(conn)?;
        let ranked: Vec<i64> = curate::most_liked(&posts)
            .into_iter()
            .take(curate::MOST_LIKED_COUNT)
            .map(|post| post.post_id)
            .collect();

        PostInfo::new_batch_from_ids(conn, ranked, &fields, vote_context(&state, device))
            .map(|results| UnpagedResponse { results })
            .map(Json)
            .map_err(ApiError::from)
    })
}

/// A curated "Top 5" list.
#[derive(serde::Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct CuratedList {
    key: &'static str,
    title: &'static str,
    subtitle: &'static str,
    results: Vec<PostInfo>,
}

/// The "Top 5" curated lists: the latest review plus keyword-matched
/// category lists.
///
/// A category whose keywords match nothing falls back to an arbitrary five
/// posts so that no list renders empty.
#[utoipa::path(
    get,
    path = "/posts/top5",
    tag = POST_TAG,
    params(ResourceParams),
    responses(
        (status = 200, body = [CuratedList]),
    ),
)]
async fn top_five(
    State(state): State<AppState>,
    Extension(device): Extension<Device>,
    Query(params): Query<ResourceParams>,
) -> ApiResult<Json<Vec<CuratedList>>> {
    let fields = resource::post::Field::create_table(params.fields()).map_err(Box::from)?;

    state.get_connection()?.transaction(|conn| {
        // Fetch ordered by likes so keyword matches and the fallback both
        // favor well-liked posts
        let posts: Vec<Post> = post::table
            .select(Post::as_select())
            .order_by(post::post_like.desc())
            .load(conn)?;

        let mut lists = Vec::with_capacity(curate::CATEGORIES.len() + 1);
        let latest: Vec<i64> = curate::latest(&posts).map(|post| post.post_id).into_iter().collect();
        lists.push((curate::LATEST_KEY, curate::LATEST_TITLE, curate::LATEST_SUBTITLE, latest));
        for category in &curate::CATEGORIES {
            let ids = curate::top_five(&posts, category).into_iter().map(|post| post.post_id).collect();
            lists.push((category.key, category.title, category.subtitle, ids));
        }

        let votes = vote_context(&state, device);
        lists
            .into_iter()
            .map(|(key, title, subtitle, ids)| {
                PostInfo::new_batch_from_ids(conn, ids, &fields, votes).map(|results| CuratedList {
                    key,
                    title,
                    subtitle,
                    results,
                })
            })
            .collect::<QueryResult<Vec<_>>>()
            .map(Json)
            .map_err(ApiError::from)
    })
}

/// Six reviews in random order, for the "For You" tab.
#[utoipa::path(
    get,
    path = "/posts/for-you",
    tag = POST_TAG,
    params(ResourceParams),
    responses(
        (status = 200, body = UnpagedResponse<PostInfo>),
    ),
)]
async fn for_you(
    State(state): State<AppState>,
    Extension(device): Extension<Device>,
    Query(params): Query<ResourceParams>,
) -> ApiResult<Json<UnpagedResponse<PostInfo>>> {
    let fields = resource::post::Field::create_table(params.fields()).map_err(Box::from)?;

    state.get_connection()?.transaction(|conn| {
        let posts = post::table
            .select(Post::as_select())
            .order(random())
            .limit(FOR_YOU_COUNT)
            .load(conn)?;
        PostInfo::new_batch(conn, posts, &fields, vote_context(&state, device))
            .map(|results| UnpagedResponse { results })
            .map(Json)
            .map_err(ApiError::from)
    })
}

/// A region listing.
#[derive(serde::Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RegionFeed {
    /// Region label, or "Unknown Region" for an unrecognized code.
    region: &'static str,
    results: Vec<PostInfo>,
}

const UNKNOWN_REGION: &str = "Unknown Region";

/// Lists the reviews of the region with the given numeric code (1–6).
///
/// An unrecognized code yields an "Unknown Region" feed with no results
/// rather than an error.
#[utoipa::path(
    get,
    path = "/posts/region/{code}",
    tag = POST_TAG,
    params(
        ("code" = i16, Path, description = "Numeric region code"),
        ResourceParams,
    ),
    responses(
        (status = 200, body = RegionFeed),
    ),
)]
async fn region_feed(
    State(state): State<AppState>,
    Extension(device): Extension<Device>,
    Path(code): Path<i16>,
    Query(params): Query<ResourceParams>,
) -> ApiResult<Json<RegionFeed>> {
    let fields = resource::post::Field::create_table(params.fields()).map_err(Box::from)?;
    let Some(region) = Region::from_code(code) else {
        return Ok(Json(RegionFeed {
            region: UNKNOWN_REGION,
            results: Vec::new(),
        }));
    };

    state.get_connection()?.transaction(|conn| {
        let posts: Vec<Post> = post::table
            .select(Post::as_select())
            .order_by(post::created_at.desc())
            .load(conn)?;
        let ids = curate::by_region(&posts, region).into_iter().map(|post| post.post_id).collect();

        PostInfo::new_batch_from_ids(conn, ids, &fields, vote_context(&state, device))
            .map(|results| RegionFeed {
                region: region.label(),
                results,
            })
            .map(Json)
            .map_err(ApiError::from)
    })
}

/// The region's five most disliked reviews.
///
/// Posts nobody disliked are skipped. Unrecognized codes behave like the
/// region listing: an empty "Unknown Region" feed.
#[utoipa::path(
    get,
    path = "/posts/region/{code}/most-disliked",
    tag = POST_TAG,
    params(
        ("code" = i16, Path, description = "Numeric region code"),
        ResourceParams,
    ),
    responses(
        (status = 200, body = RegionFeed),
    ),
)]
async fn region_most_disliked(
    State(state): State<AppState>,
    Extension(device): Extension<Device>,
    Path(code): Path<i16>,
    Query(params): Query<ResourceParams>,
) -> ApiResult<Json<RegionFeed>> {
    let fields = resource::post::Field::create_table(params.fields()).map_err(Box::from)?;
    let Some(region) = Region::from_code(code) else {
        return Ok(Json(RegionFeed {
            region: UNKNOWN_REGION,
            results: Vec::new(),
        }));
    };

    state.get_connection()?.transaction(|conn| {
        let posts: Vec<Post> = post::table.select(Post::as_select()).load(conn)?;
        let ids = curate::most_disliked_in_region(&posts, region)
            .into_iter()
            .map(|post| post.post_id)
            .collect();

        PostInfo::new_batch_from_ids(conn, ids, &fields, vote_context(&state, device))
            .map(|results| RegionFeed {
                region: region.label(),
                results,
            })
            .map(Json)
            .map_err(ApiError::from)
    })
}
