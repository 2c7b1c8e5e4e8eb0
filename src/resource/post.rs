use crate::model::enums::Region;
use crate::model::post::Post;
use crate::resource;
use crate::resource::user::MicroUser;
use crate::schema::{post, user};
use crate::string::SmallString;
use crate::time::DateTime;
use crate::vote::{VoteLedger, VoteState};
use diesel::prelude::*;
use serde::Serialize;
use serde_with::skip_serializing_none;
use std::str::FromStr;
use strum::{EnumString, EnumTable};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Copy, EnumString, EnumTable)]
#[strum(serialize_all = "camelCase")]
pub enum Field {
    Id,
    User,
    Title,
    Detail,
    Region,
    LikeCount,
    DislikeCount,
    CommentCount,
    ImageUrls,
    OwnVote,
    CreationTime,
}

impl Field {
    pub fn create_table(fields_str: Option<&str>) -> Result<FieldTable<bool>, <Self as FromStr>::Err> {
        let Some(fields_str) = fields_str else {
            return Ok(FieldTable::filled(true));
        };
        let mut table = FieldTable::filled(false);
        for field in fields_str.split(',') {
            table[Self::from_str(field)?] = true;
        }
        Ok(table)
    }
}

/// The requesting device's view into the vote ledger. Without it (no
/// X-Device-Id header), `ownVote` is omitted from responses entirely.
#[derive(Clone, Copy)]
pub struct VoteContext<'a> {
    pub ledger: &'a VoteLedger,
    pub device: Uuid,
}

#[skip_serializing_none]
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostInfo {
    pub id: Option<i64>,
    pub user: Option<MicroUser>,
    pub title: Option<String>,
    pub detail: Option<String>,
    pub region: Option<Region>,
    pub like_count: Option<i32>,
    pub dislike_count: Option<i32>,
    pub comment_count: Option<i32>,
    pub image_urls: Option<Vec<String>>,
    pub own_vote: Option<VoteState>,
    #[schema(value_type = Option<String>)]
    pub creation_time: Option<DateTime>,
}

impl PostInfo {
    pub fn new(
        conn: &mut PgConnection,
        post: Post,
        fields: &FieldTable<bool>,
        votes: Option<VoteContext>,
    ) -> QueryResult<Self> {
        let mut infos = Self::new_batch(conn, vec![post], fields, votes)?;
        assert_eq!(infos.len(), 1);
        Ok(infos.pop().expect("Batch contains exactly one element"))
    }

    /// Builds infos for the posts with the given ids, in id-slice order.
    pub fn new_batch_from_ids(
        conn: &mut PgConnection,
        post_ids: Vec<i64>,
        fields: &FieldTable<bool>,
        votes: Option<VoteContext>,
    ) -> QueryResult<Vec<Self>> {
        let unordered_posts = post::table
            .filter(post::post_id.eq_any(&post_ids))
            .select(Post::as_select())
            .load(conn)?;
        let posts = resource::order_transformed_as(unordered_posts, &post_ids, |post| post.post_id);
        Self::new_batch(conn, posts, fields, votes)
    }

    pub fn new_batch(
        conn: &mut PgConnection,
        posts: Vec<Post>,
        fields: &FieldTable<bool>,
        votes: Option<VoteContext>,
    ) -> QueryResult<Vec<Self>> {
        let batch_size = posts.len();

        let mut owners = fields[Field::User]
            .then(|| get_owners(conn, &posts))
            .transpose()?
            .unwrap_or_default();
        resource::check_batch_results(batch_size, owners.len());

        let results = posts
            .into_iter()
            .rev()
            .map(|post| {
                let own_vote = votes
                    .filter(|_| fields[Field::OwnVote])
                    .map(|context| context.ledger.state(context.device, post.post_id));
                let image_urls = fields[Field::ImageUrls].then(|| post.image_urls());
                Self {
                    id: fields[Field::Id].then_some(post.post_id),
                    user: owners.pop(),
                    title: fields[Field::Title].then_some(post.post_title),
                    detail: fields[Field::Detail].then_some(post.post_detail),
                    region: fields[Field::Region].then_some(post.post_region),
                    like_count: fields[Field::LikeCount].then_some(post.post_like),
                    dislike_count: fields[Field::DislikeCount].then_some(post.post_dislike),
                    comment_count: fields[Field::CommentCount].then_some(post.comment_count),
                    image_urls,
                    own_vote,
                    creation_time: fields[Field::CreationTime].then_some(post.created_at),
                }
            })
            .collect::<Vec<_>>();
        Ok(results.into_iter().rev().collect())
    }
}

fn get_owners(conn: &mut PgConnection, posts: &[Post]) -> QueryResult<Vec<MicroUser>> {
    let post_ids: Vec<i64> = posts.iter().map(|post| post.post_id).collect();
    post::table
        .inner_join(user::table)
        .select((post::post_id, user::username))
        .filter(post::post_id.eq_any(&post_ids))
        .load::<(i64, SmallString)>(conn)
        .map(|owners| {
            resource::order_transformed_as(owners, &post_ids, |&(id, _)| id)
                .into_iter()
                .map(|(_, username)| MicroUser::new(username))
                .collect()
        })
}
