use crate::model::comment::Comment;
use crate::resource;
use crate::resource::user::MicroUser;
use crate::schema::{comment, user};
use crate::string::SmallString;
use crate::time::DateTime;
use diesel::prelude::*;
use serde::Serialize;
use serde_with::skip_serializing_none;
use std::str::FromStr;
use strum::{EnumString, EnumTable};
use utoipa::ToSchema;

#[derive(Clone, Copy, EnumString, EnumTable)]
#[strum(serialize_all = "camelCase")]
pub enum Field {
    Id,
    PostId,
    Text,
    User,
    LikeCount,
    DislikeCount,
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

#[skip_serializing_none]
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentInfo {
    pub id: Option<i64>,
    pub post_id: Option<i64>,
    pub text: Option<String>,
    pub user: Option<MicroUser>,
    pub like_count: Option<i32>,
    pub dislike_count: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub creation_time: Option<DateTime>,
}

impl CommentInfo {
    pub fn new(conn: &mut PgConnection, comment: Comment, fields: &FieldTable<bool>) -> QueryResult<Self> {
        let mut infos = Self::new_batch(conn, vec![comment], fields)?;
        assert_eq!(infos.len(), 1);
        Ok(infos.pop().expect("Batch contains exactly one element"))
    }

    pub fn new_batch(conn: &mut PgConnection, comments: Vec<Comment>, fields: &FieldTable<bool>) -> QueryResult<Vec<Self>> {
        let batch_size = comments.len();

        let mut owners = fields[Field::User]
            .then(|| get_owners(conn, &comments))
            .transpose()?
            .unwrap_or_default();
        resource::check_batch_results(batch_size, owners.len());

        let results = comments
            .into_iter()
            .rev()
            .map(|comment| Self {
                id: fields[Field::Id].then_some(comment.comment_id),
                post_id: fields[Field::PostId].then_some(comment.post_id),
                text: fields[Field::Text].then_some(comment.comment_detail),
                user: owners.pop(),
                like_count: fields[Field::LikeCount].then_some(comment.comment_like),
                dislike_count: fields[Field::DislikeCount].then_some(comment.comment_dislike),
                creation_time: fields[Field::CreationTime].then_some(comment.created_at),
            })
            .collect::<Vec<_>>();
        Ok(results.into_iter().rev().collect())
    }
}

fn get_owners(conn: &mut PgConnection, comments: &[Comment]) -> QueryResult<Vec<MicroUser>> {
    let comment_ids: Vec<i64> = comments.iter().map(|comment| comment.comment_id).collect();
    comment::table
        .inner_join(user::table)
        .select((comment::comment_id, user::username))
        .filter(comment::comment_id.eq_any(&comment_ids))
        .load::<(i64, SmallString)>(conn)
        .map(|owners| {
            resource::order_transformed_as(owners, &comment_ids, |&(id, _)| id)
                .into_iter()
                .map(|(_, username)| MicroUser::new(username))
                .collect()
        })
}
