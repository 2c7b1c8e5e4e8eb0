use crate::model::post::Post;
use crate::model::user::User;
use crate::schema::comment;
use crate::time::DateTime;
use diesel::pg::Pg;
use diesel::prelude::*;

#[derive(Insertable)]
#[diesel(table_name = comment)]
#[diesel(check_for_backend(Pg))]
pub struct NewComment<'a> {
    pub post_id: i64,
    pub user_id: i64,
    pub comment_detail: &'a str,
}

#[derive(Associations, Identifiable, Queryable, Selectable)]
#[diesel(belongs_to(Post), belongs_to(User))]
#[diesel(table_name = comment)]
#[diesel(primary_key(comment_id))]
#[diesel(check_for_backend(Pg))]
pub struct Comment {
    pub comment_id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub comment_detail: String,
    pub comment_like: i32,
    pub comment_dislike: i32,
    pub created_at: DateTime,
}
