use crate::schema::user;
use crate::string::SmallString;
use crate::time::DateTime;
use diesel::pg::Pg;
use diesel::prelude::*;

#[derive(Insertable)]
#[diesel(table_name = user)]
#[diesel(check_for_backend(Pg))]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub password_salt: &'a str,
}

#[derive(Identifiable, Queryable, Selectable)]
#[diesel(table_name = user)]
#[diesel(primary_key(user_id))]
#[diesel(check_for_backend(Pg))]
pub struct User {
    pub user_id: i64,
    pub username: SmallString,
    pub email: SmallString,
    pub password_hash: String,
    pub password_salt: String,
    pub created_at: DateTime,
}

impl User {
    pub fn from_name(conn: &mut PgConnection, name: &str) -> QueryResult<Option<Self>> {
        user::table
            .filter(user::username.eq(name))
            .select(Self::as_select())
            .first(conn)
            .optional()
    }
}
