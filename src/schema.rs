diesel::table! {
    use diesel::sql_types::*;
    use diesel::pg::sql_types::Citext;

    user (user_id) {
        user_id -> Int8,
        username -> Citext,
        email -> Citext,
        password_hash -> Text,
        password_salt -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    post (post_id) {
        post_id -> Int8,
        user_id -> Int8,
        post_title -> Text,
        post_detail -> Text,
        post_region -> Int2,
        post_like -> Int4,
        post_dislike -> Int4,
        comment_count -> Int4,
        post_image -> Nullable<Text>,
        post_image_2 -> Nullable<Text>,
        post_image_3 -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    comment (comment_id) {
        comment_id -> Int8,
        post_id -> Int8,
        user_id -> Int8,
        comment_detail -> Text,
        comment_like -> Int4,
        comment_dislike -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(post -> user (user_id));
diesel::joinable!(comment -> post (post_id));
diesel::joinable!(comment -> user (user_id));

diesel::allow_tables_to_appear_in_same_query!(user, post, comment);
