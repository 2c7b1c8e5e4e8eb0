use crate::model::enums::Region;
use crate::model::post::Post;
use std::cmp::Reverse;

/// Derived orderings and groupings over an already-fetched post collection.
/// Everything here is pure and recomputed from a full fetch on every
/// request; there is no pagination, caching, or incremental recomputation.

pub const MOST_LIKED_COUNT: usize = 10;
pub const CURATED_LIST_SIZE: usize = 5;

pub const LATEST_KEY: &str = "latest";
pub const LATEST_TITLE: &str = "Top 5 Latest Reviews";
pub const LATEST_SUBTITLE: &str = "Fresh perspectives on local cafés and restaurants";

/// A keyword-tagged "Top 5" category.
pub struct Category {
    pub key: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    keywords: &'static [&'static str],
}

pub const CATEGORIES: [Category; 4] = [
    Category {
        key: "coffee",
        title: "Top 5 Coffee Spots",
        subtitle: "The best places to get your caffeine fix",
        keywords: &["coffee"],
    },
    Category {
        key: "dessert",
        title: "Top 5 Dessert Places",
        subtitle: "Satisfy your sweet tooth at these top spots",
        keywords: &["dessert", "cake"],
    },
    Category {
        key: "romantic",
        title: "Top 5 Romantic Spots",
        subtitle: "Perfect places for a date night",
        keywords: &["romantic", "couples", "date"],
    },
    Category {
        key: "family",
        title: "Top 5 Family-Friendly Places",
        subtitle: "Great options for dining with kids",
        keywords: &["family", "kid"],
    },
];

impl Category {
    fn matches(&self, post: &Post) -> bool {
        let title = post.post_title.to_lowercase();
        let detail = post.post_detail.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| title.contains(keyword) || detail.contains(keyword))
    }
}

/// Posts ranked by like count, descending. The sort is stable, so posts with
/// equal like counts keep their fetch order. Callers truncate to the view's
/// size.
pub fn most_liked(posts: &[Post]) -> Vec<&Post> {
    let mut ranked: Vec<&Post> = posts.iter().collect();
    ranked.sort_by_key(|post| Reverse(post.post_like));
    ranked
}

/// The post with the highest identifier. Identifiers are assigned
/// monotonically at creation, so this stands in for "most recent".
pub fn latest(posts: &[Post]) -> Option<&Post> {
    posts.iter().max_by_key(|post| post.post_id)
}

/// Up to five posts matching the category's keywords in title or detail,
/// case-insensitively. When nothing matches, falls back to an arbitrary
/// five posts from the full collection so that every category view is
/// non-empty, even though the fallback posts may have nothing to do with
/// the category.
pub fn top_five<'a>(posts: &'a [Post], category: &Category) -> Vec<&'a Post> {
    let matched: Vec<&Post> = posts
        .iter()
        .filter(|post| category.matches(post))
        .take(CURATED_LIST_SIZE)
        .collect();
    if matched.is_empty() {
        posts.iter().take(CURATED_LIST_SIZE).collect()
    } else {
        matched
    }
}

/// Posts tagged with exactly the given region, in fetch order.
pub fn by_region(posts: &[Post], region: Region) -> Vec<&Post> {
    posts.iter().filter(|post| post.post_region == region).collect()
}

/// The region's five most disliked posts, skipping posts nobody disliked.
pub fn most_disliked_in_region(posts: &[Post], region: Region) -> Vec<&Post> {
    let mut disliked: Vec<&Post> = posts
        .iter()
        .filter(|post| post.post_region == region && post.post_dislike > 0)
        .collect();
    disliked.sort_by_key(|post| Reverse(post.post_dislike));
    disliked.truncate(CURATED_LIST_SIZE);
    disliked
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::post_fixture;

    fn ids(posts: &[&Post]) -> Vec<i64> {
        posts.iter().map(|post| post.post_id).collect()
    }

    #[test]
    fn most_liked_ranks_descending() {
        let posts = vec![
            post_fixture(1, "a", "", 2, 0),
            post_fixture(2, "b", "", 9, 0),
            post_fixture(3, "c", "", 4, 0),
        ];
        assert_eq!(ids(&most_liked(&posts)), [2, 3, 1]);
    }

    #[test]
    fn most_liked_is_stable_on_ties() {
        let posts = vec![
            post_fixture(1, "a", "", 3, 0),
            post_fixture(2, "b", "", 7, 0),
            post_fixture(3, "c", "", 3, 0),
            post_fixture(4, "d", "", 3, 0),
        ];
        // Tied posts keep their fetch order
        assert_eq!(ids(&most_liked(&posts)), [2, 1, 3, 4]);
    }

    #[test]
    fn latest_is_the_maximum_id() {
        let posts = vec![
            post_fixture(4, "a", "", 0, 0),
            post_fixture(9, "b", "", 0, 0),
            post_fixture(2, "c", "", 0, 0),
        ];
        assert_eq!(latest(&posts).map(|post| post.post_id), Some(9));
        assert!(latest(&[]).is_none());
    }

    #[test]
    fn keyword_match_is_case_insensitive_over_title_and_detail() {
        let posts = vec![
            post_fixture(1, "Best COFFEE in town", "", 0, 0),
            post_fixture(2, "Quiet corner", "great coffee and wifi", 0, 0),
            post_fixture(3, "Noodle bar", "nothing relevant", 0, 0),
        ];
        assert_eq!(ids(&top_five(&posts, &CATEGORIES[0])), [1, 2]);
    }

    #[test]
    fn category_with_no_matches_falls_back_to_five_posts() {
        let posts: Vec<Post> = (1..=8)
            .map(|id| post_fixture(id, "Noodle bar", "nothing relevant", 0, 0))
            .collect();
        let dessert = top_five(&posts, &CATEGORIES[1]);
        assert_eq!(dessert.len(), CURATED_LIST_SIZE);
        assert_eq!(ids(&dessert), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn matches_are_capped_at_five() {
        let posts: Vec<Post> = (1..=8)
            .map(|id| post_fixture(id, "family brunch", "", 0, 0))
            .collect();
        assert_eq!(top_five(&posts, &CATEGORIES[3]).len(), CURATED_LIST_SIZE);
    }

    #[test]
    fn region_filter_is_exact() {
        let mut north = post_fixture(1, "a", "", 0, 0);
        north.post_region = Region::North;
        let mut isaan = post_fixture(2, "b", "", 0, 0);
        isaan.post_region = Region::Isaan;

        let posts = vec![north, isaan];
        assert_eq!(ids(&by_region(&posts, Region::North)), [1]);
        assert_eq!(ids(&by_region(&posts, Region::Isaan)), [2]);
        assert!(by_region(&posts, Region::South).is_empty());
    }

    #[test]
    fn most_disliked_skips_undisliked_posts() {
        let posts: Vec<Post> = [(1, 0), (2, 4), (3, 2), (4, 9), (5, 0)]
            .into_iter()
            .map(|(id, dislikes)| post_fixture(id, "a", "", 0, dislikes))
            .collect();
        assert_eq!(ids(&most_disliked_in_region(&posts, Region::Central)), [4, 2, 3]);
    }
}
