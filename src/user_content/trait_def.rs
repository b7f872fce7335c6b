use super::models::Comment;
use anyhow::Result;

/// Storage of per-user content: comment threads and favorite movies.
pub trait UserContentStore: Send + Sync {
    /// First-order comments of a movie, newest first.
    fn get_first_order_comments(
        &self,
        movie_id: i64,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Comment>>;

    /// Replies to a first-order comment, oldest first.
    fn get_second_order_comments(
        &self,
        movie_id: i64,
        comment_id: i64,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Comment>>;

    /// Store a comment and return its id.
    ///
    /// Returns `None` when `reply_comment_id` does not point to a first-order
    /// comment of the same movie.
    fn post_comment(
        &self,
        user_id: &str,
        movie_id: i64,
        reply_comment_id: Option<i64>,
        text: &str,
    ) -> Result<Option<i64>>;

    fn is_movie_in_favorites(&self, user_id: &str, movie_id: i64) -> Result<bool>;

    /// Add or remove a favorite, returning whether the movie is now a favorite.
    fn toggle_favorite(&self, user_id: &str, movie_id: i64) -> Result<bool>;

    /// Favorite movie ids of a user, most recently added first.
    fn get_favorite_movie_ids(&self, user_id: &str, limit: usize, offset: usize)
        -> Result<Vec<i64>>;
}
