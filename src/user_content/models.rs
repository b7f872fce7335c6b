use serde::{Deserialize, Serialize};

/// A comment on a movie. First-order comments have no `reply_comment_id`,
/// second-order comments reply to a first-order one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub comment_id: i64,
    pub movie_id: i64,
    pub user_id: String,
    pub reply_comment_id: Option<i64>,
    pub text: String,
    /// Unix timestamp, seconds.
    pub created_at: i64,
}

/// Body of a comment post request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    #[serde(default)]
    pub reply_comment_id: Option<i64>,
    pub text: String,
}
