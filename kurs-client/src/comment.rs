use crate::api::{ApiComment, CommentId, PostId, Time};

/// A comment with its replies stripped out, as kept in `CommentsState`
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentData {
    pub id: CommentId,
    pub author_name: String,
    pub author_username: String,
    pub author_avatar_url: Option<String>,
    pub content: String,
    pub created_at: Time,
    pub like_count: i64,
    pub reply_count: i64,
    pub is_liked: bool,
    pub parent_id: Option<CommentId>,
    pub post_id: PostId,
}

impl CommentData {
    /// Converts only `c` itself, ignoring its replies
    pub fn from_api(c: &ApiComment) -> CommentData {
        CommentData {
            id: c.id,
            author_name: c.user.display_name.clone(),
            author_username: c.user.username.clone(),
            author_avatar_url: c.user.profile_picture_url.clone(),
            content: c.content.clone(),
            created_at: c.created_at,
            like_count: c.like_count,
            reply_count: c.reply_count,
            is_liked: c.is_liked,
            parent_id: c.parent_id,
            post_id: c.post_id,
        }
    }
}

/// Flattens nested reply trees depth-first: every comment comes before its
/// replies, and siblings keep their order
pub fn flatten(nested: &[ApiComment]) -> Vec<CommentData> {
    let mut res = Vec::new();
    flatten_into(nested, &mut res);
    res
}

fn flatten_into(nested: &[ApiComment], res: &mut Vec<CommentData>) {
    for c in nested {
        res.push(CommentData::from_api(c));
        flatten_into(&c.replies, res);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::api::ApiUser;

    pub fn api_comment(id: i64, parent: Option<i64>, replies: Vec<ApiComment>) -> ApiComment {
        ApiComment {
            id: CommentId(id),
            post_id: PostId(1),
            parent_id: parent.map(CommentId),
            user: ApiUser {
                display_name: format!("User {id}"),
                username: format!("user{id}"),
                profile_picture_url: None,
            },
            content: format!("comment {id}"),
            created_at: chrono::Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap(),
            like_count: 0,
            reply_count: replies.len() as i64,
            is_liked: false,
            replies,
        }
    }

    pub fn comment(id: i64, parent: Option<i64>) -> CommentData {
        CommentData::from_api(&api_comment(id, parent, Vec::new()))
    }

    #[test]
    fn maps_backend_fields() {
        let mut c = api_comment(4, Some(2), Vec::new());
        c.user.profile_picture_url = Some(String::from("https://cdn.example.org/4.png"));
        c.like_count = 9;
        c.is_liked = true;
        let d = CommentData::from_api(&c);
        assert_eq!(d.id, CommentId(4));
        assert_eq!(d.author_name, "User 4");
        assert_eq!(d.author_username, "user4");
        assert_eq!(
            d.author_avatar_url.as_deref(),
            Some("https://cdn.example.org/4.png")
        );
        assert_eq!(d.parent_id, Some(CommentId(2)));
        assert_eq!(d.post_id, PostId(1));
        assert_eq!(d.like_count, 9);
        assert!(d.is_liked);
        assert_eq!(d.created_at, c.created_at);
    }

    #[test]
    fn flattens_depth_first() {
        let tree = vec![
            api_comment(
                1,
                None,
                vec![
                    api_comment(2, Some(1), vec![api_comment(4, Some(2), Vec::new())]),
                    api_comment(3, Some(1), Vec::new()),
                ],
            ),
            api_comment(5, None, vec![api_comment(6, Some(5), Vec::new())]),
        ];
        let ids = flatten(&tree).into_iter().map(|c| c.id.0).collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2, 4, 3, 5, 6]);
        assert!(flatten(&[]).is_empty());
    }
}
