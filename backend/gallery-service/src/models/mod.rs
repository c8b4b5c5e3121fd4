/// HTTP response bodies
///
/// Field names are PascalCase on the wire (`ImageID`, `Title`, `Posts`,
/// `Views`, `Error`).
use serde::{Deserialize, Serialize};

use crate::db::PostSummary;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostResponse {
    #[serde(rename = "ImageID")]
    pub image_id: String,
    #[serde(rename = "Title")]
    pub title: String,
}

impl From<PostSummary> for PostResponse {
    fn from(post: PostSummary) -> Self {
        Self {
            image_id: post.id.to_string(),
            title: post.title,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct InfoResponse {
    pub posts: i64,
    pub views: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::PostId;

    #[test]
    fn test_post_response_wire_format() {
        let body = PostResponse::from(PostSummary {
            id: PostId(7),
            title: "hello".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"ImageID": "7", "Title": "hello"})
        );
    }

    #[test]
    fn test_info_and_error_wire_format() {
        let info = InfoResponse { posts: 2, views: 0 };
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            serde_json::json!({"Posts": 2, "Views": 0})
        );

        let err = ErrorResponse::new("boom");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"Error": "boom"})
        );
    }
}
