use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::moments::repo_types::Moment;

#[derive(Debug, Serialize)]
pub struct MomentResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(with = "crate::dates")]
    pub date: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_modified_date: OffsetDateTime,
    pub image_filename: Option<String>,
    pub image_content: Option<String>, // base64
    pub image_caption: Option<String>,
    pub feelings: Vec<String>,
}

impl From<Moment> for MomentResponse {
    fn from(m: Moment) -> Self {
        let (image_filename, image_content) = match m.image {
            Some(img) => (Some(img.filename), Some(Base64::encode_string(&img.content))),
            None => (None, None),
        };
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            date: m.date,
            created_date: m.created_date,
            last_modified_date: m.last_modified_date,
            image_filename,
            image_content,
            image_caption: m.image_caption,
            feelings: m.feelings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedMomentResponse {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct TotalMomentsResponse {
    pub total_moments: u64,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_page")]
    pub current_page: i64,
    pub sort_by: Option<String>,
    pub search: Option<String>,
}

fn default_page_size() -> u32 {
    10
}

fn default_page() -> i64 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moments::repo_types::ImageAttachment;
    use bytes::Bytes;
    use time::macros::{date, datetime};

    #[test]
    fn moment_response_encodes_image_as_base64() {
        let m = Moment {
            id: 1,
            username: "alice".into(),
            title: "t".into(),
            description: "d".into(),
            date: date!(2024 - 01 - 31),
            created_date: datetime!(2024-01-31 08:30 UTC),
            last_modified_date: datetime!(2024-01-31 08:30 UTC),
            image: Some(ImageAttachment {
                filename: "a.bin".into(),
                content: Bytes::from_static(b"hello"),
            }),
            image_caption: None,
            feelings: vec!["ok".into()],
        };
        let json = serde_json::to_value(MomentResponse::from(m)).unwrap();
        assert_eq!(json["image_content"], "aGVsbG8=");
        assert_eq!(json["date"], "2024-01-31");
        assert_eq!(json["created_date"], "2024-01-31T08:30:00Z");
        assert_eq!(json["feelings"][0], "ok");
        assert!(json.get("username").is_none());
    }
}
