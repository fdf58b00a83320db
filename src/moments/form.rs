//! Decoding of the multipart body used to create and update moments.

use axum::extract::Multipart;
use tracing::debug;

use crate::{
    dates::parse_date,
    error::AppError,
    moments::repo_types::{ImageAttachment, MomentPatch, NewMoment},
    validation::validate_field,
};

pub const TITLE: &str = "moment-title";
pub const DESCRIPTION: &str = "moment-description";
pub const DATE: &str = "moment-date";
pub const FEELINGS: &str = "moment-feelings";
pub const IMAGE: &str = "moment-image";
pub const IMAGE_CAPTION: &str = "moment-image-caption";

/// Fields of a moment form. Empty parts are treated as not supplied.
#[derive(Debug, Default)]
pub struct MomentForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub feelings: Option<String>,
    pub image: Option<ImageAttachment>,
    pub image_caption: Option<String>,
}

fn malformed(e: impl std::fmt::Display) -> AppError {
    AppError::validation(format!("malformed multipart body: {e}"))
}

impl MomentForm {
    pub async fn from_multipart(mut mp: Multipart) -> Result<Self, AppError> {
        let mut form = MomentForm::default();
        while let Some(field) = mp.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == IMAGE {
                let filename = field.file_name().map(str::to_string);
                let content = field.bytes().await.map_err(malformed)?;
                if content.is_empty() {
                    continue;
                }
                let filename = filename
                    .ok_or_else(|| AppError::validation(format!("{IMAGE} is missing a filename")))?;
                validate_field("image filename", &filename)?;
                form.image = Some(ImageAttachment { filename, content });
                continue;
            }

            let slot = match name.as_str() {
                TITLE => &mut form.title,
                DESCRIPTION => &mut form.description,
                DATE => &mut form.date,
                FEELINGS => &mut form.feelings,
                IMAGE_CAPTION => &mut form.image_caption,
                other => {
                    debug!(field = %other, "ignoring unknown form field");
                    continue;
                }
            };
            let text = field.text().await.map_err(malformed)?;
            if !text.is_empty() {
                validate_field(&name, &text)?;
                *slot = Some(text);
            }
        }
        Ok(form)
    }

    pub fn into_new_moment(self, username: &str) -> Result<NewMoment, AppError> {
        let title = self.title.unwrap_or_default();
        let description = self.description.unwrap_or_default();
        let date = self.date.unwrap_or_default();
        validate_field(TITLE, &title)?;
        validate_field(DESCRIPTION, &description)?;
        validate_field(DATE, &date)?;

        Ok(NewMoment {
            username: username.to_string(),
            title,
            description,
            date: Some(parse_date(DATE, &date)?),
            image: self.image,
            image_caption: self.image_caption,
            feelings: self.feelings.as_deref().map(parse_feelings).unwrap_or_default(),
        })
    }

    pub fn into_patch(self) -> Result<MomentPatch, AppError> {
        let date = self.date.as_deref().map(|d| parse_date(DATE, d)).transpose()?;
        let feelings = self
            .feelings
            .as_deref()
            .map(parse_feelings)
            .filter(|f| !f.is_empty());
        Ok(MomentPatch {
            title: self.title,
            description: self.description,
            date,
            image: self.image,
            image_caption: self.image_caption,
            feelings,
        })
    }
}

/// Split a comma-separated tag list into an ordered set: trimmed, no empties,
/// first occurrence wins.
pub fn parse_feelings(csv: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in csv.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
