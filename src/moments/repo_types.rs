use bytes::Bytes;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

use crate::{error::AppError, schema::moments};

/// Binary attachment of a moment. Filename and content are stored together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub filename: String,
    pub content: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moment {
    pub id: i64,
    pub username: String,
    pub title: String,
    pub description: String,
    pub date: Date,
    pub created_date: OffsetDateTime,
    pub last_modified_date: OffsetDateTime,
    pub image: Option<ImageAttachment>,
    pub image_caption: Option<String>,
    pub feelings: Vec<String>,
}

/// Row shape of `moments` as the store returns it.
#[derive(Debug, FromRow)]
pub struct MomentRow {
    pub id: i64,
    pub username: String,
    pub title: String,
    pub description: String,
    pub moment_date: Date,
    pub created_date: OffsetDateTime,
    pub last_modified_date: OffsetDateTime,
    pub image_filename: Option<String>,
    pub image_data: Option<Vec<u8>>,
    pub image_caption: Option<String>,
    pub feelings: Option<Vec<String>>,
}

impl From<MomentRow> for Moment {
    fn from(r: MomentRow) -> Self {
        let image = r.image_data.map(|data| ImageAttachment {
            filename: r.image_filename.unwrap_or_default(),
            content: Bytes::from(data),
        });
        Self {
            id: r.id,
            username: r.username,
            title: r.title,
            description: r.description,
            date: r.moment_date,
            created_date: r.created_date,
            last_modified_date: r.last_modified_date,
            image,
            image_caption: r.image_caption,
            feelings: r.feelings.unwrap_or_default(),
        }
    }
}

/// A moment as submitted for creation. Id and timestamps are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMoment {
    pub username: String,
    pub title: String,
    pub description: String,
    pub date: Option<Date>,
    pub image: Option<ImageAttachment>,
    /// Only persisted together with an image.
    pub image_caption: Option<String>,
    pub feelings: Vec<String>,
}

impl NewMoment {
    pub fn validate(&self) -> Result<Date, AppError> {
        moments::USERNAME.require(&self.username)?;
        moments::TITLE.require(&self.title)?;
        moments::DESCRIPTION.require(&self.description)?;
        self.date
            .ok_or_else(|| AppError::validation(format!("{} cannot be empty", moments::DATE.column)))
    }

    /// The attachment to write, if any. An empty buffer counts as no image.
    pub fn attachment(&self) -> Option<&ImageAttachment> {
        self.image.as_ref().filter(|img| !img.content.is_empty())
    }
}

/// Sparse update of a moment: `None` leaves the column unchanged.
/// Clearing a column is not supported; empty values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MomentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<Date>,
    pub image: Option<ImageAttachment>,
    pub image_caption: Option<String>,
    pub feelings: Option<Vec<String>>,
}

impl MomentPatch {
    /// True when no column would change. Empty strings, empty feelings and
    /// empty image content count as not supplied.
    pub fn is_empty(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().map_or(true, str::is_empty);
        blank(&self.title)
            && blank(&self.description)
            && self.date.is_none()
            && self.image.as_ref().map_or(true, |img| img.content.is_empty())
            && blank(&self.image_caption)
            && self.feelings.as_ref().map_or(true, Vec::is_empty)
    }
}

/// Ordering of a moment listing by `created_date`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// `date-desc` selects descending order; anything else is ascending.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some("date-desc") => SortOrder::Descending,
            _ => SortOrder::Ascending,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Page, order and title filter of a moment listing. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page_size: u32,
    pub current_page: i64,
    pub sort: SortOrder,
    pub search: Option<String>,
}

impl ListQuery {
    /// Row offset of the page, or `None` when it does not fit in an `i64`.
    pub fn checked_offset(&self) -> Option<i64> {
        self.current_page
            .checked_sub(1)?
            .checked_mul(i64::from(self.page_size))
    }

    /// Like [`checked_offset`](Self::checked_offset), clamped to the `i64` range.
    pub fn offset(&self) -> i64 {
        self.current_page
            .saturating_sub(1)
            .saturating_mul(i64::from(self.page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn row() -> MomentRow {
        MomentRow {
            id: 3,
            username: "alice".into(),
            title: "t".into(),
            description: "d".into(),
            moment_date: date!(2024 - 05 - 01),
            created_date: datetime!(2024-05-01 10:00 UTC),
            last_modified_date: datetime!(2024-05-01 10:00 UTC),
            image_filename: None,
            image_data: None,
            image_caption: None,
            feelings: None,
        }
    }

    #[test]
    fn null_columns_map_to_empty_values() {
        let m = Moment::from(row());
        assert!(m.image.is_none());
        assert!(m.feelings.is_empty());
        assert!(m.image_caption.is_none());
    }

    #[test]
    fn image_is_decoded_only_when_data_present() {
        let mut r = row();
        r.image_filename = Some("a.png".into());
        r.image_data = Some(vec![0, 159, 146, 150]);
        r.feelings = Some(vec!["calm".into(), "happy".into()]);
        let m = Moment::from(r);
        let img = m.image.expect("image");
        assert_eq!(img.filename, "a.png");
        assert_eq!(&img.content[..], &[0, 159, 146, 150]);
        assert_eq!(m.feelings, vec!["calm", "happy"]);
    }

    #[test]
    fn sort_token_vocabulary() {
        assert_eq!(SortOrder::from_token(Some("date-desc")), SortOrder::Descending);
        assert_eq!(SortOrder::from_token(Some("date-asc")), SortOrder::Ascending);
        assert_eq!(SortOrder::from_token(Some("DROP TABLE")), SortOrder::Ascending);
        assert_eq!(SortOrder::from_token(None), SortOrder::Ascending);
    }

    #[test]
    fn offset_is_zero_based_from_one_based_page() {
        let q = |page| ListQuery {
            page_size: 2,
            current_page: page,
            sort: SortOrder::Ascending,
            search: None,
        };
        assert_eq!(q(1).offset(), 0);
        assert_eq!(q(3).offset(), 4);
        assert_eq!(q(0).offset(), -2);
        assert_eq!(q(3).checked_offset(), Some(4));
    }

    #[test]
    fn huge_page_number_does_not_overflow() {
        let list = ListQuery {
            page_size: 100,
            current_page: i64::MAX,
            sort: SortOrder::Ascending,
            search: None,
        };
        assert_eq!(list.checked_offset(), None);
        assert_eq!(list.offset(), i64::MAX);
        let list = ListQuery {
            current_page: i64::MIN,
            ..list
        };
        assert_eq!(list.checked_offset(), None);
        assert_eq!(list.offset(), i64::MIN);
    }

    #[test]
    fn blank_patch_fields_count_as_not_supplied() {
        let patch = MomentPatch {
            title: Some(String::new()),
            description: Some(String::new()),
            image: Some(ImageAttachment {
                filename: "empty.png".into(),
                content: Bytes::new(),
            }),
            image_caption: Some(String::new()),
            feelings: Some(Vec::new()),
            ..Default::default()
        };
        assert!(patch.is_empty());
        assert!(MomentPatch::default().is_empty());
        assert!(!MomentPatch {
            title: Some("renamed".into()),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn new_moment_requires_title_description_and_date() {
        let mut m = NewMoment {
            username: "alice".into(),
            title: "hike".into(),
            description: "up the hill".into(),
            date: Some(date!(2024 - 01 - 01)),
            ..Default::default()
        };
        assert_eq!(m.validate().unwrap(), date!(2024 - 01 - 01));
        m.date = None;
        assert!(m.validate().is_err());
        m.date = Some(date!(2024 - 01 - 01));
        m.title.clear();
        assert!(m.validate().is_err());
    }
}
