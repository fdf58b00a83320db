//! Column vocabulary of the `users` and `moments` tables and the rule each
//! column follows when rows are created or updated.
//!
//! The statement builder only ever emits identifiers taken from here; caller
//! data is always bound as a parameter.

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Must be supplied, non-empty, at creation.
    Required,
    /// May be omitted at creation; written as NULL when absent.
    Optional,
    /// Assigned by the store. Never accepted from a caller.
    ServerAssigned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub column: &'static str,
    pub rule: FieldRule,
    /// May appear in the assignment list of a sparse update.
    pub updatable: bool,
}

const fn field(column: &'static str, rule: FieldRule, updatable: bool) -> Field {
    Field {
        column,
        rule,
        updatable,
    }
}

impl Field {
    /// Rejects an empty value for a field the caller must supply.
    pub fn require(&self, value: &str) -> Result<(), AppError> {
        match self.rule {
            FieldRule::Required if value.is_empty() => Err(AppError::validation(format!(
                "{} cannot be empty",
                self.column
            ))),
            FieldRule::ServerAssigned => Err(AppError::validation(format!(
                "{} is assigned by the server",
                self.column
            ))),
            _ => Ok(()),
        }
    }
}

pub mod users {
    use super::{field, Field, FieldRule::*};

    pub const TABLE: &str = "users";

    pub const USERNAME: Field = field("username", Required, false);
    pub const FULL_NAME: Field = field("fullname", Required, false);
    pub const BIRTH_DATE: Field = field("birthdate", Required, false);
    pub const EMAIL_ID: Field = field("emailid", Required, false);
    pub const PASSWORD_HASH: Field = field("password_hash", Required, false);
    pub const ACCOUNT_CREATION_TIME: Field = field("account_creation_time", ServerAssigned, false);

    pub const ALL: &[Field] = &[
        USERNAME,
        FULL_NAME,
        BIRTH_DATE,
        EMAIL_ID,
        PASSWORD_HASH,
        ACCOUNT_CREATION_TIME,
    ];
}

pub mod moments {
    use super::{field, Field, FieldRule::*};

    pub const TABLE: &str = "moments";

    pub const ID: Field = field("id", ServerAssigned, false);
    pub const USERNAME: Field = field("username", Required, false);
    pub const TITLE: Field = field("title", Required, true);
    pub const DESCRIPTION: Field = field("description", Required, true);
    pub const DATE: Field = field("moment_date", Required, true);
    pub const CREATED_DATE: Field = field("created_date", ServerAssigned, false);
    pub const LAST_MODIFIED_DATE: Field = field("last_modified_date", ServerAssigned, false);
    pub const IMAGE_FILENAME: Field = field("image_filename", Optional, true);
    pub const IMAGE_DATA: Field = field("image_data", Optional, true);
    pub const IMAGE_CAPTION: Field = field("image_caption", Optional, true);
    pub const FEELINGS: Field = field("feelings", Optional, true);

    pub const ALL: &[Field] = &[
        ID,
        USERNAME,
        TITLE,
        DESCRIPTION,
        DATE,
        CREATED_DATE,
        LAST_MODIFIED_DATE,
        IMAGE_FILENAME,
        IMAGE_DATA,
        IMAGE_CAPTION,
        FEELINGS,
    ];
}

/// Comma-separated column list for a SELECT or RETURNING clause.
pub fn column_list(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.column)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_reject_empty_values() {
        assert!(moments::TITLE.require("").is_err());
        assert!(moments::TITLE.require("a walk").is_ok());
        assert!(moments::IMAGE_CAPTION.require("").is_ok());
    }

    #[test]
    fn server_assigned_fields_are_never_accepted() {
        assert!(moments::ID.require("7").is_err());
        assert!(users::ACCOUNT_CREATION_TIME.require("now").is_err());
    }

    #[test]
    fn immutable_moment_columns_are_not_updatable() {
        for f in [moments::ID, moments::USERNAME, moments::CREATED_DATE] {
            assert!(!f.updatable, "{} should not be updatable", f.column);
        }
    }

    #[test]
    fn column_list_keeps_table_order() {
        assert_eq!(
            column_list(users::ALL),
            "username, fullname, birthdate, emailid, password_hash, account_creation_time"
        );
    }
}
