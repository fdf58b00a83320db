//! Builds the INSERT, UPDATE, SELECT and DELETE statements for users and moments.
//!
//! Every statement touching `moments` is scoped by `username`; no statement
//! addresses a moment by id alone.

use crate::{
    auth::repo_types::NewUser,
    error::AppError,
    moments::repo_types::{ListQuery, MomentPatch, NewMoment},
    schema::{column_list, moments, users, Field},
};

use super::params::BindValue;

/// bcrypt work factor passed to `gen_salt`.
pub const BCRYPT_COST: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl Statement {
    fn new() -> Self {
        Statement {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Bind a value and return its placeholder.
    fn push(&mut self, v: impl Into<BindValue>) -> String {
        self.params.push(v.into());
        format!("${}", self.params.len())
    }
}

/// Collects `column = $n` assignments for a sparse update.
struct Assignments<'a> {
    stmt: &'a mut Statement,
    sets: Vec<String>,
}

impl Assignments<'_> {
    fn set(&mut self, field: Field, v: impl Into<BindValue>) {
        debug_assert!(field.updatable, "{} is not updatable", field.column);
        let ph = self.stmt.push(v);
        self.sets.push(format!("{} = {}", field.column, ph));
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|v| !v.is_empty())
}

/// Escape `LIKE` metacharacters so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn select_user(username: &str) -> Statement {
    let mut q = Statement::new();
    let ph = q.push(username);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        column_list(users::ALL),
        users::TABLE,
        users::USERNAME.column,
        ph
    );
    q
}

/// INSERT a user. The password is hashed by the store with a fresh salt;
/// the creation time is the store's clock.
pub fn insert_user(user: &NewUser, password: &str) -> Result<Statement, AppError> {
    user.validate()?;
    if password.is_empty() {
        return Err(AppError::validation("password cannot be empty"));
    }

    let mut q = Statement::new();
    let username = q.push(user.username.as_str());
    let full_name = q.push(user.full_name.as_str());
    let birth_date = q.push(user.birth_date);
    let email_id = q.push(user.email_id.as_str());
    let password = q.push(password);
    q.sql = format!(
        "INSERT INTO {} ({}, {}, {}, {}, {}, {}) \
         VALUES ({}, {}, {}, {}, crypt({}, gen_salt('bf', {})), now()) RETURNING {}",
        users::TABLE,
        users::USERNAME.column,
        users::FULL_NAME.column,
        users::BIRTH_DATE.column,
        users::EMAIL_ID.column,
        users::PASSWORD_HASH.column,
        users::ACCOUNT_CREATION_TIME.column,
        username,
        full_name,
        birth_date,
        email_id,
        password,
        BCRYPT_COST,
        column_list(users::ALL)
    );
    Ok(q)
}

/// Re-hash `plain` with the salt embedded in `stored_hash` and compare, all in the store.
pub fn verify_password(plain: &str, stored_hash: &str) -> Statement {
    let mut q = Statement::new();
    let plain = q.push(plain);
    let hash = q.push(stored_hash);
    q.sql = format!("SELECT crypt({plain}, {hash}) = {hash} AS is_equal");
    q
}

/// INSERT a moment, returning the id the store assigned.
///
/// Without image content the filename, data and caption columns are all NULL,
/// even when a caption was supplied.
pub fn insert_moment(m: &NewMoment) -> Result<Statement, AppError> {
    let date = m.validate()?;

    let mut q = Statement::new();
    let username = q.push(m.username.as_str());
    let title = q.push(m.title.as_str());
    let description = q.push(m.description.as_str());
    let date = q.push(date);
    let (filename, data, caption) = match m.attachment() {
        Some(img) => {
            let filename = q.push(img.filename.as_str());
            let data = q.push(BindValue::Bytes(img.content.to_vec()));
            let caption = match non_empty(&m.image_caption) {
                Some(c) => q.push(c),
                None => "NULL".to_string(),
            };
            (filename, data, caption)
        }
        None => ("NULL".to_string(), "NULL".to_string(), "NULL".to_string()),
    };
    let feelings = if m.feelings.is_empty() {
        "NULL".to_string()
    } else {
        q.push(BindValue::TextArray(m.feelings.clone()))
    };

    q.sql = format!(
        "INSERT INTO {} ({}, {}, {}, {}, {}, {}, {}, {}) \
         VALUES ({}, {}, {}, {}, {}, {}, {}, {}) RETURNING {}",
        moments::TABLE,
        moments::USERNAME.column,
        moments::TITLE.column,
        moments::DESCRIPTION.column,
        moments::DATE.column,
        moments::IMAGE_FILENAME.column,
        moments::IMAGE_DATA.column,
        moments::IMAGE_CAPTION.column,
        moments::FEELINGS.column,
        username,
        title,
        description,
        date,
        filename,
        data,
        caption,
        feelings,
        moments::ID.column
    );
    Ok(q)
}

/// Sparse UPDATE of one moment. Only supplied, non-empty fields are assigned;
/// `last_modified_date` is stamped even when nothing else changes.
pub fn update_moment(owner: &str, id: i64, patch: &MomentPatch) -> Statement {
    let mut q = Statement::new();
    let mut a = Assignments {
        stmt: &mut q,
        sets: Vec::new(),
    };

    if let Some(title) = non_empty(&patch.title) {
        a.set(moments::TITLE, title);
    }
    if let Some(description) = non_empty(&patch.description) {
        a.set(moments::DESCRIPTION, description);
    }
    if let Some(date) = patch.date {
        a.set(moments::DATE, date);
    }
    if let Some(feelings) = patch.feelings.as_ref().filter(|f| !f.is_empty()) {
        a.set(moments::FEELINGS, BindValue::TextArray(feelings.clone()));
    }
    if let Some(img) = patch.image.as_ref().filter(|img| !img.content.is_empty()) {
        a.set(moments::IMAGE_DATA, BindValue::Bytes(img.content.to_vec()));
        a.set(moments::IMAGE_FILENAME, img.filename.as_str());
    }
    if let Some(caption) = non_empty(&patch.image_caption) {
        a.set(moments::IMAGE_CAPTION, caption);
    }
    let mut sets = a.sets;
    sets.push(format!("{} = now()", moments::LAST_MODIFIED_DATE.column));

    let owner = q.push(owner);
    let id = q.push(id);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} AND {} = {}",
        moments::TABLE,
        sets.join(", "),
        moments::USERNAME.column,
        owner,
        moments::ID.column,
        id
    );
    q
}

pub fn delete_moment(owner: &str, id: i64) -> Statement {
    let mut q = Statement::new();
    let owner = q.push(owner);
    let id = q.push(id);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {} AND {} = {}",
        moments::TABLE,
        moments::USERNAME.column,
        owner,
        moments::ID.column,
        id
    );
    q
}

pub fn select_moment(owner: &str, id: i64) -> Statement {
    let mut q = Statement::new();
    let owner = q.push(owner);
    let id = q.push(id);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {} AND {} = {}",
        column_list(moments::ALL),
        moments::TABLE,
        moments::USERNAME.column,
        owner,
        moments::ID.column,
        id
    );
    q
}

/// One page of the owner's moments ordered by creation time, optionally
/// restricted to titles containing `search` (case-sensitive).
pub fn select_moments(owner: &str, list: &ListQuery) -> Statement {
    let mut q = Statement::new();
    let owner = q.push(owner);
    let mut where_clause = format!("{} = {}", moments::USERNAME.column, owner);
    if let Some(term) = non_empty(&list.search) {
        let ph = q.push(format!("%{}%", escape_like(term)));
        where_clause.push_str(&format!(" AND {} LIKE {}", moments::TITLE.column, ph));
    }
    let order = list.sort.keyword();
    let offset = q.push(list.offset());
    let limit = q.push(i64::from(list.page_size));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} ORDER BY {} {}, {} {} OFFSET {} LIMIT {}",
        column_list(moments::ALL),
        moments::TABLE,
        where_clause,
        moments::CREATED_DATE.column,
        order,
        moments::ID.column,
        order,
        offset,
        limit
    );
    q
}

pub fn count_moments(owner: &str) -> Statement {
    let mut q = Statement::new();
    let owner = q.push(owner);
    q.sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {} = {}",
        moments::TABLE,
        moments::USERNAME.column,
        owner
    );
    q
}
