use crate::application::repos::RepoError;

const UNDEFINED_TABLE: &str = "42P01";
const QUERY_CANCELED: &str = "57014";

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::Database(db) if db.code().as_deref() == Some(QUERY_CANCELED) => {
            RepoError::Timeout
        }
        sqlx::Error::Database(db) if db.message().contains("invalid input syntax") => {
            RepoError::InvalidInput {
                message: db.message().to_string(),
            }
        }
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        other => RepoError::from_persistence(other),
    }
}

/// Like [`map_sqlx_error`], but a missing relation becomes
/// [`RepoError::StoreUnavailable`] for `table`.
pub(super) fn map_table_error(table: &str) -> impl Fn(sqlx::Error) -> RepoError + '_ {
    move |err| match err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNDEFINED_TABLE) => {
            RepoError::store_unavailable(table)
        }
        other => map_sqlx_error(other),
    }
}

/// Escape `LIKE` metacharacters so `prefix` matches literally.
pub(super) fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
