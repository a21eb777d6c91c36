use chrono::{DateTime, NaiveDateTime};

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Post {
    pub fn created_display(&self) -> String {
        format_timestamp(self.created_at.as_deref())
    }

    pub fn updated_display(&self) -> Option<String> {
        self.updated_at
            .as_deref()
            .map(|raw| format_timestamp(Some(raw)))
    }
}

/// Format a stored timestamp for display as `YYYY-MM-DD HH:MM:SS`.
///
/// Timestamps come back from the store as text: SQLite's own format (with or
/// without fractional seconds) or RFC 3339 if a row was written by another
/// tool. An absent or unparseable value displays as "Unknown Date" rather
/// than failing the request.
pub fn format_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "Unknown Date".to_string();
    };

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }

    "Unknown Date".to_string()
}
