//! Input checks applied by handlers before anything reaches the store.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::db::posts::MAX_CATEGORIES_PER_POST;
use crate::error::AppError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern compiles")
});

const USERNAME_MAX: usize = 50;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Trim `value` and check its length in characters, not bytes.
fn bounded_text(value: &str, min: usize, max: usize, what: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{what} is required")));
    }
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(AppError::Validation(format!(
            "{what} must be between {min} and {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub fn username(value: &str) -> Result<String, AppError> {
    bounded_text(value, 1, USERNAME_MAX, "Username")
}

pub fn post_title(value: &str) -> Result<String, AppError> {
    bounded_text(value, 5, 100, "Title")
}

pub fn post_content(value: &str) -> Result<String, AppError> {
    bounded_text(value, 10, 2000, "Post content")
}

pub fn comment_content(value: &str) -> Result<String, AppError> {
    bounded_text(value, 2, 500, "Comment")
}

/// Split a comma-separated category list, dropping blanks and repeats.
pub fn category_names(raw: &str) -> Result<Vec<String>, AppError> {
    let mut seen = HashSet::new();
    let names: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect();

    if names.len() > MAX_CATEGORIES_PER_POST {
        return Err(AppError::Validation(format!(
            "At most {MAX_CATEGORIES_PER_POST} categories can be selected"
        )));
    }
    Ok(names)
}

pub fn id(value: &str, what: &str) -> Result<i64, AppError> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::Validation(format!("Invalid {what}")))
}

pub fn is_like(value: &str) -> Result<bool, AppError> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(AppError::Validation("is_like must be true or false".into())),
    }
}
