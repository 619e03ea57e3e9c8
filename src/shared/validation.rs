//! Request Validation
//!
//! Field rules for every request body the API accepts. Each validator
//! collects all failing fields rather than stopping at the first, so the
//! caller can report them together.

use uuid::Uuid;

use crate::shared::error::{FieldError, SharedError};
use crate::shared::models::{
    CategoryInput, CommentInput, CommentUpdate, LoginRequest, PostInput, PostStatus,
    ProfileUpdate, RegisterRequest,
};

pub const TITLE_MAX_CHARS: usize = 100;
pub const CONTENT_MIN_CHARS: usize = 10;
pub const COMMENT_MAX_CHARS: usize = 500;
pub const CATEGORY_NAME_CHARS: (usize, usize) = (2, 50);
pub const CATEGORY_DESCRIPTION_MAX_CHARS: usize = 200;
pub const NAME_CHARS: (usize, usize) = (2, 50);
pub const BIO_MAX_CHARS: usize = 500;
pub const PASSWORD_MIN_CHARS: usize = 6;

fn char_len(value: &str) -> usize {
    value.trim().chars().count()
}

fn finish(errors: Vec<FieldError>) -> Result<(), SharedError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(SharedError::validation(errors))
    }
}

/// Whether `value` is a well-formed resource id
pub fn is_valid_id(value: &str) -> bool {
    Uuid::parse_str(value.trim()).is_ok()
}

fn is_plausible_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

pub fn validate_registration(request: &RegisterRequest) -> Result<(), SharedError> {
    let mut errors = Vec::new();
    let (min, max) = NAME_CHARS;
    if !(min..=max).contains(&char_len(&request.name)) {
        errors.push(FieldError::body("name", "Name must be between 2 and 50 characters"));
    }
    if !is_plausible_email(&request.email) {
        errors.push(FieldError::body("email", "Please provide a valid email"));
    }
    if request.password.chars().count() < PASSWORD_MIN_CHARS {
        errors.push(FieldError::body("password", "Password must be at least 6 characters"));
    }
    finish(errors)
}

pub fn validate_login(request: &LoginRequest) -> Result<(), SharedError> {
    let mut errors = Vec::new();
    if !is_plausible_email(&request.email) {
        errors.push(FieldError::body("email", "Please provide a valid email"));
    }
    if request.password.is_empty() {
        errors.push(FieldError::body("password", "Password is required"));
    }
    finish(errors)
}

pub fn validate_profile(update: &ProfileUpdate) -> Result<(), SharedError> {
    let mut errors = Vec::new();
    if let Some(name) = &update.name {
        let (min, max) = NAME_CHARS;
        if !(min..=max).contains(&char_len(name)) {
            errors.push(FieldError::body("name", "Name must be between 2 and 50 characters"));
        }
    }
    if let Some(bio) = &update.bio {
        if char_len(bio) > BIO_MAX_CHARS {
            errors.push(FieldError::body("bio", "Bio cannot exceed 500 characters"));
        }
    }
    finish(errors)
}

pub fn validate_post(input: &PostInput) -> Result<(), SharedError> {
    let mut errors = Vec::new();
    if !(1..=TITLE_MAX_CHARS).contains(&char_len(&input.title)) {
        errors.push(FieldError::body("title", "Title must be between 1 and 100 characters"));
    }
    if char_len(&input.content) < CONTENT_MIN_CHARS {
        errors.push(FieldError::body("content", "Content must be at least 10 characters"));
    }
    if !is_valid_id(&input.category) {
        errors.push(FieldError::body("category", "Valid category ID is required"));
    }
    if let Some(status) = &input.status {
        if status.parse::<PostStatus>().is_err() {
            errors.push(FieldError::body("status", "Status must be draft or published"));
        }
    }
    finish(errors)
}

pub fn validate_category(input: &CategoryInput) -> Result<(), SharedError> {
    let mut errors = Vec::new();
    let (min, max) = CATEGORY_NAME_CHARS;
    if !(min..=max).contains(&char_len(&input.name)) {
        errors.push(FieldError::body(
            "name",
            "Category name must be between 2 and 50 characters",
        ));
    }
    if let Some(description) = &input.description {
        if char_len(description) > CATEGORY_DESCRIPTION_MAX_CHARS {
            errors.push(FieldError::body(
                "description",
                "Description cannot exceed 200 characters",
            ));
        }
    }
    finish(errors)
}

fn check_comment_content(content: &str, errors: &mut Vec<FieldError>) {
    if !(1..=COMMENT_MAX_CHARS).contains(&char_len(content)) {
        errors.push(FieldError::body(
            "content",
            "Comment must be between 1 and 500 characters",
        ));
    }
}

pub fn validate_comment(input: &CommentInput) -> Result<(), SharedError> {
    let mut errors = Vec::new();
    check_comment_content(&input.content, &mut errors);
    if !is_valid_id(&input.post) {
        errors.push(FieldError::body("post", "Valid post ID is required"));
    }
    if let Some(parent) = &input.parent_comment {
        if !is_valid_id(parent) {
            errors.push(FieldError::body(
                "parentComment",
                "Parent comment must be a valid ID",
            ));
        }
    }
    finish(errors)
}

pub fn validate_comment_update(update: &CommentUpdate) -> Result<(), SharedError> {
    let mut errors = Vec::new();
    check_comment_content(&update.content, &mut errors);
    finish(errors)
}
