//! Workflow vocabularies and field validation for videos, queries and
//! annotations.
//!
//! Every validator returns `Result<_, String>` with a human-readable
//! message; handlers wrap it in [`CoreError::Validation`](crate::error::CoreError).

// ---------------------------------------------------------------------------
// Video status
// ---------------------------------------------------------------------------

pub const VIDEO_STATUS_PENDING: &str = "pending";
pub const VIDEO_STATUS_FINISHED: &str = "finished";

/// All valid video status values.
pub const VALID_VIDEO_STATUSES: &[&str] = &[VIDEO_STATUS_PENDING, VIDEO_STATUS_FINISHED];

// ---------------------------------------------------------------------------
// Query status
// ---------------------------------------------------------------------------

pub const QUERY_STATUS_UNVERIFIED: &str = "unverified";
pub const QUERY_STATUS_VERIFIED: &str = "verified";

/// All valid query status values.
pub const VALID_QUERY_STATUSES: &[&str] = &[QUERY_STATUS_UNVERIFIED, QUERY_STATUS_VERIFIED];

// ---------------------------------------------------------------------------
// Annotation flag
// ---------------------------------------------------------------------------

pub const ANNOTATION_UNANNOTATED: &str = "unannotated";
pub const ANNOTATION_ANNOTATED: &str = "annotated";

/// All valid `is_annotated` values.
pub const VALID_ANNOTATION_FLAGS: &[&str] = &[ANNOTATION_UNANNOTATED, ANNOTATION_ANNOTATED];

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

pub const QUERY_TYPE_IDENTITY: &str = "identity";
pub const QUERY_TYPE_STATIC: &str = "static";
pub const QUERY_TYPE_DYNAMIC: &str = "dynamic";
pub const QUERY_TYPE_CAUSAL: &str = "causal";
pub const QUERY_TYPE_SYNCHRONOUS: &str = "synchronous";
pub const QUERY_TYPE_SEQUENTIAL: &str = "sequential";
pub const QUERY_TYPE_PERIODICAL: &str = "periodical";
pub const QUERY_TYPE_NEGATIVE: &str = "negative";

/// The fixed query type vocabulary.
pub const VALID_QUERY_TYPES: &[&str] = &[
    QUERY_TYPE_IDENTITY,
    QUERY_TYPE_STATIC,
    QUERY_TYPE_DYNAMIC,
    QUERY_TYPE_CAUSAL,
    QUERY_TYPE_SYNCHRONOUS,
    QUERY_TYPE_SEQUENTIAL,
    QUERY_TYPE_PERIODICAL,
    QUERY_TYPE_NEGATIVE,
];

/// Type set assigned when a query is created without `query_types`.
pub fn default_query_types() -> Vec<String> {
    vec![QUERY_TYPE_NEGATIVE.to_string()]
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

fn validate_member(field: &str, value: &str, valid: &[&str]) -> Result<(), String> {
    if valid.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid {field} '{value}'. Must be one of: {}",
            valid.join(", ")
        ))
    }
}

/// Validate a required text field: must be non-blank after trimming.
pub fn validate_required_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    Ok(())
}

pub fn validate_video_status(status: &str) -> Result<(), String> {
    validate_member("video status", status, VALID_VIDEO_STATUSES)
}

pub fn validate_query_status(status: &str) -> Result<(), String> {
    validate_member("query status", status, VALID_QUERY_STATUSES)
}

pub fn validate_annotation_flag(flag: &str) -> Result<(), String> {
    validate_member("is_annotated", flag, VALID_ANNOTATION_FLAGS)
}

pub fn validate_query_type(query_type: &str) -> Result<(), String> {
    validate_member("query type", query_type, VALID_QUERY_TYPES)
}

/// Validate a duration in seconds.
pub fn validate_duration(duration: i32) -> Result<(), String> {
    if duration < 0 {
        return Err(format!("duration must be a non-negative integer, got {duration}"));
    }
    Ok(())
}

/// Validate and normalize a query type set.
///
/// Rejects an empty set and any value outside the vocabulary. Duplicates
/// are collapsed, keeping the first occurrence, so the stored set has set
/// semantics while preserving the caller's order.
pub fn normalize_query_types(types: &[String]) -> Result<Vec<String>, String> {
    if types.is_empty() {
        return Err("query_types must contain at least one type".to_string());
    }

    let mut normalized: Vec<String> = Vec::with_capacity(types.len());
    for t in types {
        validate_query_type(t)?;
        if !normalized.iter().any(|existing| existing == t) {
            normalized.push(t.clone());
        }
    }
    Ok(normalized)
}

/// Return `current` with `query_type` appended (no-op if already present).
pub fn add_query_type(current: &[String], query_type: &str) -> Result<Vec<String>, String> {
    validate_query_type(query_type)?;
    let mut next = current.to_vec();
    if !next.iter().any(|t| t == query_type) {
        next.push(query_type.to_string());
    }
    Ok(next)
}

/// Return `current` without `query_type`.
///
/// Rejects removing a type the set does not contain, and removing the
/// last remaining type.
pub fn remove_query_type(current: &[String], query_type: &str) -> Result<Vec<String>, String> {
    validate_query_type(query_type)?;
    if !current.iter().any(|t| t == query_type) {
        return Err(format!("Query does not have type '{query_type}'"));
    }
    let next: Vec<String> = current
        .iter()
        .filter(|t| t.as_str() != query_type)
        .cloned()
        .collect();
    if next.is_empty() {
        return Err(format!(
            "Cannot remove '{query_type}': a query must keep at least one type"
        ));
    }
    Ok(next)
}
