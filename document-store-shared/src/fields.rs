//! Field names of the student documents stored in the index.
//!
//! These identifiers are fixed: existing indices were written with exactly
//! these names, so they must not be renamed.

pub const NAME: &str = "name";
pub const AGE: &str = "age";
pub const SCORE: &str = "score";
pub const CLASS: &str = "class";
pub const CREATED_AT: &str = "createdAt";

/// All known student fields, in mapping order.
pub const ALL: [&str; 5] = [NAME, AGE, SCORE, CLASS, CREATED_AT];
