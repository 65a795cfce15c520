//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Author of a conversation message.
///
/// # Examples
///
/// ```
/// use vignette_core::Role;
///
/// assert_ne!(Role::User, Role::Assistant);
/// assert_eq!(format!("{}", Role::System), "System");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions prepended when talking to the language model
    System,
    /// Messages typed by the person exploring history
    User,
    /// Replies from the language model
    Assistant,
}
