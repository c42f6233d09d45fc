//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, UserID, transaction::Kind};

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is an
    /// empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because
    /// if the non-empty invariant is violated it will cause incorrect
    /// behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated `#rrggbb` hex color used for the category's display swatch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Color(String);

impl Color {
    /// Create a color from a `#rrggbb` hex string.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidColor] if `color` is not a
    /// seven character hex color string.
    pub fn new(color: &str) -> Result<Self, Error> {
        let is_hex_color = color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit());

        if is_hex_color {
            Ok(Self(color.to_ascii_lowercase()))
        } else {
            Err(Error::InvalidColor(color.to_string()))
        }
    }

    /// Create a color without validation.
    ///
    /// The caller should ensure that the string is a `#rrggbb` hex color.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_string())
    }
}

impl AsRef<str> for Color {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a category.
pub type CategoryId = i64;

/// A user-defined label for grouping transactions (e.g., 'Groceries',
/// 'Salary').
///
/// The kind is fixed at creation. Reassigning a category to the other kind
/// while transactions reference it would silently recolor their totals, so
/// edits only touch the name and color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The user that owns this category.
    pub user_id: UserID,
    /// The display name.
    pub name: CategoryName,
    /// Whether the category labels income or expense transactions.
    pub kind: Kind,
    /// The color swatch shown next to the category.
    pub color: Color,
}

/// Form data for category creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    /// The display name.
    pub name: String,
    /// The income/expense kind. Ignored on edit.
    pub kind: Kind,
    /// The `#rrggbb` color swatch.
    pub color: String,
}
