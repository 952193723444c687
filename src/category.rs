//! Market categories, the "All" view sentinel, and the user's category selection.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ALL_VIEW_SENTINEL: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Politics,
    Crypto,
    Sports,
    Entertainment,
    Science,
    Economics,
    Other,
}

pub const ALL_CATEGORIES: [Category; 7] = [
    Category::Politics,
    Category::Crypto,
    Category::Sports,
    Category::Entertainment,
    Category::Science,
    Category::Economics,
    Category::Other,
];

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Politics => "Politics",
            Self::Crypto => "Crypto",
            Self::Sports => "Sports",
            Self::Entertainment => "Entertainment",
            Self::Science => "Science",
            Self::Economics => "Economics",
            Self::Other => "Other",
        }
    }

    /// Position in [`ALL_CATEGORIES`], used for stable display ordering.
    pub fn ordinal(self) -> usize {
        ALL_CATEGORIES
            .iter()
            .position(|entry| *entry == self)
            .unwrap_or(ALL_CATEGORIES.len())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("unsupported category: {0}")]
    UnsupportedCategory(String),
    #[error("category view must not be empty")]
    EmptyView,
}

pub fn parse_category(input: &str) -> Result<Category, CategoryError> {
    match input.trim() {
        "Politics" => Ok(Category::Politics),
        "Crypto" => Ok(Category::Crypto),
        "Sports" => Ok(Category::Sports),
        "Entertainment" => Ok(Category::Entertainment),
        "Science" => Ok(Category::Science),
        "Economics" => Ok(Category::Economics),
        "Other" => Ok(Category::Other),
        other => Err(CategoryError::UnsupportedCategory(other.to_string())),
    }
}

/// Which slice of markets the server is asked for.
///
/// `Named` carries the raw label so that a value outside [`ALL_CATEGORIES`]
/// still reaches the server unchanged; the server decides how to match it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "category", rename_all = "snake_case")]
pub enum CategoryView {
    #[default]
    All,
    Named(String),
}

impl CategoryView {
    pub fn named(category: Category) -> Self {
        Self::Named(category.as_str().to_string())
    }

    pub fn server_filter(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Named(label) => Some(label.as_str()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL_VIEW_SENTINEL,
            Self::Named(label) => label.as_str(),
        }
    }
}

impl fmt::Display for CategoryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn parse_category_view(input: &str) -> Result<CategoryView, CategoryError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CategoryError::EmptyView);
    }
    if trimmed == ALL_VIEW_SENTINEL {
        Ok(CategoryView::All)
    } else {
        Ok(CategoryView::Named(trimmed.to_string()))
    }
}

/// Ordered, de-duplicated set of categories the user wants to see.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySelection {
    categories: Vec<Category>,
}

impl CategorySelection {
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut out: Vec<Category> = Vec::new();
        for category in categories {
            if !out.contains(&category) {
                out.push(category);
            }
        }
        Self { categories: out }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn parse_list(raw: &str) -> Result<Self, CategoryError> {
        let parsed = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(parse_category)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(parsed))
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.categories.iter().any(|entry| entry.as_str() == label)
    }

    /// The views a user can pick from: the "All" sentinel followed by each
    /// selected category.
    pub fn view_choices(&self) -> Vec<CategoryView> {
        std::iter::once(CategoryView::All)
            .chain(self.categories.iter().copied().map(CategoryView::named))
            .collect()
    }
}

pub fn default_selection() -> CategorySelection {
    CategorySelection::new([Category::Politics, Category::Crypto])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_category_accepts_every_known_label() {
        for category in ALL_CATEGORIES {
            assert_eq!(parse_category(category.as_str()), Ok(category));
        }
        assert_eq!(
            parse_category("Weather"),
            Err(CategoryError::UnsupportedCategory("Weather".to_string()))
        );
    }

    #[test]
    fn view_sentinel_maps_to_all_and_other_labels_pass_through() {
        assert_eq!(parse_category_view("All"), Ok(CategoryView::All));
        assert_eq!(
            parse_category_view("Crypto"),
            Ok(CategoryView::Named("Crypto".to_string()))
        );
        assert_eq!(
            parse_category_view("Weather"),
            Ok(CategoryView::Named("Weather".to_string()))
        );
        assert_eq!(parse_category_view("  "), Err(CategoryError::EmptyView));
        assert_eq!(CategoryView::All.server_filter(), None);
        assert_eq!(
            CategoryView::named(Category::Sports).server_filter(),
            Some("Sports")
        );
    }

    #[test]
    fn selection_dedups_and_keeps_order() {
        let selection = CategorySelection::parse_list("Crypto, Politics,Crypto,,").unwrap();
        assert_eq!(
            selection.categories(),
            &[Category::Crypto, Category::Politics]
        );
        assert!(selection.contains_label("Politics"));
        assert!(!selection.contains_label("Sports"));
    }

    #[test]
    fn empty_list_is_an_empty_selection() {
        let selection = CategorySelection::parse_list("").unwrap();
        assert!(selection.is_empty());
        assert!(CategorySelection::parse_list("Crypto,Bogus").is_err());
    }

    #[test]
    fn view_choices_start_with_all() {
        let choices = default_selection().view_choices();
        assert_eq!(
            choices,
            vec![
                CategoryView::All,
                CategoryView::Named("Politics".to_string()),
                CategoryView::Named("Crypto".to_string()),
            ]
        );
    }
}
