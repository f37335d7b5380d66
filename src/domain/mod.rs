use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::PaginationConfig;

/// Role of a member in the wider application
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    /// Members allowed to delete or modify any custom recipe
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub member_id: Uuid,
    pub nickname: String,
    pub role: Role,
}

/// Base cocktail from the catalog
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cocktail {
    pub id: i64,
    pub name: String,
    /// Localized (Korean) name
    pub kr_name: String,
    pub image: String,
    /// Number of members who marked this cocktail as a favorite
    pub heart_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub image: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    pub id: i64,
    pub name: String,
}

/// Member-authored variant of a base cocktail
#[derive(Clone, Debug, PartialEq)]
pub struct CustomRecipe {
    pub id: Uuid,
    /// Owning member
    ///
    /// Never changes after creation.
    pub member_id: Uuid,
    /// Base cocktail
    ///
    /// Never changes after creation.
    pub cocktail_id: i64,
    pub name: String,
    pub comment: String,
    pub recipe: String,
    pub summary: String,
    /// Whether non-owners may see this recipe
    pub open: bool,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CustomRecipe {
    pub fn is_owned_by(&self, member_id: Uuid) -> bool {
        self.member_id == member_id
    }

    /// Whether `viewer` may see this recipe in listings and details
    pub fn is_visible_to(&self, viewer: Uuid) -> bool {
        self.open || self.is_owned_by(viewer)
    }
}

/// Fields needed to store a new [`CustomRecipe`]
///
/// The identifier and timestamps are assigned by the store.
#[derive(Clone, Debug, PartialEq)]
pub struct NewCustomRecipe {
    pub member_id: Uuid,
    pub cocktail_id: i64,
    pub name: String,
    pub comment: String,
    pub recipe: String,
    pub summary: String,
    pub open: bool,
    pub image: String,
}

/// Mutable fields of a [`CustomRecipe`], applied as a single update
#[derive(Clone, Debug, PartialEq)]
pub struct CustomRecipePatch {
    pub name: String,
    pub summary: String,
    pub comment: String,
    pub recipe: String,
    pub image: String,
    pub open: bool,
}

/// One ingredient line of a custom recipe
#[derive(Clone, Debug, PartialEq)]
pub struct CustomIngredient {
    pub id: Uuid,
    pub custom_id: Uuid,
    pub ingredient_id: i64,
    pub unit_id: i64,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewCustomIngredient {
    pub custom_id: Uuid,
    pub ingredient_id: i64,
    pub unit_id: i64,
    pub amount: f64,
}

/// Zero-based page selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// Build a page request, clamping the page size to the configured bounds
    ///
    /// A size of 0 falls back to the configured default size.
    pub fn new(page: u32, size: u32, config: &PaginationConfig) -> Self {
        let max = config.max_page_size.max(1);
        let size = match size {
            0 => config.default_page_size,
            size => size,
        };
        Self {
            page,
            size: size.clamp(1, max),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize).saturating_mul(self.size as usize)
    }
}

/// A slice of a larger result set
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub request: PageRequest,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u32 {
        let size = u64::from(self.request.size.max(1));
        self.total_elements.div_ceil(size) as u32
    }

    /// One-based number of this page
    pub fn current_page(&self) -> u64 {
        u64::from(self.request.page) + 1
    }
}
