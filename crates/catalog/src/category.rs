use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{CategoryId, DomainResult, Entity};

use crate::naming::normalize_name;

/// Low-stock cutoff applied when neither the product nor its category sets one.
///
/// Also the default for categories created without an explicit threshold, so
/// the two fallbacks can never drift apart.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 50;

/// Product category with its default low-stock threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    description: Option<String>,
    default_low_stock_threshold: u32,
    created_at: DateTime<Utc>,
}

/// Partial update of a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub default_low_stock_threshold: Option<u32>,
}

impl Category {
    /// Create a category; `threshold` falls back to `fallback_threshold`
    /// (normally the configured global default).
    pub fn new(
        name: &str,
        description: Option<String>,
        threshold: Option<u32>,
        fallback_threshold: u32,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: CategoryId::new(),
            name: normalize_name(name)?,
            description: clean(description),
            default_low_stock_threshold: threshold.unwrap_or(fallback_threshold),
            created_at,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn default_low_stock_threshold(&self) -> u32 {
        self.default_low_stock_threshold
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn apply_patch(&mut self, patch: CategoryPatch) -> DomainResult<()> {
        if let Some(name) = patch.name {
            self.name = normalize_name(&name)?;
        }
        if let Some(description) = patch.description {
            self.description = clean(description);
        }
        if let Some(threshold) = patch.default_low_stock_threshold {
            self.default_low_stock_threshold = threshold;
        }
        Ok(())
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

fn clean(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
