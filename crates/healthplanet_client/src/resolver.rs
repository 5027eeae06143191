//! Tag code to field lookup.
//!
//! The inverted index for every category is built once, on first use, and is
//! read-only afterwards so it can be shared by concurrent fetches.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::HealthPlanetError;
use crate::schema::{Category, FieldSpec};

type TagIndex = HashMap<&'static str, &'static FieldSpec>;

static INDEX: LazyLock<HashMap<Category, TagIndex>> = LazyLock::new(|| {
    Category::ALL
        .iter()
        .map(|&category| {
            let by_tag: TagIndex = category.schema().iter().map(|f| (f.tag, f)).collect();
            (category, by_tag)
        })
        .collect()
});

/// Look up the schema field a tag code belongs to.
pub fn resolve(category: Category, tag: &str) -> Result<&'static FieldSpec, HealthPlanetError> {
    INDEX
        .get(&category)
        .and_then(|by_tag| by_tag.get(tag).copied())
        .ok_or_else(|| HealthPlanetError::UnknownTag {
            category,
            tag: tag.to_string(),
        })
}
