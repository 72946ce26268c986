//! Cache key construction
//!
//! Keys are `<kind>:<id>` for single entities and `<kind>:all` for the
//! collection. Ids are integers, so the two shapes never collide.

use std::fmt;

use crate::models::ItemId;

/// Entity kind tag used as the key prefix.
pub const ITEM_KIND: &str = "item";

const COLLECTION_SUFFIX: &str = "all";

/// Renders the cache key for `kind`, either the collection (`None`) or one entity.
pub fn render_key(kind: &str, id: Option<ItemId>) -> String {
    match id {
        Some(id) => format!("{kind}:{id}"),
        None => format!("{kind}:{COLLECTION_SUFFIX}"),
    }
}

/// One of the two cached shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The full item listing
    AllItems,
    /// A single item by id
    Item(ItemId),
}

impl CacheKey {
    pub fn all() -> Self {
        CacheKey::AllItems
    }

    pub fn item(id: ItemId) -> Self {
        CacheKey::Item(id)
    }

    /// Id of the entity this key refers to, if any.
    pub fn id(&self) -> Option<ItemId> {
        match self {
            CacheKey::AllItems => None,
            CacheKey::Item(id) => Some(*id),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_key(ITEM_KIND, self.id()))
    }
}
