//! Static configuration: the cosmetic store catalog and the shift roster.
//! Both are read-only data embedded at compile time, not part of the
//! replicated ledger.

pub mod shifts;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::econ::rank::RankTier;
use crate::model::{ItemId, ItemKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreItem {
    pub id: ItemId,
    pub kind: ItemKind,
    pub name: String,
    pub blurb: String,
    pub price: f64,
    pub min_rank: RankTier,
    /// Cosmetic descriptor handed straight to the display layer.
    pub css_class: String,
}

pub struct Catalog {
    items: Vec<StoreItem>,
    by_id: BTreeMap<ItemId, usize>,
}

static CATALOG: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::from_json(include_str!("items.json")).expect("embedded catalog is valid")
});

impl Catalog {
    pub fn global() -> &'static Catalog {
        &CATALOG
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        let items: Vec<StoreItem> = serde_json::from_str(raw)?;
        let by_id = items
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.id.clone(), idx))
            .collect();
        Ok(Self { items, by_id })
    }

    pub fn get(&self, id: &ItemId) -> Option<&StoreItem> {
        self.by_id.get(id).map(|idx| &self.items[*idx])
    }

    pub fn items(&self) -> &[StoreItem] {
        &self.items
    }
}
