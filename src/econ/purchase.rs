//! The store checkout path: catalog lookup, rank gating, affordability and
//! ownership checks, then a debit + inventory append committed as one unit.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::catalog::{Catalog, StoreItem};
use crate::econ::rank::{self, RankTier};
use crate::model::{ItemId, UserId};
use crate::sync::{PathOp, SyncHandle};

pub type PurchaseResult<T> = core::result::Result<T, PurchaseError>;

#[derive(Debug, Error, PartialEq)]
pub enum PurchaseError {
    #[error("item '{0}' is not in the catalog")]
    InvalidItem(ItemId),

    #[error("rank {required:?} required, current rank is {current:?}")]
    RankLocked {
        required: RankTier,
        current: RankTier,
    },

    #[error("price is {price} gold, balance is {balance}")]
    InsufficientFunds { price: f64, balance: f64 },

    #[error("item '{0}' is already owned")]
    AlreadyOwned(ItemId),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseReceipt {
    pub item: StoreItem,
    pub new_balance: f64,
}

#[derive(Clone)]
pub struct PurchaseEngine {
    sync: SyncHandle,
    catalog: &'static Catalog,
}

impl PurchaseEngine {
    pub fn new(sync: SyncHandle) -> Self {
        Self {
            sync,
            catalog: Catalog::global(),
        }
    }

    /// Buy `item_id` for `id`.
    ///
    /// All four gates are evaluated and both mutations (score debit,
    /// inventory append) are applied under a single cache commit, so the
    /// remote side receives them as one batched update: there is no window
    /// in which the user is debited without the item.
    #[instrument(skip(self), fields(user = %id, item = %item_id))]
    pub fn purchase(&self, id: &UserId, item_id: &ItemId) -> PurchaseResult<PurchaseReceipt> {
        let item = self
            .catalog
            .get(item_id)
            .ok_or_else(|| PurchaseError::InvalidItem(item_id.clone()))?
            .clone();

        self.sync.write_through(|tree, ops| {
            let balance = tree.score(id);
            let current = rank::resolve(balance);

            if current.ordinal() < item.min_rank.ordinal() {
                return Err(PurchaseError::RankLocked {
                    required: item.min_rank,
                    current,
                });
            }
            if balance < item.price {
                return Err(PurchaseError::InsufficientFunds {
                    price: item.price,
                    balance,
                });
            }

            if tree.ensure_profile(id) {
                ops.push(PathOp::set(format!("users/{id}"), tree.profile_mut(id)));
            }
            let profile = tree.profile_mut(id);
            if profile.owns(item_id) {
                return Err(PurchaseError::AlreadyOwned(item_id.clone()));
            }

            profile.inventory.push(item_id.clone());
            ops.push(PathOp::set(
                format!("users/{id}/inventory"),
                &profile.inventory,
            ));

            let new_balance = balance - item.price;
            tree.set_score(id, new_balance);
            ops.push(PathOp::set(format!("scores/{id}"), &new_balance));

            info!(price = item.price, new_balance, "purchase committed");
            Ok(PurchaseReceipt {
                item: item.clone(),
                new_balance,
            })
        })
    }
}
