//! Goods catalogue and inventories.
//!
//! Cities, merchants and storage buildings all hold goods through the
//! [`GoodStore`] trait. [`SimpleGoodStore`] is the only implementation the
//! core needs: a per-kind quantity with a per-kind capacity and an optional
//! global ceiling.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every tradeable good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoodType {
    Wheat,
    Fish,
    Meat,
    Fruit,
    Vegetable,
    Olive,
    Grape,
    Oil,
    Wine,
    Timber,
    Furniture,
    Clay,
    Pottery,
    Iron,
    Weapon,
    Marble,
    Denaries,
}

impl GoodType {
    pub const ALL: [GoodType; 17] = [
        GoodType::Wheat,
        GoodType::Fish,
        GoodType::Meat,
        GoodType::Fruit,
        GoodType::Vegetable,
        GoodType::Olive,
        GoodType::Grape,
        GoodType::Oil,
        GoodType::Wine,
        GoodType::Timber,
        GoodType::Furniture,
        GoodType::Clay,
        GoodType::Pottery,
        GoodType::Iron,
        GoodType::Weapon,
        GoodType::Marble,
        GoodType::Denaries,
    ];

    /// Food goods are kept in granaries rather than warehouses.
    pub fn is_food(&self) -> bool {
        matches!(
            self,
            GoodType::Wheat
                | GoodType::Fish
                | GoodType::Meat
                | GoodType::Fruit
                | GoodType::Vegetable
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            GoodType::Wheat => "wheat",
            GoodType::Fish => "fish",
            GoodType::Meat => "meat",
            GoodType::Fruit => "fruit",
            GoodType::Vegetable => "vegetable",
            GoodType::Olive => "olive",
            GoodType::Grape => "grape",
            GoodType::Oil => "oil",
            GoodType::Wine => "wine",
            GoodType::Timber => "timber",
            GoodType::Furniture => "furniture",
            GoodType::Clay => "clay",
            GoodType::Pottery => "pottery",
            GoodType::Iron => "iron",
            GoodType::Weapon => "weapon",
            GoodType::Marble => "marble",
            GoodType::Denaries => "denaries",
        }
    }
}

impl std::fmt::Display for GoodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A quantity of one good, optionally bounded by a capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodStock {
    pub kind: GoodType,
    pub quantity: u32,
    pub capacity: u32,
}

impl GoodStock {
    pub fn new(kind: GoodType, quantity: u32, capacity: u32) -> Self {
        Self {
            kind,
            quantity,
            capacity,
        }
    }

    /// A stock holding `quantity` with no headroom.
    pub fn of(kind: GoodType, quantity: u32) -> Self {
        Self::new(kind, quantity, quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }
}

/// Abstract inventory keyed by good kind.
pub trait GoodStore {
    fn quantity(&self, kind: GoodType) -> u32;

    fn capacity(&self, kind: GoodType) -> u32;

    fn set_capacity(&mut self, kind: GoodType, capacity: u32);

    /// Sum of all quantities held, saturating at `u32::MAX`.
    fn total(&self) -> u32;

    /// Room left for `kind`, honouring any global ceiling.
    fn free_qty(&self, kind: GoodType) -> u32;

    /// Move up to `amount` from `stock` into the store (`None` = everything).
    ///
    /// Returns the quantity actually stored; `stock` is debited by the same amount.
    fn store(&mut self, stock: &mut GoodStock, amount: Option<u32>) -> u32;

    /// Take up to `amount` of `kind` out of the store.
    fn retrieve(&mut self, kind: GoodType, amount: u32) -> u32;

    fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Per-kind inventory with an optional overall ceiling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleGoodStore {
    stocks: BTreeMap<GoodType, GoodStock>,
    /// Overall ceiling across all kinds (`None` = unbounded).
    #[serde(default)]
    max_qty: Option<u32>,
}

impl SimpleGoodStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store bounded to `max_qty` units in total, every kind allowed up to that.
    pub fn with_max_qty(max_qty: u32) -> Self {
        let mut store = Self {
            stocks: BTreeMap::new(),
            max_qty: Some(max_qty),
        };
        for kind in GoodType::ALL {
            store.set_capacity(kind, max_qty);
        }
        store
    }

    pub fn max_qty(&self) -> Option<u32> {
        self.max_qty
    }

    /// Non-empty or capacity-bearing stocks in catalogue order.
    pub fn stocks(&self) -> impl Iterator<Item = &GoodStock> + '_ {
        self.stocks.values()
    }

    fn stock_mut(&mut self, kind: GoodType) -> &mut GoodStock {
        self.stocks
            .entry(kind)
            .or_insert_with(|| GoodStock::new(kind, 0, 0))
    }
}

impl GoodStore for SimpleGoodStore {
    fn quantity(&self, kind: GoodType) -> u32 {
        self.stocks.get(&kind).map_or(0, |s| s.quantity)
    }

    fn capacity(&self, kind: GoodType) -> u32 {
        self.stocks.get(&kind).map_or(0, |s| s.capacity)
    }

    fn set_capacity(&mut self, kind: GoodType, capacity: u32) {
        self.stock_mut(kind).capacity = capacity;
    }

    fn total(&self) -> u32 {
        self.stocks
            .values()
            .fold(0u32, |acc, s| acc.saturating_add(s.quantity))
    }

    fn free_qty(&self, kind: GoodType) -> u32 {
        let per_kind = self.capacity(kind).saturating_sub(self.quantity(kind));
        match self.max_qty {
            Some(max) => per_kind.min(max.saturating_sub(self.total())),
            None => per_kind,
        }
    }

    fn store(&mut self, stock: &mut GoodStock, amount: Option<u32>) -> u32 {
        let wanted = amount.unwrap_or(stock.quantity).min(stock.quantity);
        let stored = wanted.min(self.free_qty(stock.kind));
        if stored > 0 {
            self.stock_mut(stock.kind).quantity += stored;
            stock.quantity -= stored;
        }
        stored
    }

    fn retrieve(&mut self, kind: GoodType, amount: u32) -> u32 {
        let Some(stock) = self.stocks.get_mut(&kind) else {
            return 0;
        };
        let taken = amount.min(stock.quantity);
        stock.quantity -= taken;
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_respects_capacity() {
        let mut store = SimpleGoodStore::new();
        store.set_capacity(GoodType::Wheat, 100);

        let mut stock = GoodStock::of(GoodType::Wheat, 150);
        let stored = store.store(&mut stock, None);
        assert_eq!(stored, 100);
        assert_eq!(stock.quantity, 50);
        assert_eq!(store.quantity(GoodType::Wheat), 100);
        assert_eq!(store.free_qty(GoodType::Wheat), 0);
    }

    #[test]
    fn test_store_partial_amount() {
        let mut store = SimpleGoodStore::new();
        store.set_capacity(GoodType::Oil, 500);
        let mut stock = GoodStock::of(GoodType::Oil, 300);
        assert_eq!(store.store(&mut stock, Some(120)), 120);
        assert_eq!(stock.quantity, 180);
    }

    #[test]
    fn test_no_capacity_rejects() {
        let mut store = SimpleGoodStore::new();
        let mut stock = GoodStock::of(GoodType::Marble, 10);
        assert_eq!(store.store(&mut stock, None), 0);
        assert_eq!(stock.quantity, 10);
    }

    #[test]
    fn test_global_ceiling() {
        let mut store = SimpleGoodStore::with_max_qty(100);
        let mut wheat = GoodStock::of(GoodType::Wheat, 80);
        let mut fish = GoodStock::of(GoodType::Fish, 80);
        assert_eq!(store.store(&mut wheat, None), 80);
        assert_eq!(store.store(&mut fish, None), 20);
        assert_eq!(store.total(), 100);
        assert_eq!(store.free_qty(GoodType::Meat), 0);
    }

    #[test]
    fn test_total_saturates_when_unbounded() {
        let mut store = SimpleGoodStore::new();
        for kind in [GoodType::Wheat, GoodType::Fish, GoodType::Meat] {
            store.set_capacity(kind, u32::MAX);
            store.store(&mut GoodStock::of(kind, u32::MAX / 2), None);
        }
        assert_eq!(store.total(), u32::MAX);
        assert!(!store.is_empty());
    }

    #[test]
    fn test_retrieve() {
        let mut store = SimpleGoodStore::new();
        store.set_capacity(GoodType::Wine, 50);
        store.store(&mut GoodStock::of(GoodType::Wine, 30), None);
        assert_eq!(store.retrieve(GoodType::Wine, 50), 30);
        assert_eq!(store.retrieve(GoodType::Iron, 5), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_food_classification() {
        assert!(GoodType::Wheat.is_food());
        assert!(!GoodType::Pottery.is_food());
        assert_eq!(GoodType::ALL.len(), 17);
    }
}
