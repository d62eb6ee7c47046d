//! Order registry - owns every stored order
//!
//! Storing is first-write-wins: a second order with an id already present
//! is dropped and the original stays in place.

use ahash::AHashMap;

use crate::core::error::{CommanderError, Result};
use crate::core::types::UnitTag;
use crate::order::order::{Order, OrderId};

#[derive(Debug, Default)]
pub struct OrderRegistry {
    orders: AHashMap<OrderId, Order>,
    last_stored: Option<OrderId>,
}

impl OrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an order, returning its id; a no-op if the id is already present
    pub fn store(&mut self, order: Order) -> OrderId {
        let id = order.id();
        if self.orders.contains_key(&id) {
            tracing::trace!(order = %id, "order already stored");
            return id;
        }
        tracing::debug!(order = %id, ability = %order.ability(), assignee = ?order.assignee().kind(), "order stored");
        self.orders.insert(id, order);
        self.last_stored = Some(id);
        id
    }

    /// Most recently stored order
    pub fn get_last_stored(&self) -> Option<&Order> {
        self.last_stored.and_then(|id| self.orders.get(&id))
    }

    pub fn get(&self, id: OrderId) -> Result<&Order> {
        self.orders.get(&id).ok_or(CommanderError::OrderNotFound(id))
    }

    pub fn get_mut(&mut self, id: OrderId) -> Result<&mut Order> {
        self.orders.get_mut(&id).ok_or(CommanderError::OrderNotFound(id))
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.contains_key(&id)
    }

    /// Store `inner` and bundle it onto `outer`
    ///
    /// Nothing is stored when `outer` is missing, locked or already bundled.
    pub fn attach_bundle(&mut self, outer: OrderId, inner: Order) -> Result<OrderId> {
        let inner_id = inner.id();
        self.get_mut(outer)?.bundle_directive(inner_id)?;
        self.store(inner);
        Ok(inner_id)
    }

    /// Remove `tag` from `order`'s assigned set, if both exist
    pub fn unassign(&mut self, order: OrderId, tag: UnitTag) -> bool {
        self.orders.get_mut(&order).is_some_and(|o| o.unassign_agent(tag))
    }

    /// Remove `tag` from every order that still lists it
    pub fn release_agent(&mut self, tag: UnitTag) -> usize {
        self.orders.values_mut().map(|o| o.unassign_agent(tag)).filter(|removed| *removed).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> + '_ {
        self.orders.values()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AbilityId, Point2, UnitTypeId};

    fn pylon_order() -> Order {
        Order::unit_type_at(UnitTypeId::PROTOSS_PROBE, AbilityId::BUILD_PYLON, Point2::new(1.0, 1.0))
    }

    #[test]
    fn test_store_is_first_write_wins() {
        let mut registry = OrderRegistry::new();
        let original = pylon_order();
        let mut imposter = original.clone();
        imposter.allow_multiple(true).unwrap();

        let id = registry.store(original);
        assert_eq!(registry.store(imposter), id);
        assert_eq!(registry.len(), 1);
        assert!(!registry.get(id).unwrap().allows_multiple());
    }

    #[test]
    fn test_last_stored_tracks_new_ids() {
        let mut registry = OrderRegistry::new();
        let first = registry.store(pylon_order());
        let second = registry.store(pylon_order());
        assert_ne!(first, second);
        assert_eq!(registry.get_last_stored().map(|o| o.id()), Some(second));

        // A duplicate store does not move the marker
        let dup = registry.get(first).unwrap().clone();
        registry.store(dup);
        assert_eq!(registry.get_last_stored().map(|o| o.id()), Some(second));
    }

    #[test]
    fn test_missing_order() {
        let registry = OrderRegistry::new();
        assert!(matches!(registry.get(OrderId(u64::MAX)), Err(CommanderError::OrderNotFound(_))));
    }

    #[test]
    fn test_attach_bundle_leaves_registry_untouched_on_failure() {
        let mut registry = OrderRegistry::new();
        let outer = registry.store(pylon_order());

        let inner = registry.attach_bundle(outer, Order::harvest_minerals_near(Point2::new(0.0, 0.0))).unwrap();
        assert_eq!(registry.get(outer).unwrap().bundle(), Some(inner));
        assert_eq!(registry.len(), 2);

        let rejected = Order::harvest_minerals_near(Point2::new(0.0, 0.0));
        let rejected_id = rejected.id();
        assert!(matches!(
            registry.attach_bundle(outer, rejected),
            Err(CommanderError::BundleOccupied(_))
        ));
        assert!(!registry.contains(rejected_id));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_release_agent_everywhere() {
        let mut registry = OrderRegistry::new();
        let a = registry.store(pylon_order());
        let b = registry.store(pylon_order());
        registry.get_mut(a).unwrap().assign_agent(UnitTag(3));
        registry.get_mut(b).unwrap().assign_agent(UnitTag(3));

        assert_eq!(registry.release_agent(UnitTag(3)), 2);
        assert!(!registry.get(a).unwrap().has_assigned_agent());
        assert!(!registry.get(b).unwrap().has_assigned_agent());
        assert_eq!(registry.release_agent(UnitTag(3)), 0);
    }
}
