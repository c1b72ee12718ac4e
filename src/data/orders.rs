use crate::data::KeyValueStore;
use crate::models::order::Order;

const ORDER_HISTORY_KEY: &str = "order_history";

/// Locally cached order history, most recent first. Soft-fail: missing or
/// corrupt data reads as an empty history.
pub fn load_history(store: &dyn KeyValueStore) -> Vec<Order> {
    let Some(raw) = store.get(ORDER_HISTORY_KEY) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(orders) => orders,
        Err(e) => {
            tracing::warn!(error = %e, "corrupt cached order history, treating as empty");
            Vec::new()
        }
    }
}

pub fn record_order(store: &dyn KeyValueStore, order: &Order) {
    let mut history = load_history(store);
    history.insert(0, order.clone());
    match serde_json::to_string(&history) {
        Ok(json) => store.set(ORDER_HISTORY_KEY, &json),
        Err(e) => tracing::warn!(error = %e, "failed to encode order history"),
    }
}

pub fn clear_history(store: &dyn KeyValueStore) {
    store.remove(ORDER_HISTORY_KEY);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryStore;
    use crate::models::order::OrderItem;

    fn sample_order(id_hint: &str) -> Order {
        Order::new(vec![OrderItem {
            item_id: id_hint.to_string(),
            title: "Hanuman Chalisa".to_string(),
            quantity: 1,
            unit_price: 99.0,
        }])
    }

    #[test]
    fn test_history_is_most_recent_first() {
        let store = MemoryStore::new();
        let first = sample_order("b1");
        let second = sample_order("b2");

        record_order(&store, &first);
        record_order(&store, &second);

        let history = load_history(&store);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1].id, first.id);
    }

    #[test]
    fn test_corrupt_history_reads_empty() {
        let store = MemoryStore::new();
        store.set(ORDER_HISTORY_KEY, "[[not json");
        assert!(load_history(&store).is_empty());
    }

    #[test]
    fn test_clear_history() {
        let store = MemoryStore::new();
        record_order(&store, &sample_order("b1"));
        clear_history(&store);
        assert!(load_history(&store).is_empty());
    }
}
