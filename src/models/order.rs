use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_id: String,
    pub title: String,
    pub quantity: u32,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub placed_at: String,
}

impl Order {
    pub fn new(items: Vec<OrderItem>) -> Self {
        let total = items
            .iter()
            .map(|item| item.unit_price * f64::from(item.quantity))
            .sum();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            items,
            total,
            placed_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_total_sums_line_items() {
        let order = Order::new(vec![
            OrderItem {
                item_id: "b1".into(),
                title: "Bhagavad Gita".into(),
                quantity: 2,
                unit_price: 150.0,
            },
            OrderItem {
                item_id: "b2".into(),
                title: "Ramcharitmanas".into(),
                quantity: 1,
                unit_price: 299.0,
            },
        ]);
        assert_eq!(order.total, 599.0);
        assert!(!order.id.is_empty());
    }
}
