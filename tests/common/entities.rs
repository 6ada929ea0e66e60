use uuid::Uuid;

/// Sample Product entity for testing
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub amount: i64,
}

impl Product {
    pub fn new(amount: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
        }
    }
}

/// Sample Order entity for testing, references a product
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub product_id: Uuid,
    pub amount: i64,
}

impl Order {
    pub fn new(product_id: Uuid, amount: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            amount,
        }
    }
}
