use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use crate::app_system::StorefrontError;
use crate::domain::{line_total, parse_quantity, Product, ProductSnapshot, UserId, ValidationError};

/// A shopper's in-progress selection. Nothing is stored for a cart, so an
/// expired one needs no cleanup.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub buyer: UserId,
    pub product: ProductSnapshot,
    /// Stock seen when the cart was opened; only used for the early hint.
    pub stock_seen: u32,
    pub quantity: u32,
    pub opened_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Cart {
    /// Starts a cart with quantity 1.
    ///
    /// # Errors
    /// `InsufficientStock` if the product is sold out.
    pub fn open(buyer: UserId, product: &Product, timeout: Duration, now: DateTime<Utc>) -> Result<Self, StorefrontError> {
        if !product.in_stock() {
            return Err(StorefrontError::InsufficientStock { requested: 1, available: 0 });
        }
        Ok(Self {
            buyer,
            product: product.snapshot(),
            stock_seen: product.stock,
            quantity: 1,
            opened_at: now,
            expires_at: now + timeout,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn ensure_active(&self, now: DateTime<Utc>) -> Result<(), StorefrontError> {
        if self.is_expired(now) {
            return Err(StorefrontError::CartExpired);
        }
        Ok(())
    }

    /// Applies the quantity form. Each interaction restarts the inactivity
    /// window.
    pub fn set_quantity_input(&mut self, input: &str, now: DateTime<Utc>) -> Result<u32, StorefrontError> {
        self.ensure_active(now)?;
        let quantity = parse_quantity(input)?;
        if quantity > self.stock_seen {
            return Err(StorefrontError::InsufficientStock {
                requested: quantity,
                available: self.stock_seen,
            });
        }
        let timeout = self.expires_at - self.opened_at;
        self.quantity = quantity;
        self.opened_at = now;
        self.expires_at = now + timeout;
        Ok(quantity)
    }

    pub fn total(&self) -> Result<Decimal, ValidationError> {
        line_total(self.product.unit_price, self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: u32) -> Product {
        Product {
            id: "product_1".to_string(),
            name: "Gems".to_string(),
            price: Decimal::new(1000, 2),
            stock,
            description: None,
            image_url: None,
            category_id: "category_1".to_string(),
            category_name: "Games".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_quantity_input_and_total() {
        let now = Utc::now();
        let mut cart = Cart::open(UserId(1), &product(5), Duration::minutes(30), now).unwrap();
        assert_eq!(cart.total(), Ok(Decimal::new(1000, 2)));

        assert_eq!(cart.set_quantity_input("3", now), Ok(3));
        assert_eq!(cart.total(), Ok(Decimal::new(3000, 2)));

        assert!(matches!(cart.set_quantity_input("0", now), Err(StorefrontError::Validation(_))));
        assert_eq!(
            cart.set_quantity_input("6", now),
            Err(StorefrontError::InsufficientStock { requested: 6, available: 5 })
        );
        assert_eq!(cart.quantity, 3);
    }

    #[test]
    fn test_expired_cart_rejects_interaction() {
        let now = Utc::now();
        let mut cart = Cart::open(UserId(1), &product(5), Duration::minutes(30), now).unwrap();
        let later = now + Duration::minutes(31);
        assert!(cart.is_expired(later));
        assert_eq!(cart.set_quantity_input("2", later), Err(StorefrontError::CartExpired));
    }

    #[test]
    fn test_sold_out_product_has_no_cart() {
        assert!(Cart::open(UserId(1), &product(0), Duration::minutes(30), Utc::now()).is_err());
    }
}
