//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use huellitas_core::ProductId;

/// A catalog product (domain type).
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Unit price. Non-negative, two decimal places.
    pub price: Decimal,
    /// Units in stock. Non-negative.
    pub stock_quantity: i32,
    /// When the product was first created.
    pub created_at: DateTime<Utc>,
    /// When the product was last modified. The catalog lists newest first.
    pub updated_at: DateTime<Utc>,
}

/// Errors produced while validating product form input.
///
/// The `Display` strings are user-facing and shown back on the form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductInputError {
    #[error("El nombre es obligatorio")]
    EmptyName,
    #[error("El precio no es válido")]
    InvalidPrice,
    #[error("El precio no puede ser negativo")]
    NegativePrice,
    #[error("La cantidad en stock no es válida")]
    InvalidStock,
    #[error("La cantidad en stock no puede ser negativa")]
    NegativeStock,
}

/// Validated input for creating or editing a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock_quantity: i32,
}

impl ProductInput {
    /// Validate raw form fields into a `ProductInput`.
    ///
    /// Prices are normalized to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns the first failing field check; callers re-render the form
    /// with the error message.
    pub fn parse(
        name: &str,
        description: &str,
        price: &str,
        stock_quantity: &str,
    ) -> Result<Self, ProductInputError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProductInputError::EmptyName);
        }

        let mut price: Decimal = price
            .trim()
            .parse()
            .map_err(|_| ProductInputError::InvalidPrice)?;
        if price.is_sign_negative() {
            return Err(ProductInputError::NegativePrice);
        }
        price = price.round_dp(2);
        price.rescale(2);

        let stock_quantity: i32 = stock_quantity
            .trim()
            .parse()
            .map_err(|_| ProductInputError::InvalidStock)?;
        if stock_quantity < 0 {
            return Err(ProductInputError::NegativeStock);
        }

        Ok(Self {
            name: name.to_owned(),
            description: description.trim().to_owned(),
            price,
            stock_quantity,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn valid_input_parses_and_normalizes() {
        let input = ProductInput::parse(
            " Concentrado premium para perros ",
            "Alimento seco de alta calidad.",
            "75000",
            "150",
        )
        .unwrap();
        assert_eq!(input.name, "Concentrado premium para perros");
        assert_eq!(input.price.to_string(), "75000.00");
        assert_eq!(input.stock_quantity, 150);
    }

    #[test]
    fn name_is_required() {
        let err = ProductInput::parse("  ", "", "1000", "1").unwrap_err();
        assert_eq!(err, ProductInputError::EmptyName);
    }

    #[test]
    fn price_must_be_a_non_negative_decimal() {
        let err = ProductInput::parse("Collar", "", "gratis", "1").unwrap_err();
        assert_eq!(err, ProductInputError::InvalidPrice);

        let err = ProductInput::parse("Collar", "", "-5", "1").unwrap_err();
        assert_eq!(err, ProductInputError::NegativePrice);

        assert!(ProductInput::parse("Collar", "", "0", "1").is_ok());
    }

    #[test]
    fn stock_must_be_a_non_negative_integer() {
        let err = ProductInput::parse("Collar", "", "1000", "muchos").unwrap_err();
        assert_eq!(err, ProductInputError::InvalidStock);

        let err = ProductInput::parse("Collar", "", "1000", "-1").unwrap_err();
        assert_eq!(err, ProductInputError::NegativeStock);
    }

    #[test]
    fn price_rounds_to_two_decimals() {
        let input = ProductInput::parse("Collar", "", "19.999", "1").unwrap();
        assert_eq!(input.price.to_string(), "20.00");
    }
}
