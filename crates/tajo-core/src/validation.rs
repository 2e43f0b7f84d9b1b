//! # Validation Module
//!
//! Business rule validation for incoming catalog and ledger payloads.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP adapter (out of scope)                                  │
//! │  ├── Schema shape, required/optional fields, numeric parsing           │
//! │  └── Maps typed failures to status codes                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (business rules on typed DTOs)                   │
//! │  ├── Field lengths, positivity, price exclusivity                      │
//! │  └── Runs before any storage work                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CutPriceInput, NewProduct, NewTicket, NewTicketItem, ProductPatch, TicketPatch};

const MAX_NAME_LEN: usize = 255;
const MAX_DESCRIPTION_LEN: usize = 500;
const MAX_CODE_LEN: usize = 128;
const MAX_PAYMENT_TYPE_LEN: usize = 100;

// =============================================================================
// Field Helpers
// =============================================================================

fn require_non_blank(field: &str, value: &str, max: usize) -> CoreResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        }
        .into());
    }

    check_len(field, value, max)
}

fn check_len(field: &str, value: &str, max: usize) -> CoreResult<()> {
    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }
        .into());
    }
    Ok(())
}

/// Non-negative check via the money constructor, so the failure carries
/// the standard `InvalidMonetaryValue` shape.
fn check_amount(value: Option<Decimal>) -> CoreResult<()> {
    Money::from_input(value).map(|_| ())
}

fn check_positive(field: &str, value: Decimal) -> CoreResult<()> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        }
        .into());
    }
    Ok(())
}

fn check_cut_inputs(cuts: &[CutPriceInput]) -> CoreResult<()> {
    for cut in cuts {
        check_amount(cut.price_per_kg)?;
        check_amount(cut.price_per_unit)?;
    }
    Ok(())
}

/// Whether any cut carries a real override price after the zero-or-absent
/// mapping. Zero entries count as absent here too.
fn any_priced_cut(cuts: &[CutPriceInput]) -> bool {
    cuts.iter().any(|cut| {
        matches!(Money::from_input(cut.price_per_kg), Ok(Some(_)))
            || matches!(Money::from_input(cut.price_per_unit), Ok(Some(_)))
    })
}

// =============================================================================
// Product Payloads
// =============================================================================

/// Validates a product creation payload.
///
/// ## Base price rule
/// After the zero-or-absent mapping, a new product carries **exactly one**
/// of `pricePerKg`/`pricePerUnit`, unless it declares no direct price at
/// all, in which case at least one of its cuts must carry an override
/// price (a pure cut-priced product).
pub fn validate_new_product(dto: &NewProduct) -> CoreResult<()> {
    require_non_blank("name", &dto.name, MAX_NAME_LEN)?;
    require_non_blank("baseUnitId", &dto.base_unit_id, MAX_CODE_LEN)?;

    if let Some(description) = &dto.description {
        check_len("description", description, MAX_DESCRIPTION_LEN)?;
    }
    if let Some(sku) = &dto.sku {
        require_non_blank("sku", sku, MAX_CODE_LEN)?;
    }
    if let Some(barcode) = &dto.barcode {
        require_non_blank("barcode", barcode, MAX_CODE_LEN)?;
    }

    let per_kg = Money::from_input(dto.price_per_kg)?;
    let per_unit = Money::from_input(dto.price_per_unit)?;

    match (per_kg, per_unit) {
        (Some(_), Some(_)) => return Err(ValidationError::AmbiguousBasePrice.into()),
        (None, None) => {
            let priced = dto
                .cuts
                .as_deref()
                .map(any_priced_cut)
                .unwrap_or(false);
            if !priced {
                return Err(ValidationError::UnpricedProduct.into());
            }
        }
        _ => {}
    }

    if let Some(cuts) = &dto.cuts {
        check_cut_inputs(cuts)?;
    }

    Ok(())
}

/// Validates a product update payload.
///
/// Field-level checks only; base-price exclusivity is a creation
/// invariant and an update may legitimately move the price from one
/// column to the other in two calls.
pub fn validate_product_patch(dto: &ProductPatch) -> CoreResult<()> {
    if let Some(name) = &dto.name {
        require_non_blank("name", name, MAX_NAME_LEN)?;
    }
    if let Some(description) = &dto.description {
        check_len("description", description, MAX_DESCRIPTION_LEN)?;
    }
    if let Some(sku) = &dto.sku {
        require_non_blank("sku", sku, MAX_CODE_LEN)?;
    }
    if let Some(barcode) = &dto.barcode {
        require_non_blank("barcode", barcode, MAX_CODE_LEN)?;
    }
    if let Some(base_unit_id) = &dto.base_unit_id {
        require_non_blank("baseUnitId", base_unit_id, MAX_CODE_LEN)?;
    }

    check_amount(dto.price_per_kg)?;
    check_amount(dto.price_per_unit)?;

    if let Some(cuts) = &dto.cuts {
        check_cut_inputs(cuts)?;
    }

    Ok(())
}

// =============================================================================
// Ticket Payloads
// =============================================================================

fn validate_ticket_item(item: &NewTicketItem) -> CoreResult<()> {
    require_non_blank("productId", &item.product_id, MAX_CODE_LEN)?;
    check_positive("quantity", item.quantity)?;

    // unit_price and subtotal may be zero (a gifted item) but never negative
    Money::new(item.unit_price)?;
    Money::new(item.subtotal)?;

    Ok(())
}

/// Validates a ticket creation payload.
///
/// The caller asserts `total` equals the sum of item subtotals; that
/// equality is the caller's contract and is not re-derived here or in
/// storage.
pub fn validate_new_ticket(dto: &NewTicket) -> CoreResult<()> {
    require_non_blank("paymentType", &dto.payment_type, MAX_PAYMENT_TYPE_LEN)?;
    Money::new(dto.total)?;

    if dto.items.is_empty() {
        return Err(ValidationError::EmptyTicket.into());
    }
    for item in &dto.items {
        validate_ticket_item(item)?;
    }

    Ok(())
}

/// Validates a ticket update payload.
pub fn validate_ticket_patch(dto: &TicketPatch) -> CoreResult<()> {
    if let Some(payment_type) = &dto.payment_type {
        require_non_blank("paymentType", payment_type, MAX_PAYMENT_TYPE_LEN)?;
    }
    if let Some(total) = dto.total {
        Money::new(total)?;
    }
    if let Some(items) = &dto.items {
        if items.is_empty() {
            return Err(ValidationError::EmptyTicket.into());
        }
        for item in items {
            validate_ticket_item(item)?;
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleUnit;
    use rust_decimal_macros::dec;

    fn base_product() -> NewProduct {
        NewProduct {
            name: "Ribeye".to_string(),
            base_unit_id: "unit-kg".to_string(),
            price_per_kg: Some(dec!(250)),
            ..NewProduct::default()
        }
    }

    fn base_ticket() -> NewTicket {
        NewTicket {
            date: None,
            total: dec!(840),
            payment_type: "cash".to_string(),
            user_id: None,
            client_id: None,
            printed: None,
            items: vec![NewTicketItem {
                product_id: "p1".to_string(),
                cut_id: None,
                quantity: dec!(3.5),
                unit_price: dec!(240),
                subtotal: dec!(840),
                unit: SaleUnit::Kg,
            }],
        }
    }

    #[test]
    fn test_valid_product_passes() {
        assert!(validate_new_product(&base_product()).is_ok());
    }

    #[test]
    fn test_blank_name_fails() {
        let mut dto = base_product();
        dto.name = "   ".to_string();
        assert!(validate_new_product(&dto).is_err());
    }

    #[test]
    fn test_both_base_prices_fail() {
        let mut dto = base_product();
        dto.price_per_unit = Some(dec!(30));
        assert!(matches!(
            validate_new_product(&dto),
            Err(CoreError::Validation(ValidationError::AmbiguousBasePrice))
        ));
    }

    #[test]
    fn test_zero_price_counts_as_absent() {
        // pricePerKg: 0 + pricePerUnit: 30 is one effective price, fine
        let mut dto = base_product();
        dto.price_per_kg = Some(dec!(0));
        dto.price_per_unit = Some(dec!(30));
        assert!(validate_new_product(&dto).is_ok());
    }

    #[test]
    fn test_unpriced_product_fails_without_priced_cut() {
        let mut dto = base_product();
        dto.price_per_kg = None;
        assert!(matches!(
            validate_new_product(&dto),
            Err(CoreError::Validation(ValidationError::UnpricedProduct))
        ));
    }

    #[test]
    fn test_pure_cut_priced_product_passes() {
        let mut dto = base_product();
        dto.price_per_kg = None;
        dto.cuts = Some(vec![CutPriceInput {
            cut_id: "cut-halved".to_string(),
            price_per_kg: Some(dec!(62)),
            price_per_unit: None,
        }]);
        assert!(validate_new_product(&dto).is_ok());
    }

    #[test]
    fn test_informational_cut_alone_is_not_a_price() {
        let mut dto = base_product();
        dto.price_per_kg = None;
        dto.cuts = Some(vec![CutPriceInput {
            cut_id: "cut-halved".to_string(),
            price_per_kg: None,
            price_per_unit: None,
        }]);
        assert!(validate_new_product(&dto).is_err());
    }

    #[test]
    fn test_negative_cut_price_fails() {
        let mut dto = base_product();
        dto.cuts = Some(vec![CutPriceInput {
            cut_id: "cut-halved".to_string(),
            price_per_kg: Some(dec!(-1)),
            price_per_unit: None,
        }]);
        assert!(validate_new_product(&dto).is_err());
    }

    #[test]
    fn test_patch_checks_fields_not_exclusivity() {
        let patch = ProductPatch {
            price_per_kg: Some(dec!(60)),
            price_per_unit: Some(dec!(30)),
            ..ProductPatch::default()
        };
        assert!(validate_product_patch(&patch).is_ok());

        let bad = ProductPatch {
            price_per_kg: Some(dec!(-60)),
            ..ProductPatch::default()
        };
        assert!(validate_product_patch(&bad).is_err());
    }

    #[test]
    fn test_valid_ticket_passes() {
        assert!(validate_new_ticket(&base_ticket()).is_ok());
    }

    #[test]
    fn test_empty_ticket_fails() {
        let mut dto = base_ticket();
        dto.items.clear();
        assert!(matches!(
            validate_new_ticket(&dto),
            Err(CoreError::Validation(ValidationError::EmptyTicket))
        ));
    }

    #[test]
    fn test_zero_quantity_fails() {
        let mut dto = base_ticket();
        dto.items[0].quantity = dec!(0);
        assert!(validate_new_ticket(&dto).is_err());
    }

    #[test]
    fn test_negative_subtotal_fails() {
        let mut dto = base_ticket();
        dto.items[0].subtotal = dec!(-1);
        assert!(validate_new_ticket(&dto).is_err());
    }

    #[test]
    fn test_ticket_patch_replacement_items_validated() {
        let patch = TicketPatch {
            items: Some(vec![]),
            ..TicketPatch::default()
        };
        assert!(validate_ticket_patch(&patch).is_err());
    }
}
