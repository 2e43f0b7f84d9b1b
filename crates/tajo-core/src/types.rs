//! # Domain Types
//!
//! Core domain types used throughout Tajo POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │   CATALOG                              LEDGER                           │
//! │  ┌─────────────────┐                  ┌─────────────────┐              │
//! │  │    Product      │                  │     Ticket      │              │
//! │  │  ─────────────  │   frozen copy    │  ─────────────  │              │
//! │  │  pricePerKg?    │ ───────────────► │  total (Money)  │              │
//! │  │  pricePerUnit?  │   at sale time   │  paymentType    │              │
//! │  │  baseUnit       │                  │  items[...]     │              │
//! │  └───────┬─────────┘                  └────────┬────────┘              │
//! │          │ m:n                                 │ owns                  │
//! │  ┌───────┴─────────┐                  ┌────────┴────────┐              │
//! │  │ Category / Cut  │                  │   TicketItem    │              │
//! │  │  (ProductCut    │                  │  quantity       │              │
//! │  │   may override  │                  │  unitPrice ❄    │              │
//! │  │   the price)    │                  │  subtotal  ❄    │              │
//! │  └─────────────────┘                  └─────────────────┘              │
//! │                                                                         │
//! │  ❄ = frozen: later catalog price changes never touch these fields      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity id is a UUID v4 string, generated at creation in the
//! storage layer. Wire names are camelCase to match the existing API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;

// =============================================================================
// Sale Unit
// =============================================================================

/// The unit a line item was sold in.
///
/// Caller-supplied per item and independent of the product's catalogued
/// base unit: a product stocked by the kilogram may still leave the
/// counter as a counted piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SaleUnit {
    /// Weight-based sale (kilograms).
    Kg,
    /// Count-based sale.
    Piece,
}

impl SaleUnit {
    /// Stable string form, also the stored column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleUnit::Kg => "kg",
            SaleUnit::Piece => "piece",
        }
    }

    /// Parses the stored/wire form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "kg" => Ok(SaleUnit::Kg),
            "piece" => Ok(SaleUnit::Piece),
            _ => Err(ValidationError::NotAllowed {
                field: "unit".to_string(),
                allowed: vec!["kg".to_string(), "piece".to_string()],
            }
            .into()),
        }
    }
}

impl Default for SaleUnit {
    fn default() -> Self {
        SaleUnit::Kg
    }
}

// =============================================================================
// Catalog Entities
// =============================================================================

/// A measurement unit a product is catalogued in ("kg", "pieza").
///
/// Immutable reference data; created once, rarely mutated.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    /// Unique display name.
    pub name: String,
    pub abbreviation: String,
    /// Factor relative to the base of its kind (1 for kg and piece).
    #[ts(as = "String")]
    pub conversion_factor: Decimal,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A product grouping. Flat; there is no category hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A named way of subdividing a product at sale time ("halved", "sliced").
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cut {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// The product/cut join row, carrying the optional override prices.
///
/// An absent override means the product's base price applies. Both prices
/// may be absent for a purely informational cut.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductCut {
    pub product_id: String,
    pub cut_id: String,
    pub price_per_kg: Option<Money>,
    pub price_per_unit: Option<Money>,
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    /// URL of the hosted product image; deletion of the remote asset is
    /// the image-store collaborator's job, not ours.
    pub image_url: Option<String>,
    /// Default sale price per kilogram, before any cut override.
    pub price_per_kg: Option<Money>,
    /// Default sale price per piece, before any cut override.
    pub price_per_unit: Option<Money>,
    pub is_active: bool,
    pub base_unit_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product carries any base price of its own.
    ///
    /// Products without one are priced entirely through their cuts.
    pub fn has_base_price(&self) -> bool {
        self.price_per_kg.is_some() || self.price_per_unit.is_some()
    }
}

// =============================================================================
// Catalog Projections
// =============================================================================

/// Per-cut pricing attached to listing rows when the caller asks for it.
///
/// A selective projection: cut id, name and the override prices only,
/// to keep listing payloads small.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CutPrice {
    pub cut_id: String,
    pub name: String,
    pub price_per_kg: Option<Money>,
    pub price_per_unit: Option<Money>,
}

/// A cut row on the full product detail, with the cut entity nested.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductCutDetail {
    pub cut_id: String,
    pub price_per_kg: Option<Money>,
    pub price_per_unit: Option<Money>,
    pub cut: Cut,
}

/// Full product detail: the product plus its relation sets.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    /// Ids of the categories this product belongs to.
    pub categories: Vec<String>,
    pub cuts: Vec<ProductCutDetail>,
}

/// A listing row: the product plus whatever relations the include spec
/// asked to attach.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    #[serde(flatten)]
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuts: Option<Vec<CutPrice>>,
}

// =============================================================================
// Ledger Entities
// =============================================================================

/// One completed sale transaction.
///
/// `total` is a frozen snapshot: the caller asserts it equals the sum of
/// the item subtotals at creation time, and storage never recomputes it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub total: Money,
    pub payment_type: String,
    /// Who processed the sale, when known.
    pub user_id: Option<String>,
    /// Who bought, when known.
    pub client_id: Option<String>,
    pub printed: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A line item on a ticket.
///
/// Uses the snapshot pattern: `unit_price` and `subtotal` are copied in at
/// sale time and stay authoritative. Historical tickets must never change
/// value when catalog prices change later.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TicketItem {
    pub id: String,
    pub ticket_id: String,
    pub product_id: String,
    pub cut_id: Option<String>,
    /// Amount sold, in `unit`. Strictly positive.
    #[ts(as = "String")]
    pub quantity: Decimal,
    /// Price per unit at the moment of sale (frozen).
    pub unit_price: Money,
    /// Line total at the moment of sale (frozen, authoritative).
    pub subtotal: Money,
    pub unit: SaleUnit,
}

/// A ticket item joined with the display names of its product and cut.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TicketItemDetail {
    #[serde(flatten)]
    pub item: TicketItem,
    pub product_name: String,
    pub cut_name: Option<String>,
}

/// A ticket with its ordered line items attached.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TicketWithItems {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub items: Vec<TicketItemDetail>,
}

impl TicketWithItems {
    /// Sum of the stored item subtotals.
    ///
    /// Storage does not enforce that this equals `ticket.total`; the
    /// caller froze the total at creation. Useful for reconciliation.
    pub fn items_subtotal(&self) -> Money {
        self.items.iter().map(|i| i.item.subtotal).sum()
    }
}

/// Who processed a sale. Not mutated by this core beyond create/list.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Who bought. Light reference entity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Input DTOs: catalog
// =============================================================================

/// Reference to a category on a product payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub category_id: String,
}

/// One cut on a product payload, with its optional override prices.
///
/// Raw decimals here: the zero-or-absent mapping happens when the row is
/// stored, not at parse time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CutPriceInput {
    pub cut_id: String,
    #[ts(as = "Option<String>")]
    pub price_per_kg: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub price_per_unit: Option<Decimal>,
}

/// Payload for creating a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
    #[ts(as = "Option<String>")]
    pub price_per_kg: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub price_per_unit: Option<Decimal>,
    /// Defaults to active.
    pub is_active: Option<bool>,
    pub base_unit_id: String,
    pub categories: Option<Vec<CategoryRef>>,
    pub cuts: Option<Vec<CutPriceInput>>,
}

/// Payload for updating a product.
///
/// Every field is optional; an omitted field leaves the stored value
/// untouched. A supplied `categories` or `cuts` array replaces the whole
/// relation set; this is a full replacement, never a merge. A price is
/// cleared by submitting 0 (the zero-or-absent rule).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
    #[ts(as = "Option<String>")]
    pub price_per_kg: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub price_per_unit: Option<Decimal>,
    pub is_active: Option<bool>,
    pub base_unit_id: Option<String>,
    pub categories: Option<Vec<CategoryRef>>,
    pub cuts: Option<Vec<CutPriceInput>>,
}

/// Payload for creating a measurement unit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewUnit {
    pub name: String,
    pub abbreviation: String,
    #[ts(as = "Option<String>")]
    pub conversion_factor: Option<Decimal>,
}

/// Payload for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

/// Payload for creating a cut.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewCut {
    pub name: String,
    pub description: Option<String>,
}

// =============================================================================
// Input DTOs: ledger
// =============================================================================

/// One line item on an incoming ticket.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewTicketItem {
    pub product_id: String,
    pub cut_id: Option<String>,
    #[ts(as = "String")]
    pub quantity: Decimal,
    #[ts(as = "String")]
    pub unit_price: Decimal,
    #[ts(as = "String")]
    pub subtotal: Decimal,
    pub unit: SaleUnit,
}

/// Payload for creating a ticket.
///
/// `total` is asserted by the caller to equal the sum of item subtotals;
/// storage freezes it as-is.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    /// Sale timestamp; defaults to now.
    #[ts(as = "Option<String>")]
    pub date: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub total: Decimal,
    pub payment_type: String,
    pub user_id: Option<String>,
    pub client_id: Option<String>,
    pub printed: Option<bool>,
    pub items: Vec<NewTicketItem>,
}

/// Payload for updating a ticket.
///
/// A supplied `items` array wholesale-replaces the item set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TicketPatch {
    #[ts(as = "Option<String>")]
    pub date: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub total: Option<Decimal>,
    pub payment_type: Option<String>,
    pub user_id: Option<String>,
    pub client_id: Option<String>,
    pub printed: Option<bool>,
    pub items: Option<Vec<NewTicketItem>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn money(d: Decimal) -> Money {
        Money::new(d).unwrap()
    }

    #[test]
    fn test_sale_unit_round_trip() {
        assert_eq!(SaleUnit::parse("kg").unwrap(), SaleUnit::Kg);
        assert_eq!(SaleUnit::parse("piece").unwrap(), SaleUnit::Piece);
        assert!(SaleUnit::parse("pz").is_err());
        assert_eq!(SaleUnit::Kg.as_str(), "kg");
    }

    #[test]
    fn test_sale_unit_wire_form() {
        assert_eq!(serde_json::to_string(&SaleUnit::Kg).unwrap(), "\"kg\"");
        assert_eq!(
            serde_json::to_string(&SaleUnit::Piece).unwrap(),
            "\"piece\""
        );
    }

    #[test]
    fn test_product_camel_case_wire_names() {
        let product = Product {
            id: "p1".to_string(),
            name: "Ribeye".to_string(),
            description: None,
            sku: None,
            barcode: None,
            image_url: None,
            price_per_kg: Some(money(dec!(250))),
            price_per_unit: None,
            is_active: true,
            base_unit_id: "u1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["pricePerKg"], serde_json::json!("250"));
        assert!(json.get("price_per_kg").is_none());
        assert_eq!(json["baseUnitId"], serde_json::json!("u1"));
    }

    #[test]
    fn test_items_subtotal_is_exact() {
        let ticket = Ticket {
            id: "t1".to_string(),
            date: Utc::now(),
            total: money(dec!(840)),
            payment_type: "cash".to_string(),
            user_id: None,
            client_id: None,
            printed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let item = |subtotal: Decimal| TicketItemDetail {
            item: TicketItem {
                id: "i".to_string(),
                ticket_id: "t1".to_string(),
                product_id: "p1".to_string(),
                cut_id: None,
                quantity: dec!(1),
                unit_price: money(subtotal),
                subtotal: money(subtotal),
                unit: SaleUnit::Kg,
            },
            product_name: "Menudo National".to_string(),
            cut_name: None,
        };

        let with_items = TicketWithItems {
            ticket,
            items: vec![item(dec!(700)), item(dec!(140))],
        };
        assert_eq!(with_items.items_subtotal(), money(dec!(840)));
    }
}
