//! products v1→v2: numeric fields become numbers, listing flags get defaults.

use mongodb::bson::{doc, Bson, Document};
use tracing::debug;

use crate::core::client::database::constant::PRODUCTS_COLLECTION;
use crate::schema::coerce::{coerce_f64, coerce_i64};
use crate::schema::error::TransformError;
use crate::schema::step::{StepContext, UpgradeStep};

pub const PRICE_FIELD: &str = "price";
pub const STOCK_FIELD: &str = "stock";
pub const ACTIVE_FIELD: &str = "isActive";
pub const CATEGORIES_FIELD: &str = "categories";

pub struct ProductsNumericFields;

impl UpgradeStep for ProductsNumericFields {
    fn collection(&self) -> &'static str {
        PRODUCTS_COLLECTION
    }

    fn to_version(&self) -> u32 {
        2
    }

    fn description(&self) -> &'static str {
        "coerce price and stock, default listing flags"
    }

    fn patch(&self, document: &Document, _ctx: &StepContext) -> Result<Document, TransformError> {
        let price = coerce_f64(document.get(PRICE_FIELD));
        let stock = coerce_i64(document.get(STOCK_FIELD));
        if price.is_lossy() || stock.is_lossy() {
            debug!(
                key = ?document.get("id"),
                price = ?document.get(PRICE_FIELD),
                stock = ?document.get(STOCK_FIELD),
                "Unusable product numbers defaulted to zero"
            );
        }

        let mut patch = doc! { PRICE_FIELD: price.value(), STOCK_FIELD: stock.value() };

        if matches!(document.get(ACTIVE_FIELD), None | Some(Bson::Null)) {
            patch.insert(ACTIVE_FIELD, true);
        }

        match document.get(CATEGORIES_FIELD) {
            None | Some(Bson::Null) => {
                patch.insert(CATEGORIES_FIELD, Bson::Array(Vec::new()));
            }
            Some(Bson::String(category)) => {
                patch.insert(CATEGORIES_FIELD, vec![category.clone()]);
            }
            Some(Bson::Array(_)) => {}
            Some(other) => {
                return Err(TransformError::UnexpectedType {
                    field: CATEGORIES_FIELD.to_string(),
                    expected: "array or string",
                    found: format!("{:?}", other.element_type()),
                })
            }
        }

        Ok(patch)
    }
}
