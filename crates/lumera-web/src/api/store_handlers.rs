use axum::extract::State;
use axum::Json;
use lumera_core::{pricing, QuoteBreakdown};

use crate::dto::QuoteRequest;
use crate::error::AppError;
use crate::state::AppState;

// Sanity bounds on quote input; keeps the fils arithmetic far from u64
// overflow even on adversarial carts.
const MAX_QUOTE_ITEMS: usize = 100;
const MAX_QUANTITY: u32 = 999;
const MAX_UNIT_PRICE_FILS: u64 = 10_000_000;

pub async fn quote_order(
    State(state): State<AppState>,
    Json(body): Json<QuoteRequest>,
) -> Result<Json<QuoteBreakdown>, AppError> {
    if body.items.len() > MAX_QUOTE_ITEMS {
        return Err(AppError::BadRequest(format!(
            "A quote may contain at most {MAX_QUOTE_ITEMS} items"
        )));
    }

    for item in &body.items {
        if item.quantity == 0 || item.quantity > MAX_QUANTITY {
            return Err(AppError::BadRequest(format!(
                "Item quantity must be between 1 and {MAX_QUANTITY}"
            )));
        }
        if item.unit_price_fils > MAX_UNIT_PRICE_FILS {
            return Err(AppError::BadRequest(
                "Item unit price is out of range".to_string(),
            ));
        }
    }

    let breakdown = pricing::quote(
        &body.items,
        body.emirate,
        state.config.store.free_shipping_threshold_fils,
    );

    Ok(Json(breakdown))
}
