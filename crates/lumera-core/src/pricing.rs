//! Order pricing arithmetic.
//!
//! All amounts are in fils (1 AED = 100 fils) so totals stay exact;
//! divisions round half up, matching how the storefront displays prices.
//! UAE VAT (5%) applies to the discounted goods total plus shipping.

use serde::{Deserialize, Serialize};

/// UAE VAT rate, percent.
pub const VAT_RATE_PERCENT: u64 = 5;

/// Destination emirate for an order. Determines the flat shipping fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Emirate {
    AbuDhabi,
    Dubai,
    Sharjah,
    Ajman,
    UmmAlQuwain,
    RasAlKhaimah,
    Fujairah,
}

impl Emirate {
    /// Flat delivery fee in fils for this destination.
    pub fn shipping_fee_fils(&self) -> u64 {
        match self {
            Emirate::Dubai => 1_000,
            Emirate::Sharjah | Emirate::Ajman => 1_200,
            Emirate::AbuDhabi => 1_500,
            Emirate::UmmAlQuwain | Emirate::RasAlKhaimah | Emirate::Fujairah => 2_000,
        }
    }
}

/// One cart line as priced at quote time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub unit_price_fils: u64,
    pub quantity: u32,
    /// Percentage off this line, clamped to 0–100.
    #[serde(default)]
    pub discount_percent: u8,
}

impl LineItem {
    fn gross_fils(&self) -> u64 {
        self.unit_price_fils * u64::from(self.quantity)
    }

    fn discount_fils(&self) -> u64 {
        let percent = u64::from(self.discount_percent.min(100));
        div_round_half_up(self.gross_fils() * percent, 100)
    }
}

/// Itemised totals for a quoted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteBreakdown {
    pub subtotal_fils: u64,
    pub discount_fils: u64,
    pub shipping_fils: u64,
    pub vat_fils: u64,
    pub total_fils: u64,
}

/// Prices an order destined for `emirate`.
///
/// Shipping is waived once the discounted goods total reaches
/// `free_shipping_threshold_fils`; a threshold of zero disables free
/// shipping entirely.
pub fn quote(
    items: &[LineItem],
    emirate: Emirate,
    free_shipping_threshold_fils: u64,
) -> QuoteBreakdown {
    let subtotal_fils: u64 = items.iter().map(LineItem::gross_fils).sum();
    let discount_fils: u64 = items.iter().map(LineItem::discount_fils).sum();
    let goods_fils = subtotal_fils - discount_fils;

    let shipping_fils =
        if free_shipping_threshold_fils > 0 && goods_fils >= free_shipping_threshold_fils {
            0
        } else {
            emirate.shipping_fee_fils()
        };

    let vat_fils = div_round_half_up((goods_fils + shipping_fils) * VAT_RATE_PERCENT, 100);

    QuoteBreakdown {
        subtotal_fils,
        discount_fils,
        shipping_fils,
        vat_fils,
        total_fils: goods_fils + shipping_fils + vat_fils,
    }
}

fn div_round_half_up(numerator: u64, denominator: u64) -> u64 {
    (numerator + denominator / 2) / denominator
}
