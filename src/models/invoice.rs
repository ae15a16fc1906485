use super::LineItem;

/// Fixed VAT applied on top of the subtotal.
pub const TAX_RATE: f64 = 0.15;

/// Totals derived from the current line items.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InvoiceSummary {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl InvoiceSummary {
    pub fn from_items(items: &[LineItem]) -> Self {
        let subtotal: f64 = items.iter().map(|item| item.line_total).sum();
        let tax = subtotal * TAX_RATE;

        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}
