//! In-memory state of the invoice being built.
//!
//! Nothing here is persisted. Saving an invoice only clears the line items,
//! resets the form fields and moves the counter to the next number.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use tracing::info;

use crate::models::{InvoiceSummary, LineItem};

const DEFAULT_QUANTITY: &str = "1";
const DEFAULT_UNIT_PRICE: &str = "0.00";

#[derive(Error, Debug, PartialEq)]
pub enum WorkspaceError {
    #[error("Please enter a product name.")]
    EmptyName,

    #[error("Quantity must be greater than 0.")]
    InvalidQuantity,

    #[error("Unit price must be greater than 0.")]
    InvalidPrice,
}

/// Fields printed above the line items
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceHeader {
    pub issue_date: NaiveDate,
    pub company: String,
    pub seller_name: String,
    pub seller_role: String,
    pub customer_name: String,
    pub customer_id: String,
}

impl InvoiceHeader {
    fn new(company: String, issue_date: NaiveDate) -> Self {
        Self {
            issue_date,
            company,
            seller_name: String::new(),
            seller_role: String::new(),
            customer_name: String::new(),
            customer_id: String::new(),
        }
    }
}

/// Raw text of the product entry fields
#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub quantity: String,
    pub unit_price: String,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            quantity: DEFAULT_QUANTITY.to_string(),
            unit_price: DEFAULT_UNIT_PRICE.to_string(),
        }
    }
}

pub struct InvoiceWorkspace {
    items: Vec<LineItem>,
    summary: InvoiceSummary,
    number: u32,
    pub header: InvoiceHeader,
    pub product: ProductForm,
}

impl InvoiceWorkspace {
    pub fn new(company: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            items: Vec::new(),
            summary: InvoiceSummary::default(),
            number: 1,
            header: InvoiceHeader::new(company.into(), today),
            product: ProductForm::default(),
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn summary(&self) -> InvoiceSummary {
        self.summary
    }

    /// Number of the invoice currently being built
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn add_item(
        &mut self,
        name: &str,
        quantity: f64,
        unit_price: f64,
    ) -> Result<&LineItem, WorkspaceError> {
        if name.is_empty() {
            return Err(WorkspaceError::EmptyName);
        }
        if quantity.is_nan() || quantity <= 0.0 {
            return Err(WorkspaceError::InvalidQuantity);
        }
        if unit_price.is_nan() || unit_price <= 0.0 {
            return Err(WorkspaceError::InvalidPrice);
        }

        self.items.push(LineItem::new(name, quantity, unit_price));
        self.recalculate();

        Ok(&self.items[self.items.len() - 1])
    }

    /// Add the product typed into the entry form, then reset the form
    pub fn add_from_form(&mut self) -> Result<(), WorkspaceError> {
        let name = self.product.name.trim().to_string();
        let quantity = parse_amount(&self.product.quantity);
        let unit_price = parse_amount(&self.product.unit_price);

        self.add_item(&name, quantity, unit_price)?;
        self.product = ProductForm::default();

        Ok(())
    }

    /// Remove the item at `index`; out-of-range positions leave the list untouched
    pub fn remove_item(&mut self, index: usize) -> Option<LineItem> {
        if index >= self.items.len() {
            return None;
        }

        let removed = self.items.remove(index);
        self.recalculate();

        Some(removed)
    }

    /// Clear the invoice and move on to the next number, which is returned
    pub fn save(&mut self, today: NaiveDate) -> u32 {
        info!(
            "Invoice {} saved with {} items, total {}",
            self.number,
            self.items.len(),
            format_currency(self.summary.total)
        );

        self.number += 1;
        self.items.clear();
        self.recalculate();

        let company = std::mem::take(&mut self.header.company);
        self.header = InvoiceHeader::new(company, today);
        self.product = ProductForm::default();

        self.number
    }

    fn recalculate(&mut self) {
        self.summary = InvoiceSummary::from_items(&self.items);
    }
}

/// Parse a number typed by the user.
///
/// Anything that is not a finite number counts as 0, which validation then
/// rejects.
pub fn parse_amount(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Format an amount as US dollars, e.g. `$1,234.50`
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Seller clock shown on the invoice, e.g. `03:07 PM`
pub fn clock_label(time: NaiveTime) -> String {
    time.format("%I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    fn workspace() -> InvoiceWorkspace {
        InvoiceWorkspace::new("Acme", today())
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn adding_an_item_updates_line_total_and_summary() {
        let mut ws = workspace();

        let item = ws.add_item("Widget", 2.0, 10.0).unwrap();
        assert_close(item.line_total, 20.0);

        let summary = ws.summary();
        assert_close(summary.subtotal, 20.0);
        assert_close(summary.tax, 3.0);
        assert_close(summary.total, 23.0);
    }

    #[test]
    fn summary_sums_every_item() {
        let mut ws = workspace();
        ws.add_item("Widget", 2.0, 10.0).unwrap();
        ws.add_item("Bolt", 4.0, 2.5).unwrap();

        let summary = ws.summary();
        assert_close(summary.subtotal, 30.0);
        assert_close(summary.tax, 30.0 * 0.15);
        assert_close(summary.total, summary.subtotal + summary.tax);
    }

    #[test]
    fn invalid_items_are_rejected() {
        let mut ws = workspace();

        assert_eq!(ws.add_item("", 1.0, 1.0).unwrap_err(), WorkspaceError::EmptyName);
        assert_eq!(ws.add_item("A", 0.0, 1.0).unwrap_err(), WorkspaceError::InvalidQuantity);
        assert_eq!(ws.add_item("A", -2.0, 1.0).unwrap_err(), WorkspaceError::InvalidQuantity);
        assert_eq!(ws.add_item("A", 1.0, 0.0).unwrap_err(), WorkspaceError::InvalidPrice);
        assert_eq!(ws.add_item("A", 1.0, f64::NAN).unwrap_err(), WorkspaceError::InvalidPrice);
        assert!(ws.items().is_empty());
        assert_eq!(ws.summary(), InvoiceSummary::default());
    }

    #[test]
    fn removing_by_index_shrinks_list_and_recomputes() {
        let mut ws = workspace();
        ws.add_item("Widget", 2.0, 10.0).unwrap();
        ws.add_item("Bolt", 1.0, 5.0).unwrap();

        let removed = ws.remove_item(0).unwrap();

        assert_eq!(removed.name, "Widget");
        assert_eq!(ws.items().len(), 1);
        assert_eq!(ws.items()[0].name, "Bolt");
        assert_close(ws.summary().subtotal, 5.0);
        assert_close(ws.summary().total, 5.75);
    }

    #[test]
    fn removing_out_of_range_is_a_no_op() {
        let mut ws = workspace();
        ws.add_item("Widget", 2.0, 10.0).unwrap();

        assert!(ws.remove_item(3).is_none());
        assert_eq!(ws.items().len(), 1);
    }

    #[test]
    fn saving_clears_items_and_advances_counter_once() {
        let mut ws = workspace();
        ws.header.seller_name = "Ana".to_string();
        ws.header.customer_name = "Bob".to_string();
        ws.product.name = "half typed".to_string();
        ws.add_item("Widget", 2.0, 10.0).unwrap();
        let tomorrow = today().succ_opt().unwrap();

        let next = ws.save(tomorrow);

        assert_eq!(next, 2);
        assert_eq!(ws.number(), 2);
        assert!(ws.items().is_empty());
        assert_eq!(ws.summary(), InvoiceSummary::default());
        assert_eq!(ws.header.company, "Acme");
        assert_eq!(ws.header.issue_date, tomorrow);
        assert!(ws.header.seller_name.is_empty());
        assert!(ws.header.customer_name.is_empty());
        assert_eq!(ws.product, ProductForm::default());
    }

    #[test]
    fn form_entry_is_parsed_and_reset() {
        let mut ws = workspace();
        ws.product = ProductForm {
            name: "  Widget ".to_string(),
            quantity: "2".to_string(),
            unit_price: "10.00".to_string(),
        };

        ws.add_from_form().unwrap();

        assert_eq!(ws.items()[0].name, "Widget");
        assert_close(ws.items()[0].line_total, 20.0);
        assert_eq!(ws.product, ProductForm::default());
    }

    #[test]
    fn unparseable_form_entry_is_kept_for_correction() {
        let mut ws = workspace();
        ws.product.name = "Widget".to_string();
        ws.product.quantity = "two".to_string();

        assert_eq!(ws.add_from_form().unwrap_err(), WorkspaceError::InvalidQuantity);
        assert_eq!(ws.product.quantity, "two");
        assert!(ws.items().is_empty());
    }

    #[test]
    fn amounts_parse_leniently() {
        assert_eq!(parse_amount(" 2.5 "), 2.5);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("inf"), 0.0);
    }

    #[test]
    fn currency_has_grouping_and_cents() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(23.0), "$23.00");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(-3.456), "-$3.46");
    }

    #[test]
    fn clock_uses_twelve_hour_format() {
        assert_eq!(clock_label(NaiveTime::from_hms_opt(0, 5, 0).unwrap()), "12:05 AM");
        assert_eq!(clock_label(NaiveTime::from_hms_opt(15, 7, 0).unwrap()), "03:07 PM");
    }
}
