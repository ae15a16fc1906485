mod company;
mod invoice;
mod line_item;

pub use company::Company;
pub use invoice::{InvoiceSummary, TAX_RATE};
pub use line_item::LineItem;
