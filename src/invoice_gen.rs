use anyhow::Result;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, warn};

use crate::models::TAX_RATE;
use crate::workspace::{format_currency, InvoiceWorkspace};

/// Service for printing the current invoice to Markdown, and to PDF when pandoc is available
pub struct InvoiceGenerator {
    output_dir: PathBuf,
}

impl InvoiceGenerator {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Write the invoice as Markdown and try to convert it to PDF.
    ///
    /// Returns the Markdown path and, when pandoc succeeded, the PDF path.
    pub fn print_invoice(
        &self,
        workspace: &InvoiceWorkspace,
        clock: &str,
    ) -> Result<(PathBuf, Option<PathBuf>)> {
        let markdown = render_markdown(workspace, clock);

        let md_path = self
            .output_dir
            .join(format!("factura_{}.md", workspace.number()));
        let pdf_path = md_path.with_extension("pdf");

        fs::create_dir_all(&self.output_dir)?;
        let mut file = File::create(&md_path)?;
        file.write_all(markdown.as_bytes())?;
        info!("Invoice {} written to {}", workspace.number(), md_path.display());

        let pdf = match Command::new("pandoc").arg(&md_path).arg("-o").arg(&pdf_path).output() {
            Ok(output) if output.status.success() => Some(pdf_path),
            Ok(output) => {
                let error = String::from_utf8_lossy(&output.stderr);
                warn!("Failed to generate PDF: {}", error.trim());
                None
            }
            Err(e) => {
                warn!("Could not run pandoc: {e}");
                None
            }
        };

        Ok((md_path, pdf))
    }
}

/// Render the printable invoice
pub fn render_markdown(workspace: &InvoiceWorkspace, clock: &str) -> String {
    let header = &workspace.header;
    let summary = workspace.summary();
    let mut content = String::new();

    content.push_str(&format!("# {}\n\n", header.company));
    content.push_str(&format!("## Invoice #{}\n\n", workspace.number()));
    content.push_str(&format!("**Issued:** {}\n\n", header.issue_date.format("%Y-%m-%d")));

    content.push_str("| Seller | Role | Time |\n");
    content.push_str("|---|---|---|\n");
    content.push_str(&format!(
        "| {} | {} | {} |\n\n",
        cell(&header.seller_name),
        cell(&header.seller_role),
        clock
    ));

    content.push_str("| Customer | Identification |\n");
    content.push_str("|---|---|\n");
    content.push_str(&format!(
        "| {} | {} |\n\n",
        cell(&header.customer_name),
        cell(&header.customer_id)
    ));

    content.push_str("| Product | Quantity | Unit price | Total |\n");
    content.push_str("|:---|---:|---:|---:|\n");
    for item in workspace.items() {
        content.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            cell(&item.name),
            item.quantity,
            format_currency(item.unit_price),
            format_currency(item.line_total)
        ));
    }
    content.push('\n');

    content.push_str(&format!("**Subtotal:** {}\n\n", format_currency(summary.subtotal)));
    content.push_str(&format!(
        "**VAT ({:.0}%):** {}\n\n",
        TAX_RATE * 100.0,
        format_currency(summary.tax)
    ));
    content.push_str(&format!("**Total:** {}\n", format_currency(summary.total)));

    content
}

// Pipes would split a Markdown table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn workspace() -> InvoiceWorkspace {
        let mut ws = InvoiceWorkspace::new("Acme", NaiveDate::from_ymd_opt(2024, 5, 17).unwrap());
        ws.header.seller_name = "Ana".to_string();
        ws.header.customer_name = "Bob | Sons".to_string();
        ws.add_item("Widget", 2.0, 10.0).unwrap();
        ws.add_item("Bolt", 4.0, 250.0).unwrap();
        ws
    }

    #[test]
    fn markdown_lists_items_and_totals() {
        let markdown = render_markdown(&workspace(), "03:07 PM");

        assert!(markdown.starts_with("# Acme\n"));
        assert!(markdown.contains("## Invoice #1"));
        assert!(markdown.contains("**Issued:** 2024-05-17"));
        assert!(markdown.contains("| Widget | 2 | $10.00 | $20.00 |"));
        assert!(markdown.contains("| Bolt | 4 | $250.00 | $1,000.00 |"));
        assert!(markdown.contains("**Subtotal:** $1,020.00"));
        assert!(markdown.contains("**VAT (15%):** $153.00"));
        assert!(markdown.contains("**Total:** $1,173.00"));
        assert!(markdown.contains("| Ana |  | 03:07 PM |"));
    }

    #[test]
    fn pipes_in_text_are_escaped() {
        let markdown = render_markdown(&workspace(), "03:07 PM");

        assert!(markdown.contains("Bob \\| Sons"));
    }

    #[test]
    fn printing_writes_markdown_named_after_invoice_number() {
        let dir = tempfile::tempdir().unwrap();
        let generator = InvoiceGenerator::new(dir.path().join("out"));
        assert!(!dir.path().join("out").exists());

        let (md_path, _pdf) = generator.print_invoice(&workspace(), "03:07 PM").unwrap();

        assert_eq!(md_path.file_name().unwrap(), "factura_1.md");
        let written = fs::read_to_string(md_path).unwrap();
        assert!(written.contains("**Total:** $1,173.00"));
    }
}
