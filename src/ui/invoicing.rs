use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::field_line;
use crate::models::TAX_RATE;
use crate::workspace::{clock_label, format_currency, InvoiceWorkspace};

// Represents a field in the invoicing form
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum InvoiceField {
    SellerName,
    SellerRole,
    CustomerName,
    CustomerId,
    ProductName,
    ProductQuantity,
    ProductPrice,
    LineItems,
}

#[derive(Debug, PartialEq)]
pub enum InvoicingAction {
    Quit,
    Logout,
    Print,
}

pub struct InvoicingState {
    workspace: InvoiceWorkspace,
    current_field: InvoiceField,
    editing: bool,
    line_items_list_state: ListState,
    error: Option<String>,
    notice: Option<String>,
}

impl InvoicingState {
    pub fn new(company: &str) -> Self {
        Self {
            workspace: InvoiceWorkspace::new(company, Local::now().date_naive()),
            current_field: InvoiceField::SellerName,
            editing: false,
            line_items_list_state: ListState::default(),
            error: None,
            notice: None,
        }
    }

    pub fn workspace(&self) -> &InvoiceWorkspace {
        &self.workspace
    }

    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.error = None;
        self.notice = Some(message.into());
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.notice = None;
        self.error = Some(message.into());
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;

        if self.editing && self.current_field == InvoiceField::LineItems {
            if self.workspace.items().is_empty() {
                self.editing = false;
            } else if self.line_items_list_state.selected().is_none() {
                self.line_items_list_state.select(Some(0));
            }
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            InvoiceField::SellerName => InvoiceField::SellerRole,
            InvoiceField::SellerRole => InvoiceField::CustomerName,
            InvoiceField::CustomerName => InvoiceField::CustomerId,
            InvoiceField::CustomerId => InvoiceField::ProductName,
            InvoiceField::ProductName => InvoiceField::ProductQuantity,
            InvoiceField::ProductQuantity => InvoiceField::ProductPrice,
            InvoiceField::ProductPrice => InvoiceField::LineItems,
            InvoiceField::LineItems => InvoiceField::SellerName,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            InvoiceField::SellerName => InvoiceField::LineItems,
            InvoiceField::SellerRole => InvoiceField::SellerName,
            InvoiceField::CustomerName => InvoiceField::SellerRole,
            InvoiceField::CustomerId => InvoiceField::CustomerName,
            InvoiceField::ProductName => InvoiceField::CustomerId,
            InvoiceField::ProductQuantity => InvoiceField::ProductName,
            InvoiceField::ProductPrice => InvoiceField::ProductQuantity,
            InvoiceField::LineItems => InvoiceField::ProductPrice,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let numeric = matches!(
            self.current_field,
            InvoiceField::ProductQuantity | InvoiceField::ProductPrice
        );

        let header = &mut self.workspace.header;
        let product = &mut self.workspace.product;
        let field_value = match self.current_field {
            InvoiceField::SellerName => &mut header.seller_name,
            InvoiceField::SellerRole => &mut header.seller_role,
            InvoiceField::CustomerName => &mut header.customer_name,
            InvoiceField::CustomerId => &mut header.customer_id,
            InvoiceField::ProductName => &mut product.name,
            InvoiceField::ProductQuantity => &mut product.quantity,
            InvoiceField::ProductPrice => &mut product.unit_price,
            InvoiceField::LineItems => return,
        };

        match key {
            KeyCode::Char(c) if !numeric || c.is_ascii_digit() || c == '.' => {
                field_value.push(c);
            }
            KeyCode::Backspace => {
                field_value.pop();
            }
            _ => {}
        }
    }

    pub fn add_product(&mut self) {
        match self.workspace.add_from_form() {
            Ok(()) => {
                self.error = None;
                self.notice = None;
                self.current_field = InvoiceField::ProductName;
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    pub fn delete_selected_item(&mut self) {
        let Some(selected) = self.line_items_list_state.selected() else {
            return;
        };

        if self.workspace.remove_item(selected).is_none() {
            return;
        }

        // Adjust selection after deletion
        let len = self.workspace.items().len();
        if len == 0 {
            self.line_items_list_state.select(None);
            self.editing = false;
        } else {
            self.line_items_list_state.select(Some(selected.min(len - 1)));
        }
    }

    pub fn save_invoice(&mut self) {
        let number = self.workspace.save(Local::now().date_naive());

        self.line_items_list_state.select(None);
        self.editing = false;
        self.current_field = InvoiceField::SellerName;
        self.set_notice(format!("Invoice saved. Now editing invoice #{number}."));
    }

    fn move_selection(&mut self, forward: bool) {
        let len = self.workspace.items().len();
        if len == 0 {
            return;
        }

        let i = match self.line_items_list_state.selected() {
            Some(i) if forward => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.line_items_list_state.select(Some(i));
    }
}

pub fn render_invoicing<B: Backend>(frame: &mut Frame<B>, state: &mut InvoicingState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),  // Title
                Constraint::Length(10), // Header and product entry
                Constraint::Min(5),     // Line items
                Constraint::Length(5),  // Summary
                Constraint::Length(3),  // Help
            ]
            .as_ref(),
        )
        .split(frame.size());

    let title = Paragraph::new(format!(
        "Invoice #{} | {}",
        state.workspace.number(),
        state.workspace.header.company
    ))
    .style(Style::default().fg(Color::Cyan))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let form_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(chunks[1]);
    render_header(frame, state, form_chunks[0]);
    render_product_entry(frame, state, form_chunks[1]);

    render_line_items(frame, state, chunks[2]);
    render_summary(frame, state, chunks[3]);

    let help_text = match (state.editing, state.current_field) {
        (false, _) => {
            "Up/Down - Navigate | Enter - Edit | A - Add product | S - Save | P - Print | L - Log out | Q - Quit"
        }
        (true, InvoiceField::LineItems) => "Up/Down - Select item | D - Delete item | Enter/Esc - Done",
        (true, _) => "Enter/Esc - Done editing",
    };

    let mut help_lines = vec![Spans::from(Span::styled(
        help_text,
        Style::default().fg(Color::Gray),
    ))];
    if let Some(error) = &state.error {
        help_lines = vec![Spans::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        ))];
    } else if let Some(notice) = &state.notice {
        help_lines = vec![Spans::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Green),
        ))];
    }

    let help = Paragraph::new(help_lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[4]);
}

fn render_header<B: Backend>(frame: &mut Frame<B>, state: &InvoicingState, area: Rect) {
    let header = &state.workspace.header;
    let selected = |field: InvoiceField| state.current_field == field;

    let lines = vec![
        field_line("Company", &header.company, false, false),
        field_line(
            "Issue date",
            &header.issue_date.format("%Y-%m-%d").to_string(),
            false,
            false,
        ),
        field_line("Time", &clock_label(Local::now().time()), false, false),
        field_line(
            "Seller",
            &header.seller_name,
            selected(InvoiceField::SellerName),
            state.editing,
        ),
        field_line(
            "Role",
            &header.seller_role,
            selected(InvoiceField::SellerRole),
            state.editing,
        ),
        field_line(
            "Customer",
            &header.customer_name,
            selected(InvoiceField::CustomerName),
            state.editing,
        ),
        field_line(
            "Identification",
            &header.customer_id,
            selected(InvoiceField::CustomerId),
            state.editing,
        ),
    ];

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Invoice details"));
    frame.render_widget(paragraph, area);
}

fn render_product_entry<B: Backend>(frame: &mut Frame<B>, state: &InvoicingState, area: Rect) {
    let product = &state.workspace.product;
    let selected = |field: InvoiceField| state.current_field == field;

    let lines = vec![
        field_line(
            "Product",
            &product.name,
            selected(InvoiceField::ProductName),
            state.editing,
        ),
        field_line(
            "Quantity",
            &product.quantity,
            selected(InvoiceField::ProductQuantity),
            state.editing,
        ),
        field_line(
            "Unit price",
            &product.unit_price,
            selected(InvoiceField::ProductPrice),
            state.editing,
        ),
    ];

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Add product"));
    frame.render_widget(paragraph, area);
}

fn render_line_items<B: Backend>(frame: &mut Frame<B>, state: &mut InvoicingState, area: Rect) {
    let selected = state.current_field == InvoiceField::LineItems;

    let block = Block::default()
        .title(if selected {
            "Line Items (selected)"
        } else {
            "Line Items"
        })
        .borders(Borders::ALL)
        .style(if selected {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        });

    if state.workspace.items().is_empty() {
        let paragraph = Paragraph::new("No products added yet").block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items = state
        .workspace
        .items()
        .iter()
        .map(|item| {
            ListItem::new(format!(
                "{} | {} x {} = {}",
                item.name,
                item.quantity,
                format_currency(item.unit_price),
                format_currency(item.line_total)
            ))
        })
        .collect::<Vec<_>>();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

    frame.render_stateful_widget(list, area, &mut state.line_items_list_state);
}

fn render_summary<B: Backend>(frame: &mut Frame<B>, state: &InvoicingState, area: Rect) {
    let summary = state.workspace.summary();

    let lines = vec![
        Spans::from(format!("Subtotal: {}", format_currency(summary.subtotal))),
        Spans::from(format!(
            "VAT ({:.0}%): {}",
            TAX_RATE * 100.0,
            format_currency(summary.tax)
        )),
        Spans::from(Span::styled(
            format!("Total: {}", format_currency(summary.total)),
            Style::default().fg(Color::Cyan),
        )),
    ];

    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Summary"));
    frame.render_widget(paragraph, area);
}

pub fn handle_input(state: &mut InvoicingState) -> Result<Option<InvoicingAction>> {
    // Wake up regularly so the seller clock keeps ticking
    if !event::poll(Duration::from_secs(1))? {
        return Ok(None);
    }

    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }

    Ok(None)
}

pub fn handle_key(state: &mut InvoicingState, key: KeyCode) -> Option<InvoicingAction> {
    if state.editing {
        match key {
            KeyCode::Esc | KeyCode::Enter => state.toggle_editing(),
            KeyCode::Up if state.current_field == InvoiceField::LineItems => {
                state.move_selection(false);
            }
            KeyCode::Down if state.current_field == InvoiceField::LineItems => {
                state.move_selection(true);
            }
            KeyCode::Char('d') | KeyCode::Delete
                if state.current_field == InvoiceField::LineItems =>
            {
                state.delete_selected_item();
            }
            _ => state.edit_current_field(key),
        }

        return None;
    }

    match key {
        KeyCode::Up => state.previous_field(),
        KeyCode::Down | KeyCode::Tab => state.next_field(),
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Char('a') => state.add_product(),
        KeyCode::Char('s') => state.save_invoice(),
        KeyCode::Char('p') => return Some(InvoicingAction::Print),
        KeyCode::Char('l') => return Some(InvoicingAction::Logout),
        KeyCode::Char('q') | KeyCode::Esc => return Some(InvoicingAction::Quit),
        _ => {}
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(state: &mut InvoicingState, field: InvoiceField, text: &str) {
        state.current_field = field;
        handle_key(state, KeyCode::Enter);
        for _ in 0..8 {
            handle_key(state, KeyCode::Backspace);
        }
        for c in text.chars() {
            handle_key(state, KeyCode::Char(c));
        }
        handle_key(state, KeyCode::Enter);
    }

    fn add(state: &mut InvoicingState, name: &str, quantity: &str, price: &str) {
        type_into(state, InvoiceField::ProductName, name);
        type_into(state, InvoiceField::ProductQuantity, quantity);
        type_into(state, InvoiceField::ProductPrice, price);
        handle_key(state, KeyCode::Char('a'));
    }

    #[test]
    fn products_are_added_from_the_form() {
        let mut state = InvoicingState::new("Acme");

        add(&mut state, "Widget", "2", "10.00");

        let items = state.workspace().items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].line_total, 20.0);
        assert_eq!(state.workspace().product.quantity, "1");
        assert!(state.error.is_none());
    }

    #[test]
    fn numeric_fields_ignore_letters() {
        let mut state = InvoicingState::new("Acme");

        type_into(&mut state, InvoiceField::ProductQuantity, "3x");

        assert_eq!(state.workspace().product.quantity, "3");
    }

    #[test]
    fn invalid_product_shows_an_error() {
        let mut state = InvoicingState::new("Acme");

        add(&mut state, "Widget", "2", "0");

        assert!(state.workspace().items().is_empty());
        assert_eq!(state.error.as_deref(), Some("Unit price must be greater than 0."));
    }

    #[test]
    fn selected_item_can_be_deleted() {
        let mut state = InvoicingState::new("Acme");
        add(&mut state, "Widget", "2", "10");
        add(&mut state, "Bolt", "1", "5");

        state.current_field = InvoiceField::LineItems;
        handle_key(&mut state, KeyCode::Enter);
        handle_key(&mut state, KeyCode::Down);
        handle_key(&mut state, KeyCode::Char('d'));

        let items = state.workspace().items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Widget");
        assert_eq!(state.line_items_list_state.selected(), Some(0));
        assert_eq!(state.workspace().summary().subtotal, 20.0);
    }

    #[test]
    fn saving_resets_and_advances_number() {
        let mut state = InvoicingState::new("Acme");
        type_into(&mut state, InvoiceField::SellerName, "Ana");
        add(&mut state, "Widget", "2", "10");

        handle_key(&mut state, KeyCode::Char('s'));

        assert_eq!(state.workspace().number(), 2);
        assert!(state.workspace().items().is_empty());
        assert!(state.workspace().header.seller_name.is_empty());
        assert_eq!(state.workspace().header.company, "Acme");
        assert!(state.notice.is_some());
    }

    #[test]
    fn shortcut_keys_map_to_actions() {
        let mut state = InvoicingState::new("Acme");

        assert_eq!(handle_key(&mut state, KeyCode::Char('p')), Some(InvoicingAction::Print));
        assert_eq!(handle_key(&mut state, KeyCode::Char('l')), Some(InvoicingAction::Logout));
        assert_eq!(handle_key(&mut state, KeyCode::Char('q')), Some(InvoicingAction::Quit));
    }

    #[test]
    fn letters_are_text_while_editing() {
        let mut state = InvoicingState::new("Acme");

        type_into(&mut state, InvoiceField::CustomerName, "Pasq");

        assert_eq!(state.workspace().header.customer_name, "Pasq");
    }
}
