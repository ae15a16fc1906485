use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{centered_rect, field_line};

/// Which card of the access screen is showing
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Card {
    Welcome,
    Login,
    Register,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AccessField {
    Name,
    Password,
}

#[derive(Debug, PartialEq)]
pub enum AccessAction {
    Quit,
    Login { name: String, password: String },
    Register { name: String, password: String },
}

#[derive(Default)]
struct CredentialsForm {
    name: String,
    password: String,
}

pub struct AccessState {
    card: Card,
    current_field: AccessField,
    login: CredentialsForm,
    register: CredentialsForm,
    show_password: bool,
    error: Option<String>,
    notice: Option<String>,
}

impl AccessState {
    pub fn new() -> Self {
        Self {
            card: Card::Welcome,
            current_field: AccessField::Name,
            login: CredentialsForm::default(),
            register: CredentialsForm::default(),
            show_password: false,
            error: None,
            notice: None,
        }
    }

    pub fn show_card(&mut self, card: Card) {
        self.card = card;
        self.current_field = AccessField::Name;
        self.show_password = false;
        self.error = None;
        self.notice = None;
    }

    /// Show a message inline under the current form
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.notice = None;
        self.error = Some(message.into());
    }

    /// Registration went through: reset the form and offer the login card pre-filled
    pub fn registered(&mut self, name: &str) {
        self.register = CredentialsForm::default();
        self.show_card(Card::Login);
        self.login.name = name.to_string();
        self.login.password.clear();
        self.current_field = AccessField::Password;
        self.notice = Some("Registration successful. You can log in now.".to_string());
    }

    fn form_mut(&mut self) -> Option<&mut CredentialsForm> {
        match self.card {
            Card::Welcome => None,
            Card::Login => Some(&mut self.login),
            Card::Register => Some(&mut self.register),
        }
    }

    fn form(&self) -> Option<&CredentialsForm> {
        match self.card {
            Card::Welcome => None,
            Card::Login => Some(&self.login),
            Card::Register => Some(&self.register),
        }
    }

    pub fn toggle_password(&mut self) {
        self.show_password = !self.show_password;
    }

    fn next_field(&mut self) {
        self.current_field = match self.current_field {
            AccessField::Name => AccessField::Password,
            AccessField::Password => AccessField::Name,
        };
    }

    fn edit_current_field(&mut self, key: KeyCode) {
        let field = self.current_field;
        let Some(form) = self.form_mut() else {
            return;
        };

        let value = match field {
            AccessField::Name => &mut form.name,
            AccessField::Password => &mut form.password,
        };

        match key {
            KeyCode::Char(c) => value.push(c),
            KeyCode::Backspace => {
                value.pop();
            }
            _ => {}
        }
    }

    fn submit(&mut self) -> Option<AccessAction> {
        let (name, password) = {
            let form = self.form()?;
            (form.name.trim().to_string(), form.password.trim().to_string())
        };

        if name.is_empty() || password.is_empty() {
            self.show_error("Please fill in all fields.");
            return None;
        }

        self.error = None;
        match self.card {
            Card::Login => Some(AccessAction::Login { name, password }),
            Card::Register => Some(AccessAction::Register { name, password }),
            Card::Welcome => None,
        }
    }

    fn masked(&self, password: &str) -> String {
        if self.show_password {
            password.to_string()
        } else {
            "*".repeat(password.chars().count())
        }
    }
}

pub fn render_access<B: Backend>(f: &mut Frame<B>, state: &mut AccessState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new("Facturación")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let card_area = centered_rect(60, 80, chunks[1]);
    match state.card {
        Card::Welcome => render_welcome(f, card_area),
        Card::Login | Card::Register => render_form(f, state, card_area),
    }

    let help_text = match state.card {
        Card::Welcome => "L/Enter - Log in | R - Register | Q/Esc - Quit",
        Card::Login => "Tab - Next field | F2 - Show/hide password | Enter - Log in | Esc - Back",
        Card::Register => "Tab - Next field | F2 - Show/hide password | Enter - Register | Esc - Cancel",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn render_welcome<B: Backend>(f: &mut Frame<B>, area: Rect) {
    let welcome = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Welcome to the invoicing system."),
        Spans::from(""),
        Spans::from("Log in with your company account, or register a new company."),
    ])
    .block(Block::default().borders(Borders::ALL).title("Welcome"));

    f.render_widget(welcome, area);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &AccessState, area: Rect) {
    let Some(form) = state.form() else {
        return;
    };

    let title = if state.card == Card::Login {
        "Log in"
    } else {
        "Register company"
    };

    let mut lines = vec![
        field_line(
            "Company",
            &form.name,
            state.current_field == AccessField::Name,
            state.current_field == AccessField::Name,
        ),
        field_line(
            "Password",
            &state.masked(&form.password),
            state.current_field == AccessField::Password,
            state.current_field == AccessField::Password,
        ),
        Spans::from(""),
    ];

    if let Some(error) = &state.error {
        lines.push(Spans::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    if let Some(notice) = &state.notice {
        lines.push(Spans::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Green),
        )));
    }

    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(paragraph, area);
}

pub fn handle_input(state: &mut AccessState) -> Result<Option<AccessAction>> {
    if !event::poll(Duration::from_millis(250))? {
        return Ok(None);
    }

    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }

    Ok(None)
}

pub fn handle_key(state: &mut AccessState, key: KeyCode) -> Option<AccessAction> {
    match state.card {
        Card::Welcome => match key {
            KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Enter => {
                state.show_card(Card::Login);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                state.show_card(Card::Register);
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                return Some(AccessAction::Quit);
            }
            _ => {}
        },
        Card::Login | Card::Register => match key {
            KeyCode::Esc => state.show_card(Card::Welcome),
            KeyCode::Enter => return state.submit(),
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => state.next_field(),
            KeyCode::F(2) => state.toggle_password(),
            _ => state.edit_current_field(key),
        },
    }

    None
}
