mod api;
mod auth;
mod client;
mod config;
mod db;
mod invoice_gen;
mod models;
mod server;
mod ui;
mod workspace;

use std::{fs::File, io, sync::Mutex};

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::client::ApiClient;
use crate::config::Config;
use crate::invoice_gen::InvoiceGenerator;
use crate::ui::{
    access::{handle_input as handle_access_input, render_access, AccessAction, AccessState},
    invoicing::{
        handle_input as handle_invoicing_input, render_invoicing, InvoicingAction, InvoicingState,
    },
};
use crate::workspace::clock_label;

const LOG_FILE: &str = "facturacion.log";

#[derive(Parser)]
#[command(name = "facturacion", version, about = "Single-company invoicing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the registration and login backend
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Open the terminal invoicing front end
    App {
        /// Backend base URL (overrides API_BASE_URL)
        #[arg(long)]
        api_url: Option<String>,
    },
}

// Represents the current screen in the app
enum AppScreen {
    Access,
    Invoicing,
}

// Front end state
struct AppState {
    api: ApiClient,
    generator: InvoiceGenerator,
    /// Company name of the logged-in session
    session: Option<String>,
    screen: AppScreen,
    access_state: Option<AccessState>,
    invoicing_state: Option<InvoicingState>,
}

impl AppState {
    fn new(api: ApiClient, generator: InvoiceGenerator) -> Self {
        Self {
            api,
            generator,
            session: None,
            screen: AppScreen::Access,
            access_state: Some(AccessState::new()),
            invoicing_state: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = config::init()?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }

            fmt().with_env_filter(env_filter()).init();

            server::start_server(config).await
        }
        Command::App { api_url } => {
            if let Some(api_url) = api_url {
                config.api_base_url = api_url;
            }

            // The terminal is taken over by the UI, so logs go to a file
            let log_file = File::create(LOG_FILE)?;
            fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(Mutex::new(log_file))
                .init();

            run_front_end(config).await
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

async fn run_front_end(config: Config) -> Result<()> {
    println!("Initializing invoicing front end...");
    info!("Using backend at {}", config.api_base_url);

    let api = ApiClient::new(&config.api_base_url);
    let generator = InvoiceGenerator::new(&config.invoice_dir);

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(api, generator);

    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!("Front end stopped: {err}");
        println!("Error: {}", err);
    }

    println!("Goodbye!");

    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| match app_state.screen {
            AppScreen::Access => {
                if let Some(state) = &mut app_state.access_state {
                    render_access(f, state);
                }
            }
            AppScreen::Invoicing => {
                if let Some(state) = &mut app_state.invoicing_state {
                    render_invoicing(f, state);
                }
            }
        })?;

        let should_quit = match app_state.screen {
            AppScreen::Access => handle_access_screen(app_state).await?,
            AppScreen::Invoicing => handle_invoicing_screen(app_state)?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

fn open_access(app_state: &mut AppState) {
    app_state.access_state = Some(AccessState::new());
    app_state.invoicing_state = None;
    app_state.screen = AppScreen::Access;
}

fn open_invoicing(app_state: &mut AppState) {
    // Invoicing requires a logged-in company
    let Some(company) = &app_state.session else {
        open_access(app_state);
        return;
    };

    app_state.invoicing_state = Some(InvoicingState::new(company));
    app_state.screen = AppScreen::Invoicing;
}

async fn handle_access_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.access_state {
        Some(state) => handle_access_input(state)?,
        None => None,
    };

    match action {
        Some(AccessAction::Quit) => return Ok(true),
        Some(AccessAction::Login { name, password }) => {
            match app_state.api.login(&name, &password).await {
                Ok(response) => {
                    info!("Logged in as {}", response.nombre_empresa);
                    app_state.session = Some(response.nombre_empresa);
                    open_invoicing(app_state);
                }
                Err(e) => {
                    if let Some(state) = &mut app_state.access_state {
                        state.show_error(e.to_string());
                    }
                }
            }
        }
        Some(AccessAction::Register { name, password }) => {
            let result = app_state.api.register(&name, &password).await;

            if let Some(state) = &mut app_state.access_state {
                match result {
                    Ok(response) => {
                        info!("Registered company {}", response.nombre_empresa);
                        state.registered(&response.nombre_empresa);
                    }
                    Err(e) => state.show_error(e.to_string()),
                }
            }
        }
        None => {}
    }

    Ok(false)
}

fn handle_invoicing_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.invoicing_state {
        Some(state) => handle_invoicing_input(state)?,
        None => None,
    };

    match action {
        Some(InvoicingAction::Quit) => return Ok(true),
        Some(InvoicingAction::Logout) => {
            info!("Logged out");
            app_state.session = None;
            open_access(app_state);
        }
        Some(InvoicingAction::Print) => {
            if let Some(state) = &mut app_state.invoicing_state {
                let clock = clock_label(Local::now().time());

                match app_state.generator.print_invoice(state.workspace(), &clock) {
                    Ok((md_path, Some(pdf_path))) => state.set_notice(format!(
                        "Invoice printed to {} and {}",
                        md_path.display(),
                        pdf_path.display()
                    )),
                    Ok((md_path, None)) => {
                        state.set_notice(format!("Invoice printed to {}", md_path.display()))
                    }
                    Err(e) => {
                        error!("Printing failed: {e}");
                        state.set_error(format!("Could not print the invoice: {e}"));
                    }
                }
            }
        }
        None => {}
    }

    Ok(false)
}
