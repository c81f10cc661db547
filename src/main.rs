use clap::Parser;
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use myseat_client::{
    api::{HttpTicketingClient, TicketingApi},
    config::{AppConfig, Config, LogFormat},
    error::ClientError,
    flow::{BookingFlow, EVENT_LOAD_FAILED},
    forms::{LoginForm, PayerForm},
    session::SessionManager,
    view, AppState,
};

const HELP: &str = "\
Commands:
  events                      list events
  open <event-id>             open an event
  book                        start a booking
  count <n>                   choose how many seats and show the seat map
  seat <seat-id>              select / deselect a seat
  pick <section> <row> <col>  select / deselect a seat by position
  map                         show the seat map again
  set <field> <value>         fill the booking form (userId, payerName, payerEmail,
                              paymentMethod, paymentReference)
  form                        show the booking form
  submit                      book the selected seats
  refresh                     reload seats
  close                       leave the event
  login <email> <password>    sign in
  logout                      sign out
  whoami                      show the signed-in user
  quit                        exit";

#[derive(Debug, Parser)]
#[command(name = "myseat", about = "Pick seats and book them against the MySeat API")]
struct Cli {
    /// Open this event right away
    #[arg(long)]
    event: Option<i64>,

    /// Override MYSEAT_API_URL
    #[arg(long)]
    api_url: Option<String>,
}

fn init_tracing(app: &AppConfig) {
    // Логи в stderr, чтобы не мешать карте мест в stdout
    let registry = tracing_subscriber::registry().with(EnvFilter::new(&app.rust_log));
    match app.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url);
    }
    init_tracing(&config.app);

    info!("Starting MySeat client ({})", config.app.environment);

    let mut state = AppState::new(config)?;
    let AppState { api, session, .. } = &mut state;
    let api: &HttpTicketingClient = api;

    let mut flow: Option<BookingFlow<'_, HttpTicketingClient>> = None;
    if let Some(event_id) = cli.event {
        flow = open_event(api, session, event_id).await;
    }

    println!("MySeat - type 'help' for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((command, args)) = words.split_first() else {
            continue;
        };

        match *command {
            "help" => println!("{}", HELP),
            "quit" | "exit" => break,
            "events" => match api.fetch_events().await {
                Ok(events) if events.is_empty() => println!("No events yet."),
                Ok(events) => {
                    for event in events {
                        println!(
                            "#{:<4} {}  {}  @ {}",
                            event.id,
                            event.event_date.format("%Y-%m-%d %H:%M"),
                            event.name,
                            event.venue_name
                        );
                    }
                }
                Err(e) => println!("{}", e.user_message("Failed to load events")),
            },
            "open" => match args.first().and_then(|a| a.parse::<i64>().ok()) {
                Some(event_id) => {
                    if let Some(previous) = flow.as_mut() {
                        previous.teardown();
                    }
                    flow = open_event(api, session, event_id).await;
                }
                None => println!("Usage: open <event-id>"),
            },
            "close" => {
                if let Some(mut previous) = flow.take() {
                    previous.teardown();
                }
            }
            "login" => match args {
                [email, password] => {
                    let form = LoginForm::new()
                        .with_field("email", email)
                        .and_then(|f| f.with_field("password", password));
                    let result = match form {
                        Ok(form) => session.login(api, &form).await.map(|u| u.name.clone()),
                        Err(e) => Err(e),
                    };
                    match result {
                        Ok(name) => println!("Signed in as {}", name),
                        Err(e) => println!("{}", e.user_message("Login failed")),
                    }
                }
                _ => println!("Usage: login <email> <password>"),
            },
            "logout" => match session.logout() {
                Ok(()) => println!("Signed out"),
                Err(e) => error!("Logout failed: {}", e),
            },
            "whoami" => match session.current_user() {
                Some(user) => println!("{} <{}> {:?}", user.name, user.email, user.role),
                None => println!("Not signed in"),
            },
            _ => match flow.as_mut() {
                Some(flow) => handle_flow_command(flow, command, args).await,
                None => println!("Open an event first (open <event-id>), or type 'help'."),
            },
        }
    }

    info!("MySeat client stopped");
    Ok(())
}

async fn open_event<'a>(
    api: &'a HttpTicketingClient,
    session: &SessionManager,
    event_id: i64,
) -> Option<BookingFlow<'a, HttpTicketingClient>> {
    match BookingFlow::open(api, event_id, session.current_user()).await {
        Ok(flow) => {
            let event = flow.event();
            println!("{}", event.name);
            println!("{}", event.event_date.format("%Y-%m-%d %H:%M"));
            println!(
                "{}",
                event
                    .description
                    .as_deref()
                    .unwrap_or("Description is not available for this event yet.")
            );
            println!("{}, {}", event.venue_name, event.venue_address);
            println!("Type 'book' to reserve seats.");
            Some(flow)
        }
        Err(ClientError::NotFound(_)) => {
            println!("Event not found.");
            None
        }
        Err(e) => {
            println!("{}", e.user_message(EVENT_LOAD_FAILED));
            None
        }
    }
}

fn print_map(flow: &BookingFlow<'_, HttpTicketingClient>) {
    let controller = flow.controller();
    if !controller.seat_map_visible() {
        return;
    }
    print!(
        "{}",
        view::render_seat_map(flow.seat_map(), |id| flow.section_info(id), controller)
    );
    let mut status = view::selection_status(controller);
    if let Some(total) = flow.estimated_total() {
        status.push_str(&format!(", estimated total {:.2}", total));
    }
    println!("{}", status);
}

fn print_form(form: &PayerForm) {
    for field in PayerForm::FIELDS {
        println!("  {:<17} {}", field, form.field(field).unwrap_or_default());
    }
}

async fn handle_flow_command(
    flow: &mut BookingFlow<'_, HttpTicketingClient>,
    command: &str,
    args: &[&str],
) {
    // Ошибки уже записаны контроллером в message(); здесь только вывод
    let shown_map = match command {
        "book" => {
            if flow.begin_booking().is_ok() {
                println!("How many seats? (count <n>)");
            }
            false
        }
        "count" => {
            let ok = flow.choose_seat_count(args.first().copied().unwrap_or("")).await.is_ok();
            if ok {
                print_map(flow);
            }
            ok
        }
        "seat" => match args.first().and_then(|a| a.parse::<i64>().ok()) {
            Some(seat_id) => flow.toggle_seat(seat_id).is_ok(),
            None => {
                println!("Usage: seat <seat-id>");
                false
            }
        },
        "pick" => {
            let parsed: Vec<i64> = args.iter().filter_map(|a| a.parse().ok()).collect();
            match parsed.as_slice() {
                [section, row, column] if *row > 0 && *column > 0 => flow
                    .toggle_at(*section, *row as u32, *column as u32)
                    .is_ok(),
                _ => {
                    println!("Usage: pick <section> <row> <col>");
                    false
                }
            }
        }
        "map" => {
            print_map(flow);
            false
        }
        "set" => match args.split_first() {
            Some((field, value)) => {
                if let Err(e) = flow.set_payer_field(field, &value.join(" ")) {
                    println!("{}", e);
                }
                false
            }
            None => {
                println!("Usage: set <field> <value>");
                false
            }
        },
        "form" => {
            print_form(flow.payer());
            false
        }
        "submit" => {
            let booked = flow.submit().await.is_ok();
            if let Some(message) = flow.controller().message() {
                println!("{}", message);
            }
            if booked {
                println!("Seat map refreshed. Type 'book' to make another booking.");
            }
            return;
        }
        "refresh" => flow.refresh_seats().await.is_ok(),
        other => {
            println!("Unknown command '{}', type 'help'.", other);
            return;
        }
    };

    if let Some(message) = flow.controller().message() {
        println!("{}", message);
    }
    if shown_map && command != "count" {
        print_map(flow);
    }
}
