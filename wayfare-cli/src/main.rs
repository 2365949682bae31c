//! wayfare-cli: terminal client for the Wayfare flight-booking assistant
//!
//! Talks to the server's HTTP API. Without a message, `chat` opens an
//! interactive prompt that keeps the session id between turns.
//!
//! # Subcommands
//! - `chat [message] [--session <id>] [--user <id>]`  one turn, or a REPL
//! - `seats --session <id> <seat>...`                 submit manually chosen seats
//! - `pay --session <id> [--reference <ref>]`         confirm payment
//! - `status`                                         show server health

use std::io::{BufRead, Write};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::{json, Value};

const DEFAULT_SERVER: &str = "http://127.0.0.1:8787";
const USER_HEADER: &str = "x-user-id";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "wayfare-cli", version, about = "Chat with the Wayfare flight-booking assistant")]
struct Cli {
    /// Wayfare HTTP server URL (overrides WAYFARE_HTTP_URL env var)
    #[arg(long, env = "WAYFARE_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Identity forwarded as the authenticated user
    #[arg(long, env = "WAYFARE_USER_ID", global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Send a message, or start an interactive chat when none is given
    Chat {
        message: Vec<String>,

        /// Continue an existing session
        #[arg(short, long)]
        session: Option<String>,

        /// Print the raw JSON reply
        #[arg(long)]
        json: bool,
    },

    /// Submit manually chosen seats for a session
    Seats {
        #[arg(short, long)]
        session: String,

        #[arg(required = true)]
        seats: Vec<String>,
    },

    /// Confirm payment for a session's booking
    Pay {
        #[arg(short, long)]
        session: String,

        /// Payment provider reference recorded with the booking
        #[arg(long)]
        reference: Option<String>,
    },

    /// Show Wayfare server status
    Status,
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: String,
    pub session_id: String,
    pub navigate_to: Option<Value>,
    pub booking_draft: Option<Value>,
    pub results_count: Option<usize>,
}

/// Human-readable rendering of one assistant reply.
pub fn render_reply(reply: &ChatReply) -> String {
    let mut out = reply.reply.clone();
    if let Some(draft) = &reply.booking_draft {
        let stage = draft["stage"].as_str().unwrap_or("?");
        let seats: Vec<&str> = draft["selectedSeats"]
            .as_array()
            .map(|a| a.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        out.push_str(&format!("\n  [draft: {}", stage));
        if !seats.is_empty() {
            out.push_str(&format!(", seats {}", seats.join(" ")));
        }
        if let Some(id) = draft["bookingId"].as_str() {
            out.push_str(&format!(", booking {}", id));
        }
        out.push(']');
    }
    if let Some(nav) = &reply.navigate_to {
        out.push_str(&format!("\n  -> {}", nav["path"].as_str().unwrap_or("?")));
    }
    out
}

/// Status lines for a `/health` body.
pub fn render_status(body: &Value) -> String {
    let mut lines = vec![
        format!("Wayfare server: {}", body["status"].as_str().unwrap_or("unknown")),
        format!("Version:        {}", body["version"].as_str().unwrap_or("?")),
        format!("Flights:        {}", body["flights"].as_str().unwrap_or("?")),
        format!("Bookings:       {}", body["bookings"].as_str().unwrap_or("?")),
        format!("Sessions:       {}", body["sessions"]),
        format!("Help responder: {}", body["help"]),
    ];
    if let Some(db) = body["postgresql"].as_object() {
        lines.push(format!(
            "PostgreSQL:     {} ({} flights, {} bookings)",
            db.get("serverVersion").and_then(Value::as_str).unwrap_or("?"),
            db.get("flights").unwrap_or(&Value::Null),
            db.get("bookings").unwrap_or(&Value::Null)
        ));
    }
    lines.join("\n")
}

/// Pull the server's error text out of a failed response body.
pub fn error_text(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(v) => match (v["error"].as_str(), v["details"].as_str()) {
            (Some(e), Some(d)) => format!("{}: {}", e, d),
            (Some(e), None) => e.to_string(),
            _ => body.to_string(),
        },
        Err(_) => body.to_string(),
    }
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

struct Client {
    http: reqwest::blocking::Client,
    server: String,
    user: Option<String>,
}

impl Client {
    fn new(server: &str, user: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            server: server.trim_end_matches('/').to_string(),
            user,
        })
    }

    fn post(&self, path: &str, body: Value) -> anyhow::Result<Value> {
        let url = format!("{}{}", self.server, path);
        let mut req = self.http.post(&url).json(&body);
        if let Some(user) = &self.user {
            req = req.header(USER_HEADER, user);
        }

        let resp = req
            .send()
            .map_err(|e| anyhow::anyhow!("connection failed to {}: {}", url, e))?;
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("server returned {}: {}", status, error_text(&text));
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn chat(&self, message: &str, session: Option<&str>) -> anyhow::Result<Value> {
        self.post(
            "/assistant/chat",
            json!({ "message": message, "sessionId": session }),
        )
    }
}

fn do_chat(client: &Client, message: Vec<String>, session: Option<String>, raw: bool) -> anyhow::Result<()> {
    if !message.is_empty() {
        let body = client.chat(&message.join(" "), session.as_deref())?;
        if raw {
            println!("{}", serde_json::to_string_pretty(&body)?);
        } else {
            let reply: ChatReply = serde_json::from_value(body)?;
            println!("{}", render_reply(&reply));
            eprintln!("(session {})", reply.session_id);
        }
        return Ok(());
    }

    let mut session = session;
    let stdin = std::io::stdin();
    println!("Wayfare chat. Type 'exit' to quit.");
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        match client.chat(line, session.as_deref()) {
            Ok(body) => {
                let reply: ChatReply = serde_json::from_value(body)?;
                println!("wayfare> {}\n", render_reply(&reply));
                session = Some(reply.session_id);
            }
            Err(e) => eprintln!("wayfare-cli: {}", e),
        }
    }
    Ok(())
}

fn do_seats(client: &Client, session: &str, seats: Vec<String>) -> anyhow::Result<()> {
    let body = client.post(
        "/assistant/seats",
        json!({ "sessionId": session, "seats": seats }),
    )?;
    let reply: ChatReply = serde_json::from_value(body)?;
    println!("{}", render_reply(&reply));
    Ok(())
}

fn do_pay(client: &Client, session: &str, reference: Option<String>) -> anyhow::Result<()> {
    let payment = reference.map(|r| json!({ "reference": r }));
    let body = client.post(
        "/assistant/confirm-payment",
        json!({ "sessionId": session, "paymentResult": payment }),
    )?;
    println!("{}", body["reply"].as_str().unwrap_or("Payment confirmed."));
    let booking = &body["booking"];
    println!("Booking:  {}", booking["id"].as_str().unwrap_or("?"));
    println!("Status:   {}", booking["paymentStatus"].as_str().unwrap_or("?"));
    println!("Total:    {}", booking["totalAmount"]);
    Ok(())
}

/// Show the server status by calling GET /health.
fn do_status(server: &str) -> anyhow::Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let url = format!("{}/health", server.trim_end_matches('/'));
    match client.get(&url).send() {
        Ok(r) if r.status().is_success() => {
            let body: Value = r.json().unwrap_or_default();
            println!("{}", render_status(&body));
        }
        Ok(r) => {
            eprintln!("wayfare-cli: server unhealthy (HTTP {})", r.status());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("wayfare-cli: cannot reach {}: {}", url, e);
            std::process::exit(1);
        }
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Status => do_status(&cli.server),
        command => Client::new(&cli.server, cli.user).and_then(|client| match command {
            Commands::Chat {
                message,
                session,
                json,
            } => do_chat(&client, message, session, json),
            Commands::Seats { session, seats } => do_seats(&client, &session, seats),
            Commands::Pay { session, reference } => do_pay(&client, &session, reference),
            Commands::Status => Ok(()),
        }),
    };

    if let Err(e) = result {
        eprintln!("wayfare-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
