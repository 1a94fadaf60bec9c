//! This client is a small command-line front end for the notes server.
//! The server's base URL comes from the local configuration file and can
//! be overridden with the BASE_URL environment variable.
use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use config::{Config, File, FileFormat};
use reqwest::blocking::{Client, Response};
use skribe::request::NotePayload;
use skribe::response::{ErrorResponse, MessageResponse, Note};
use std::path::Path;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Parser, Debug)]
#[command(name = "client", about = "Manage notes on a skribe server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every note
    List,
    /// Show notes whose title or content contains the query
    Search { query: String },
    /// Create a note
    Add { title: String, content: String },
    /// Replace the title and content of a note
    Edit {
        id: i64,
        title: String,
        content: String,
    },
    /// Delete a note
    Delete { id: i64 },
}

/// Finds the location for this app's local configuration.
fn get_config_base_path() -> anyhow::Result<String> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        Ok(path)
    } else if let Some(home) = dirs::home_dir() {
        Ok(home
            .join(".config")
            .to_str()
            .ok_or_else(|| anyhow!("failed to find local config path"))?
            .to_owned())
    } else {
        Err(anyhow!("failed to find config file path"))
    }
}

/// Reads the base URL from the config file, if there is one.
fn load_base_url(config_file_path: &Path) -> anyhow::Result<String> {
    let mut builder = Config::builder()
        .set_default("base_url", DEFAULT_BASE_URL)?
        .add_source(
            File::from(config_file_path)
                .required(false)
                .format(FileFormat::Toml),
        );

    if let Ok(base_url) = std::env::var("BASE_URL") {
        builder = builder.set_override("base_url", base_url)?;
    }

    let config = builder.build().context("failed to load config file")?;
    let base_url = config
        .get::<String>("base_url")
        .context("property 'base_url' is not a string")?;

    Ok(base_url.trim_end_matches('/').to_owned())
}

/// Passes successful responses through and turns everything else into an
/// error carrying the server's message.
fn check(res: Response) -> anyhow::Result<Response> {
    let status = res.status();

    if status.is_success() {
        return Ok(res);
    }

    let message = res
        .json::<ErrorResponse>()
        .map(|body| body.error)
        .unwrap_or_else(|_| "no error message".to_owned());

    Err(anyhow!("request failed with {status}: {message}"))
}

fn list_notes(client: &Client, base_url: &str, query: Option<&str>) -> anyhow::Result<Vec<Note>> {
    let mut req = client.get(format!("{base_url}/notes"));

    if let Some(query) = query {
        req = req.query(&[("q", query)]);
    }

    let res = req.send().context("request for notes failed")?;

    check(res)?
        .json::<Vec<Note>>()
        .context("failed to parse notes")
}

fn create_note(client: &Client, base_url: &str, payload: &NotePayload) -> anyhow::Result<Note> {
    let res = client
        .post(format!("{base_url}/notes"))
        .json(payload)
        .send()
        .context("request to create note failed")?;

    check(res)?.json::<Note>().context("failed to parse note")
}

fn update_note(
    client: &Client,
    base_url: &str,
    id: i64,
    payload: &NotePayload,
) -> anyhow::Result<Note> {
    let res = client
        .put(format!("{base_url}/notes/{id}"))
        .json(payload)
        .send()
        .context("request to update note failed")?;

    check(res)?.json::<Note>().context("failed to parse note")
}

fn delete_note(client: &Client, base_url: &str, id: i64) -> anyhow::Result<String> {
    let res = client
        .delete(format!("{base_url}/notes/{id}"))
        .send()
        .context("request to delete note failed")?;
    let body = check(res)?
        .json::<MessageResponse>()
        .context("failed to parse response")?;

    Ok(body.message)
}

fn print_note(note: &Note) {
    println!("#{} {}", note.id, note.title);
    println!("   updated {}", note.updated_at.format("%Y-%m-%d %H:%M:%S"));
    for line in note.content.lines() {
        println!("   {line}");
    }
}

fn main() -> anyhow::Result<()> {
    // setup logging
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("client=debug")
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("failed to set global default");

    let cli = Cli::parse();

    // determine config file path
    let config_base_path = get_config_base_path()?;
    let config_file_path = Path::new(&config_base_path)
        .join("skribe")
        .join("config.toml");
    let base_url = load_base_url(&config_file_path)?;

    debug!("config file path: {:?}", config_file_path);
    debug!("base url: {:?}", base_url);

    // use the same http client for all requests
    let client = Client::new();

    match cli.command {
        Command::List => list_notes(&client, &base_url, None)?.iter().for_each(print_note),
        Command::Search { query } => list_notes(&client, &base_url, Some(&query))?
            .iter()
            .for_each(print_note),
        Command::Add { title, content } => {
            print_note(&create_note(&client, &base_url, &NotePayload { title, content })?)
        }
        Command::Edit { id, title, content } => print_note(&update_note(
            &client,
            &base_url,
            id,
            &NotePayload { title, content },
        )?),
        Command::Delete { id } => println!("{}", delete_note(&client, &base_url, id)?),
    }

    Ok(())
}
