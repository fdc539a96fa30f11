mod cli;
mod storage;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use crossbeam_channel::{Receiver, Sender, unbounded};
use magpie_syntax::parse_query;
use photo_index::{MediaRecord, MediaTable, Notice, RecordId, ResultClass, SessionStore, UserId};
use std::io::Write;
use storage::{LocalStore, MediaStore};
use tracing::info;

/// The line-oriented front end runs single-user.
const REPL_USER: UserId = 0;

/// What the engine thread sends back for one input line.
enum Reply {
    TagOverview {
        total: usize,
        counts: Vec<(String, usize)>,
    },
    Results {
        notices: Vec<Notice>,
        total: usize,
        page: Vec<MediaRecord>,
        has_more: bool,
    },
    NoOp {
        notices: Vec<Notice>,
    },
    Empty {
        notices: Vec<Notice>,
        line: String,
    },
    NoSession,
    Failure(String),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();

    let table = MediaTable::load(&cli.db)?;
    info!(records = table.len(), "ready");
    let store = LocalStore::new(cli.storage.clone());

    // The table and all sessions live on one engine thread; the channel
    // serializes query handling, so a user's session is never raced.
    let (request_tx, request_rx) = unbounded::<(UserId, String)>();
    let (reply_tx, reply_rx) = unbounded::<Reply>();
    let engine = std::thread::spawn(move || engine_loop(table, request_rx, reply_tx));

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush().context("stdout is closed")?;
        let mut line = String::new();
        if stdin.read_line(&mut line).context("stdin is closed")? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        } else if line == "/bye" {
            break;
        }

        request_tx
            .send((REPL_USER, line.to_string()))
            .context("engine thread is gone")?;
        let reply = reply_rx.recv().context("engine thread is gone")?;
        print_reply(reply, &store, cli.json)?;
    }

    drop(request_tx);
    engine.join().expect("engine thread panicked");
    Ok(())
}

fn engine_loop(table: MediaTable, requests: Receiver<(UserId, String)>, replies: Sender<Reply>) {
    let sessions = SessionStore::new();
    for (user, line) in requests {
        // Whatever goes wrong inside a single query must not take the engine
        // down; it becomes one textual failure reply.
        let reply = handle_line(&table, &sessions, user, &line)
            .unwrap_or_else(|error| Reply::Failure(format!("An error occurred: {error:#}")));
        if replies.send(reply).is_err() {
            break;
        }
    }
}

fn handle_line(
    table: &MediaTable,
    sessions: &SessionStore,
    user: UserId,
    line: &str,
) -> Result<Reply> {
    if line.eq_ignore_ascii_case("tags") {
        let counts = table
            .tag_counts()
            .into_iter()
            .map(|(tag, count)| (tag.to_string(), count))
            .collect();
        return Ok(Reply::TagOverview {
            total: table.len(),
            counts,
        });
    }
    if line.eq_ignore_ascii_case("more") {
        let Some(session) = sessions.get(user) else {
            return Ok(Reply::NoSession);
        };
        let mut session = session.lock();
        let page = session.next_page();
        return Ok(Reply::Results {
            notices: Vec::new(),
            total: session.len(),
            page: expand(table, &page.ids),
            has_more: page.has_more,
        });
    }

    let outcome = table.search(&parse_query(line));
    match outcome.class {
        ResultClass::NoOp => Ok(Reply::NoOp {
            notices: outcome.notices,
        }),
        ResultClass::Empty => Ok(Reply::Empty {
            notices: outcome.notices,
            line: line.to_string(),
        }),
        ResultClass::Hits => {
            let total = outcome.records.len();
            let session = sessions.replace(user, outcome.records);
            let page = session.lock().next_page();
            Ok(Reply::Results {
                notices: outcome.notices,
                total,
                page: expand(table, &page.ids),
                has_more: page.has_more,
            })
        }
    }
}

fn expand(table: &MediaTable, ids: &[RecordId]) -> Vec<MediaRecord> {
    ids.iter().map(|&id| table.record(id).clone()).collect()
}

fn print_reply(reply: Reply, store: &impl MediaStore, json: bool) -> Result<()> {
    match reply {
        Reply::TagOverview { total, counts } => {
            println!("The table has {total} entries. Available tags:");
            for (tag, count) in counts {
                println!("  {tag}: {count} entries");
            }
        }
        Reply::NoOp { notices } => {
            print_notices(&notices);
            println!("That didn't work, try another query!");
        }
        Reply::Empty { notices, line } => {
            print_notices(&notices);
            println!("No results for \"{line}\".");
        }
        Reply::NoSession => {
            println!("Nothing to page through yet, run a search first.");
        }
        Reply::Failure(message) => println!("{message}"),
        Reply::Results {
            notices,
            total,
            page,
            has_more,
        } => {
            print_notices(&notices);
            if page.is_empty() {
                println!("No further results.");
                return Ok(());
            }
            println!("{total} results.");
            for record in &page {
                if json {
                    println!("{}", serde_json::to_string(record).context("record is not serializable")?);
                } else {
                    print_record(record, store);
                }
            }
            if has_more {
                println!("Type `more` for the next page.");
            }
        }
    }
    Ok(())
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        println!("{notice}");
    }
}

fn print_record(record: &MediaRecord, store: &impl MediaStore) {
    let path = record.storage_path();
    if record.is_video() {
        println!("Video {path} is not in storage.");
        return;
    }
    match store.fetch(&path) {
        Ok(bytes) => println!("{path} ({} KiB): {}", bytes.len() / 1024, record.display_line()),
        Err(_) => println!("Failed to retrieve {path}."),
    }
}
