use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use hn_search::{Config, HackerNewsClient, SearchSession, Snapshot, Status};

const HELP: &str = "\
commands:
  search <term>   (or /<term>) run a search, reusing earlier results for the same term
  more            load the next page
  dismiss <id>    hide a hit from the current list
  filter [text]   only show hits whose title or author contains text
  open <id>       open a hit's link in the browser
  show            print the current list
  help
  quit";

#[derive(Debug, PartialEq)]
enum Command {
    Search(String),
    More,
    Dismiss(String),
    Filter(String),
    Open(String),
    Show,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if let Some(term) = line.strip_prefix('/') {
            return Some(Command::Search(term.trim().to_string()));
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "search" | "s" => Some(Command::Search(rest.to_string())),
            "more" | "next" | "n" => Some(Command::More),
            "dismiss" | "d" if !rest.is_empty() => Some(Command::Dismiss(rest.to_string())),
            "filter" | "f" => Some(Command::Filter(rest.to_string())),
            "open" | "o" if !rest.is_empty() => Some(Command::Open(rest.to_string())),
            "show" | "ls" | "" => Some(Command::Show),
            "help" | "?" => Some(Command::Help),
            "quit" | "exit" | "q" => Some(Command::Quit),
            _ => None,
        }
    }
}

struct HackerNewsSearchApp {
    session: SearchSession,
    // Local filter applied on top of the active query's hits
    filter: String,
}

impl HackerNewsSearchApp {
    fn new(session: SearchSession) -> Self {
        Self {
            session,
            filter: String::new(),
        }
    }

    // Returns false when the user asked to quit
    async fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Search(term) => {
                self.filter.clear();
                match self.session.submit_query(&term) {
                    Ok(_) => {
                        self.session.settle().await;
                        self.render();
                    }
                    Err(e) => println!("{}", e),
                }
            }
            Command::More => {
                if self.session.next_page() {
                    self.session.settle().await;
                    self.render();
                } else if self.is_loading() {
                    println!("Still loading, try again in a moment.");
                } else {
                    println!("No more results.");
                }
            }
            Command::Dismiss(id) => {
                if self.session.dismiss(&id) {
                    self.render();
                } else {
                    println!("No hit with id {}", id);
                }
            }
            Command::Filter(text) => {
                self.filter = text;
                self.render();
            }
            Command::Open(id) => self.open_link(&id),
            Command::Show => self.render(),
            Command::Help => println!("{}", HELP),
            Command::Quit => return false,
        }
        true
    }

    fn is_loading(&self) -> bool {
        self.session
            .store()
            .active_query()
            .is_some_and(|query| self.session.store().is_in_flight(query))
    }

    fn open_link(&self, id: &str) {
        let snapshot = self.session.snapshot();
        match snapshot.hits.iter().find(|hit| hit.id == id) {
            Some(hit) if !hit.url.is_empty() => {
                if let Err(e) = open::that(&hit.url) {
                    tracing::warn!(url = %hit.url, error = %e, "Failed to open URL");
                }
            }
            Some(_) => println!("Hit {} has no link", id),
            None => println!("No hit with id {}", id),
        }
    }

    fn render(&self) {
        let snapshot = self.session.snapshot();
        print!("{}", render_snapshot(&snapshot, &self.filter));
    }
}

fn render_snapshot(snapshot: &Snapshot, filter: &str) -> String {
    let mut out = String::new();

    let Some(query) = &snapshot.query else {
        return "No search yet. Try `search redux`.\n".to_string();
    };

    // A failure hides the list but keeps it for when the next fetch succeeds
    if let Status::Failed(info) = &snapshot.status {
        out.push_str("Something went wrong.\n");
        tracing::debug!(error = %info.message, "Showing failure instead of results");
        return out;
    }

    let hits = snapshot.filtered(filter);
    let now = Utc::now();
    for hit in &hits {
        out.push_str(&format!(
            "{:>10}  {}\n            {} points | {} comments | by {} | {}\n",
            hit.id,
            hit.title,
            hit.points,
            hit.comment_count,
            hit.author,
            hit.time_ago(now),
        ));
    }

    out.push_str(&format!(
        "-- \"{}\": {} of {} hits, page {}{}\n",
        query,
        hits.len(),
        snapshot.hits.len(),
        snapshot.page,
        if snapshot.has_more { ", `more` for next page" } else { "" },
    ));
    out
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("hn_search=info".parse()?))
        .init();

    let config = Config::from_env()?;
    let client = HackerNewsClient::new(&config)?;
    let session = SearchSession::new(Arc::new(client), config.hits_per_page);
    let mut app = HackerNewsSearchApp::new(session);

    // Start with the default query, like the page does on first load
    app.handle(Command::Search(config.default_query.clone())).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Some(command) => {
                if !app.handle(command).await {
                    break;
                }
            }
            None => println!("Unknown command. Type `help`."),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_search::{FailureInfo, FailureKind, Hit};

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("search redux"), Some(Command::Search("redux".into())));
        assert_eq!(Command::parse("/ rust lang"), Some(Command::Search("rust lang".into())));
        assert_eq!(Command::parse("more"), Some(Command::More));
        assert_eq!(Command::parse("dismiss 42"), Some(Command::Dismiss("42".into())));
        assert_eq!(Command::parse("dismiss"), None);
        assert_eq!(Command::parse("filter"), Some(Command::Filter(String::new())));
        assert_eq!(Command::parse("  "), Some(Command::Show));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(Command::parse("frobnicate"), None);
    }

    #[test]
    fn test_render_failure_hides_list() {
        let snapshot = Snapshot {
            query: Some("abc".into()),
            hits: vec![Hit::new("1", "kept")],
            page: 0,
            status: Status::Failed(FailureInfo {
                kind: FailureKind::Network,
                message: "down".into(),
            }),
            has_more: true,
        };

        assert_eq!(render_snapshot(&snapshot, ""), "Something went wrong.\n");
    }

    #[test]
    fn test_render_applies_filter() {
        let snapshot = Snapshot {
            query: Some("redux".into()),
            hits: vec![Hit::new("1", "Redux"), Hit::new("2", "MobX")],
            page: 0,
            status: Status::Ready,
            has_more: false,
        };

        let out = render_snapshot(&snapshot, "redux");
        assert!(out.contains("Redux"));
        assert!(!out.contains("MobX"));
        assert!(out.contains("1 of 2 hits"));
    }
}
