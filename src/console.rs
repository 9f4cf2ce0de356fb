//! Line-oriented operator console.
//!
//! Parses commands, forwards them to the workbench and prints whatever state
//! it exposes. Lookups are spawned on the current `LocalSet`.

use lookup_core::{
    DocumentNumber, LookupClient, NotificationEvent, NotificationScope, SessionError,
    SharedWorkbench,
};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  search <ndoc>        search persons by document number
  open <ndoc|#n>       open attentions for a listed person
  year <yyyy>          change the attention year
  filter [code]        filter attentions by item code (empty clears)
  pagesize <n>         rows per page (13, 25, 50)
  page <n>             go to page n
  close                close the attention view
  show                 print the current state
  help                 print this help
  quit                 exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// 1-based position in the person list.
    Index(usize),
    Document(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Open(Target),
    Year(i32),
    Filter(String),
    PageSize(usize),
    /// 1-based page number.
    Page(usize),
    Close,
    Show,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "search" | "s" => Command::Search(rest.to_string()),
            "open" | "o" => {
                if rest.is_empty() {
                    return Err("usage: open <ndoc|#n>".into());
                }
                match rest.strip_prefix('#') {
                    Some(n) => Command::Open(Target::Index(parse_positive(n, "person index")?)),
                    None => Command::Open(Target::Document(rest.to_string())),
                }
            }
            "year" | "y" => Command::Year(
                rest.parse()
                    .map_err(|_| format!("invalid year: {rest:?}"))?,
            ),
            "filter" | "f" => Command::Filter(rest.to_string()),
            "pagesize" => Command::PageSize(parse_positive(rest, "page size")?),
            "page" | "p" => Command::Page(parse_positive(rest, "page")?),
            "close" | "c" => Command::Close,
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("unknown command {other:?}, try 'help'")),
        };
        Ok(Some(command))
    }
}

fn parse_positive(value: &str, what: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("invalid {what}: {value:?}")),
    }
}

pub async fn run<C: LookupClient + 'static>(shared: SharedWorkbench<C>) -> anyhow::Result<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => {
                if let Err(e) = apply(&shared, command) {
                    println!("! {e}");
                }
                dispatch_attention_query(&shared);
            }
            Err(msg) => println!("! {msg}"),
        }
    }

    Ok(())
}

fn apply<C: LookupClient + 'static>(
    shared: &SharedWorkbench<C>,
    command: Command,
) -> Result<(), SessionError> {
    match command {
        Command::Search(input) => {
            let shared = shared.clone();
            tokio::task::spawn_local(async move {
                shared.search(&input).await;
                render(&shared);
            });
            return Ok(());
        }
        Command::Open(target) => {
            let ndoc = {
                let wb = shared.borrow();
                match target {
                    Target::Index(n) => wb
                        .persons()
                        .get(n - 1)
                        .map(|p| p.document_number.clone())
                        .ok_or_else(|| SessionError::UnknownPerson(format!("#{n}")))?,
                    Target::Document(text) => DocumentNumber::new(&text)
                        .map_err(|_| SessionError::UnknownPerson(text.clone()))?,
                }
            };
            shared.borrow_mut().select(&ndoc)?;
        }
        Command::Year(year) => {
            shared.borrow_mut().set_year(year)?;
        }
        Command::Filter(text) => shared.borrow_mut().set_filter(&text)?,
        Command::PageSize(n) => shared.borrow_mut().set_page_size(n)?,
        Command::Page(n) => shared.borrow_mut().set_page(n - 1)?,
        Command::Close => shared.borrow_mut().close(),
        Command::Show => {}
        Command::Help => {
            println!("{HELP}");
            return Ok(());
        }
        Command::Quit => return Ok(()),
    }
    render(shared);
    Ok(())
}

/// Issues the attention query for a changed session key, if any.
fn dispatch_attention_query<C: LookupClient + 'static>(shared: &SharedWorkbench<C>) {
    let ticket = shared.borrow_mut().sync();
    if let Some(ticket) = ticket {
        let shared = shared.clone();
        tokio::task::spawn_local(async move {
            if shared.run_attention_query(ticket).await {
                render(&shared);
            }
        });
    }
}

fn render<C: LookupClient>(shared: &SharedWorkbench<C>) {
    let mut wb = shared.borrow_mut();

    if wb.persons_loading() {
        println!("searching...");
    }
    for (i, person) in wb.persons().iter().enumerate() {
        println!(
            "#{:<3} {:<20} born {:<12} {:<2} age {}",
            i + 1,
            person.label(),
            person.birth_date,
            person.gender,
            person.age_text()
        );
    }
    print_notification(wb.notification(NotificationScope::PrimarySearch));

    let Some(session) = wb.session() else {
        return;
    };
    let years: Vec<String> = wb.year_options().iter().map(i32::to_string).collect();
    println!(
        "== attentions for {}  year {} [{}]  filter {:?}",
        session.person().label(),
        session.year(),
        years.join(", "),
        session.code_filter()
    );

    if wb.attentions_loading() {
        println!("loading...");
        return;
    }
    print_notification(wb.notification(NotificationScope::DetailSession));

    if let Some(page) = wb.current_page() {
        for event in &page.items {
            println!(
                "{:<10} {:<10} {:<8} {:<40} {:<6} {:<6} {:<6} {}",
                event.visit_id,
                event.visit_date,
                event.item_code,
                event.item_description,
                event.lab1,
                event.lab2,
                event.lab3,
                event.facility
            );
        }
        println!(
            "page {}/{}  ({} shown of {} fetched)",
            page.index + 1,
            page.count,
            page.total_visible,
            page.total_raw
        );
    }
}

fn print_notification(note: Option<&NotificationEvent>) {
    if let Some(note) = note {
        println!("[{}] {}", note.severity, note.message);
    }
}
