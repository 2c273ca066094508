//! A line-oriented interactive session.
//!
//! Each line is one operator action: changing the selection, editing a
//! filter, toggling or moving a column, showing or exporting the view.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use idpconn::{load, ConnectionType, Environment, Exporter, FetchTicket, RecordFetcher, Session};

use crate::table;

const HELP: &str = "\
Commands:
  env <dev|qa|prod>       switch environment and reload
  type <saml|oauth>       switch connection type and reload
  reload                  fetch the current selection again
  filter <column> [text]  filter a column (no text clears it)
  toggle <column>         hide or show a column
  move <from> <to>        move the column at position <from> to <to>
  reset                   show all columns in their default order
  show                    print the current view
  columns                 list visible and hidden columns
  export                  export the current view to a spreadsheet
  help                    print this message
  quit                    leave the shell
";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Env(Environment),
    Type(ConnectionType),
    Reload,
    Filter { column: String, text: String },
    Toggle(String),
    Move(usize, usize),
    Reset,
    Show,
    Columns,
    Export,
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let cmd = words.next().unwrap_or_default();
        let rest = words.collect::<Vec<&str>>();
        let arg = |i: usize| {
            rest.get(i)
                .copied()
                .ok_or_else(|| format!("\"{}\" is missing an argument (try \"help\")", cmd))
        };
        let index = |i: usize| {
            arg(i).and_then(|s| {
                s.parse::<usize>()
                    .map_err(|_| format!("not a column position: {}", s))
            })
        };
        Ok(match cmd {
            "env" => Self::Env(
                arg(0)?
                    .parse::<Environment>()
                    .map_err(|e| e.to_string())?,
            ),
            "type" => Self::Type(
                arg(0)?
                    .parse::<ConnectionType>()
                    .map_err(|e| e.to_string())?,
            ),
            "reload" => Self::Reload,
            "filter" => Self::Filter {
                column: arg(0)?.to_string(),
                text: rest.get(1..).map(|t| t.join(" ")).unwrap_or_default(),
            },
            "toggle" => Self::Toggle(arg(0)?.to_string()),
            "move" => Self::Move(index(0)?, index(1)?),
            "reset" => Self::Reset,
            "show" => Self::Show,
            "columns" => Self::Columns,
            "export" => Self::Export,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => return Err(format!("unknown command \"{}\" (try \"help\")", cmd)),
        })
    }
}

/// Run the shell until `quit` or end of input.
pub fn run<F, R, W>(
    session: &mut Session,
    fetcher: &F,
    exporter: &Exporter<'_>,
    input: R,
    mut out: W,
) -> io::Result<()>
where
    F: RecordFetcher + ?Sized,
    R: BufRead,
    W: Write,
{
    writeln!(out, "{}", summary(session))?;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cmd = match ShellCommand::from_str(&line) {
            Ok(cmd) => cmd,
            Err(e) => {
                writeln!(out, "error: {}", e)?;
                continue;
            }
        };
        match cmd {
            ShellCommand::Env(env) => {
                let ticket = session.set_environment(env);
                fetch(session, ticket, fetcher, &mut out)?;
            }
            ShellCommand::Type(ct) => {
                let ticket = session.set_connection_type(ct);
                fetch(session, ticket, fetcher, &mut out)?;
            }
            ShellCommand::Reload => {
                let ticket = session.begin_fetch();
                fetch(session, ticket, fetcher, &mut out)?;
            }
            ShellCommand::Filter { column, text } => {
                session.set_filter(&column, &text);
                writeln!(out, "{}", summary(session))?;
            }
            ShellCommand::Toggle(column) => match session.toggle_column(&column) {
                Ok(()) => writeln!(out, "{}", summary(session))?,
                Err(e) => writeln!(out, "error: {}", e)?,
            },
            ShellCommand::Move(from, to) => match session.reorder_column(from, to) {
                Ok(()) => writeln!(out, "{}", session.projection().columns().join(", "))?,
                Err(e) => writeln!(out, "error: {}", e)?,
            },
            ShellCommand::Reset => {
                session.show_all_columns();
                writeln!(out, "{}", session.projection().columns().join(", "))?;
            }
            ShellCommand::Show => write!(out, "{}", table::render(session.view()))?,
            ShellCommand::Columns => write!(out, "{}", columns(session))?,
            ShellCommand::Export => match session.export(exporter) {
                Ok(path) => writeln!(out, "exported to {}", path.display())?,
                Err(e) => writeln!(out, "error: {}", e)?,
            },
            ShellCommand::Help => write!(out, "{}", HELP)?,
            ShellCommand::Quit => break,
        }
    }
    Ok(())
}

fn fetch<F, W>(
    session: &mut Session,
    ticket: FetchTicket,
    fetcher: &F,
    out: &mut W,
) -> io::Result<()>
where
    F: RecordFetcher + ?Sized,
    W: Write,
{
    let result = load(fetcher, ticket.selection());
    session.complete(ticket, result);
    if let Some(e) = session.diagnostic() {
        writeln!(out, "warning: {}", e)?;
    }
    writeln!(out, "{}", summary(session))
}

/// One line describing the selection and how much of it is shown.
pub fn summary(session: &Session) -> String {
    format!(
        "{}: showing {} of {} connection(s), {} column(s)",
        session.selection(),
        session.view().len(),
        session.dataset().len(),
        session.projection().len()
    )
}

/// Visible and hidden columns, with their filters.
pub fn columns(session: &Session) -> String {
    let mut out = String::new();
    for (i, col) in session.projection().columns().iter().enumerate() {
        match session.filters().get(col).filter(|t| !t.is_empty()) {
            Some(text) => out.push_str(&format!("{:>3}  {}  [filter: {}]\n", i, col, text)),
            None => out.push_str(&format!("{:>3}  {}\n", i, col)),
        }
    }
    for col in session.projection().hidden() {
        out.push_str(&format!("  -  {} (hidden)\n", col));
    }
    for (col, text) in session.hidden_filters() {
        out.push_str(&format!(
            "note: hidden column {} is still filtered by \"{}\"\n",
            col, text
        ));
    }
    out
}
