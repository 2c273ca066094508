use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use idpconn::{Config, ConnectionType, Environment, ProjectionError, Session};

mod shell;
mod table;

#[derive(Parser, Debug)]
#[clap(name = "idpconn", about, version)]
struct Args {
    /// Increase output logging verbosity.
    #[clap(short, long)]
    verbose: bool,

    /// Configuration file (JSON or YAML). Defaults apply if it is missing.
    #[clap(short, long, default_value = "idpconn.yaml")]
    config: PathBuf,

    /// Environment to inspect: dev, qa or prod.
    #[clap(short, long)]
    env: Option<Environment>,

    /// Connection type to inspect: saml or oauth.
    #[clap(short = 't', long = "type")]
    connection_type: Option<ConnectionType>,

    /// Only keep connections whose COLUMN contains TEXT (case-insensitive).
    #[clap(short, long = "filter", value_name = "COLUMN=TEXT")]
    filters: Vec<ColumnFilter>,

    /// Hide a column.
    #[clap(long = "hide", value_name = "COLUMN")]
    hidden: Vec<String>,

    /// Move the visible column at position FROM to position TO.
    #[clap(long = "move", value_name = "FROM:TO")]
    moves: Vec<ColumnMove>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the matching connections as a table.
    Show,
    /// List the visible and hidden columns.
    Columns,
    /// Export the matching connections to a spreadsheet.
    Export {
        /// Directory to write the spreadsheet to.
        #[clap(short, long)]
        out: Option<PathBuf>,
    },
    /// Start an interactive session.
    Shell,
}

#[derive(Debug, Clone)]
struct ColumnFilter {
    column: String,
    text: String,
}

impl FromStr for ColumnFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, text) = s
            .split_once('=')
            .ok_or_else(|| format!("expected COLUMN=TEXT, got \"{}\"", s))?;
        Ok(Self {
            column: column.to_string(),
            text: text.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnMove {
    from: usize,
    to: usize,
}

impl FromStr for ColumnMove {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| format!("expected FROM:TO column positions, got \"{}\"", s))
        };
        let (from, to) = s
            .split_once(':')
            .ok_or_else(|| format!("expected FROM:TO column positions, got \"{}\"", s))?;
        Ok(Self {
            from: parse(from)?,
            to: parse(to)?,
        })
    }
}

fn main() {
    let args = Args::parse();
    simple_logger::init_with_level(if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    })
    .unwrap();

    if let Err(e) = run(args) {
        log::error!("Failed: {}", chain(e.as_ref()));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load(&args.config)?;
    if let Some(env) = args.env {
        config.environment = env;
    }
    if let Some(ct) = args.connection_type {
        config.connection_type = ct;
    }
    if let Command::Export { out: Some(dir) } = &args.command {
        config.output_dir = dir.clone();
    }
    let fetcher = config.fetcher()?;
    let exporter = config.exporter()?;

    let mut session = Session::new(config.selection());
    session.refresh(&*fetcher);
    if let Some(e) = session.diagnostic() {
        log::warn!("No connections loaded: {}", e);
    }
    for f in &args.filters {
        session.set_filter(&f.column, &f.text);
    }
    for col in &args.hidden {
        if !session.projection().universe().contains(col) {
            return Err(ProjectionError::UnknownColumn(col.clone()).into());
        }
        if session.projection().contains(col) {
            session.toggle_column(col)?;
        }
    }
    for m in &args.moves {
        session.reorder_column(m.from, m.to)?;
    }

    match args.command {
        Command::Show => print!("{}", table::render(session.view())),
        Command::Columns => print!("{}", shell::columns(&session)),
        Command::Export { .. } => {
            let path = session.export(&exporter)?;
            println!("{}", path.display());
        }
        Command::Shell => {
            let stdin = io::stdin();
            shell::run(
                &mut session,
                &*fetcher,
                &exporter,
                stdin.lock(),
                io::stdout(),
            )?;
        }
    }
    Ok(())
}

// Joins an error with its sources, outermost first.
fn chain(e: &dyn Error) -> String {
    let mut msg = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        msg.push_str(": ");
        msg.push_str(&inner.to_string());
        source = inner.source();
    }
    msg
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_column_filter() {
        let f = ColumnFilter::from_str("owner=Alice Smith").unwrap();
        assert_eq!(f.column, "owner");
        assert_eq!(f.text, "Alice Smith");
        let f = ColumnFilter::from_str("owner=").unwrap();
        assert_eq!(f.text, "");
        assert!(ColumnFilter::from_str("owner").is_err());
    }

    #[test]
    fn parse_column_move() {
        let m = ColumnMove::from_str("3:0").unwrap();
        assert_eq!((m.from, m.to), (3, 0));
        assert!(ColumnMove::from_str("3").is_err());
        assert!(ColumnMove::from_str("a:1").is_err());
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from([
            "idpconn",
            "-f",
            "name=portal",
            "--hide",
            "clientID",
            "--env",
            "prod",
            "-t",
            "oauth",
            "export",
            "--out",
            "exports",
        ])
        .unwrap();
        assert_eq!(args.env, Some(Environment::Prod));
        assert_eq!(args.connection_type, Some(ConnectionType::Oauth));
        assert_eq!(args.filters.len(), 1);
        assert_eq!(args.hidden, vec!["clientID"]);
        assert!(matches!(args.command, Command::Export { out: Some(_) }));
    }
}
