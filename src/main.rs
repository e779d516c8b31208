mod debug_report;

use icosearch::backend::SearchResponse;
use icosearch::relation::{self, CoinRef, Token};
use icosearch::{EngineConfig, MAX_INSPECT_COINS, QueryEngine, ResultRecord, SortDirection, inspect_relation};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_GROUP: &str = "category";

fn main() {
    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };
    init_logging(cli.verbosity);

    if let Err(err) = run(&cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbosity: u8) {
    let fallback = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}

fn run(cli: &CliConfig) -> Result<(), String> {
    let mut config = match &cli.config_path {
        Some(path) => EngineConfig::load(path).map_err(|e| e.to_string())?,
        None => EngineConfig::default(),
    };
    if let Some(size) = cli.page_size {
        config.page_size = size;
    }
    let mut engine = QueryEngine::new(config).map_err(|e| e.to_string())?;

    if let Some(text) = &cli.relation {
        let coins = cli.coins.unwrap_or_else(|| highest_label(text).min(MAX_INSPECT_COINS));
        debug!(coins, "inspecting relation");
        let report = inspect_relation(text, coins).map_err(|e| e.to_string())?;
        debug_report::print_relation(&report, cli.color);
    }

    let Some(path) = &cli.results_path else { return Ok(()) };
    let text = std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let response = parse_results(&text)?;
    if !engine.apply_search_response(response) {
        return Err(format!("{} does not contain a successful search response", path.display()));
    }
    info!(records = engine.results().len(), "results loaded");

    if let Some((field, direction)) = &cli.sort {
        engine.results_mut().sort(field, *direction);
    }
    if let Some(page) = cli.page {
        if !engine.results_mut().set_page(page) {
            return Err(format!("page {page} is out of range (1..={})", engine.results().total_pages()));
        }
    }
    debug_report::print_results(engine.results(), &cli.group, cli.color);
    Ok(())
}

/// Accepts a bare record array or a full `searchCoin` response.
fn parse_results(text: &str) -> Result<SearchResponse, String> {
    if text.trim_start().starts_with('[') {
        let records: Vec<ResultRecord> = serde_json::from_str(text).map_err(|e| format!("invalid results: {e}"))?;
        return Ok(SearchResponse::ok(records));
    }
    SearchResponse::from_json(text).map_err(|e| format!("invalid results: {e}"))
}

fn highest_label(text: &str) -> usize {
    relation::tokenize(text)
        .iter()
        .filter_map(|l| match l.token {
            Token::CoinRef(CoinRef::Unbound(n)) => Some(n),
            _ => None,
        })
        .max()
        .unwrap_or(0)
}

struct CliConfig {
    relation: Option<String>,
    coins: Option<usize>,
    results_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    sort: Option<(String, SortDirection)>,
    group: String,
    page: Option<usize>,
    page_size: Option<usize>,
    color: bool,
    verbosity: u8,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut relation: Option<String> = None;
    let mut coins = None;
    let mut results_path = None;
    let mut config_path = None;
    let mut sort = None;
    let mut group = DEFAULT_GROUP.to_string();
    let mut page = None;
    let mut page_size = None;
    let mut color = io::stdout().is_terminal();
    let mut verbosity = 0u8;
    let mut args = std::env::args().skip(1).peekable();

    fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
        args.next().ok_or_else(|| format!("error: {flag} expects a value"))
    }

    fn number(raw: &str, flag: &str) -> Result<usize, String> {
        raw.parse().map_err(|_| format!("error: {flag} expects a number, got '{raw}'"))
    }

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("icosearch {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "-v" | "--verbose" => verbosity = verbosity.saturating_add(1),
            "-c" | "--coins" => coins = Some(coin_count(&value(&mut args, "--coins")?)?),
            "-r" | "--results" => results_path = Some(PathBuf::from(value(&mut args, "--results")?)),
            "--config" => config_path = Some(PathBuf::from(value(&mut args, "--config")?)),
            "--sort" => sort = Some(parse_sort(&value(&mut args, "--sort")?)?),
            "--group" => group = value(&mut args, "--group")?,
            "--page" => page = Some(number(&value(&mut args, "--page")?, "--page")?),
            "--page-size" => page_size = Some(number(&value(&mut args, "--page-size")?, "--page-size")?),
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if relation.is_some() {
                        return Err("error: relation provided multiple times".to_string());
                    }
                    relation = Some(rest);
                }
                break;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if relation.is_some() {
                    return Err("error: relation provided multiple times".to_string());
                }
                relation = Some(rest);
                break;
            }
        }
    }

    if relation.is_none() && results_path.is_none() {
        let input = read_stdin_input()?;
        if input.trim().is_empty() {
            return Err(format!("error: no input provided\n\n{}", help_text()));
        }
        relation = Some(input.trim_end().to_string());
    }

    Ok(CliConfig { relation, coins, results_path, config_path, sort, group, page, page_size, color, verbosity })
}

fn coin_count(raw: &str) -> Result<usize, String> {
    let n: usize = raw.parse().map_err(|_| format!("error: --coins expects a number, got '{raw}'"))?;
    if n > MAX_INSPECT_COINS {
        return Err(format!("error: --coins must be at most {MAX_INSPECT_COINS}, got {n}"));
    }
    Ok(n)
}

/// `field` or `field:asc` / `field:desc`.
fn parse_sort(raw: &str) -> Result<(String, SortDirection), String> {
    let (field, direction) = match raw.split_once(':') {
        Some((field, dir)) => (field, dir.parse::<SortDirection>().map_err(|e| format!("error: {e}"))?),
        None => (raw, SortDirection::Ascending),
    };
    if field.is_empty() {
        return Err("error: --sort expects a field name".to_string());
    }
    Ok((field.to_string(), direction))
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "icosearch {version}

Inspect coin relation expressions and page through search results.

Usage:
  icosearch [OPTIONS] [--] <relation...>
  icosearch [OPTIONS] --results <file.json>

Options:
  -c, --coins <n>            Number of queried coins the relation refers to (at most {max_coins}).
                             Default: the highest label in the relation, capped.
  -r, --results <file>       JSON search results (record array or searchCoin response).
  --sort <field[:dir]>       Sort results by field; dir is asc or desc.
  --group <field>            Group each page by field. Default: {default_group}
  --page <n>                 Show page n (1-based).
  --page-size <n>            Records per page. Overrides the config file.
  --config <file>            Engine configuration (JSON).
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -v, --verbose              More log output on stderr (repeatable). RUST_LOG wins.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Exit codes:
  0  Success.
  1  Runtime error (unreadable file, bad config, page out of range).
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        default_group = DEFAULT_GROUP,
        max_coins = MAX_INSPECT_COINS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_argument_forms() {
        assert_eq!(parse_sort("weight").unwrap(), ("weight".to_string(), SortDirection::Ascending));
        assert_eq!(parse_sort("date:desc").unwrap(), ("date".to_string(), SortDirection::Descending));
        assert!(parse_sort("date:sideways").is_err());
        assert!(parse_sort(":asc").is_err());
    }

    #[test]
    fn coin_count_is_bounded() {
        assert_eq!(coin_count("3").unwrap(), 3);
        assert!(coin_count(&(MAX_INSPECT_COINS + 1).to_string()).is_err());
        assert!(coin_count("4000000000000").is_err());
        assert!(coin_count("many").is_err());
    }

    #[test]
    fn highest_label_defaults_coin_count() {
        assert_eq!(highest_label("C2 OR (C7 AND NOT C3)"), 7);
        assert_eq!(highest_label("AND"), 0);
    }

    #[test]
    fn results_accept_array_or_envelope() {
        let bare = parse_results(r#"[{"id": "a"}]"#).unwrap();
        assert!(bare.success);
        let wrapped = parse_results(r#"{"success": true, "result": [], "length": 0}"#).unwrap();
        assert_eq!(wrapped.length, Some(0));
        assert!(parse_results("nope").is_err());
    }
}
