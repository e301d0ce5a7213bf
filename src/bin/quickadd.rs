use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use quickadd::cli;
use quickadd::config::Config;
use quickadd::context::{AppContext, StandardContext};
use quickadd::model::ParseResult;
use quickadd::model::parser;
use quickadd::resolver::{self, HttpExtractor};
use std::env;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let mut offline = false;
    let mut pretty = false;
    let mut root: Option<PathBuf> = None;
    let mut words: Vec<String> = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" | "help" => {
                cli::print_help("quickadd");
                return Ok(());
            }
            "--offline" | "-o" => offline = true,
            "--pretty" | "-p" => pretty = true,
            "--root" | "-r" => match args.next() {
                Some(path) => root = Some(PathBuf::from(path)),
                None => {
                    eprintln!("--root requires a path argument");
                    std::process::exit(2);
                }
            },
            flag if flag.starts_with('-') => {
                eprintln!("Unknown option '{}'; see --help", flag);
                std::process::exit(2);
            }
            _ => words.push(arg),
        }
    }

    let text = words.join(" ");
    if text.trim().is_empty() {
        cli::print_help("quickadd");
        return Ok(());
    }

    let ctx = StandardContext::new(root);
    init_logging(&ctx);

    let now = Local::now().naive_local();
    let result = if offline {
        parser::parse(&text, now)
    } else {
        try_resolver(&ctx, &text, now)
            .await
            .unwrap_or_else(|| parser::parse(&text, now))
    };

    let output = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{output}");
    Ok(())
}

/// Attempt the extraction service. Every failure path is silent towards
/// the user: it logs at debug level and yields `None`, handing off to the
/// deterministic parser.
async fn try_resolver(
    ctx: &dyn AppContext,
    text: &str,
    now: NaiveDateTime,
) -> Option<ParseResult> {
    let config = Config::load_or_default(ctx);
    if config.resolved_api_key().is_empty() {
        log::debug!("no API key configured; using fallback parser");
        return None;
    }
    let extractor = match HttpExtractor::new(&config) {
        Ok(extractor) => extractor,
        Err(err) => {
            log::debug!("could not construct extractor ({err}); using fallback parser");
            return None;
        }
    };
    match resolver::resolve(&extractor, text, now, None).await {
        Ok(result) => Some(result),
        Err(err) => {
            log::debug!("intent resolver failed ({err}); using fallback parser");
            None
        }
    }
}

/// Best-effort logging bootstrap; parsing must work even when the log
/// file cannot be created.
fn init_logging(ctx: &dyn AppContext) {
    use simplelog::{
        ColorChoice, CombinedLogger, LevelFilter, SharedLogger, TermLogger, TerminalMode,
        WriteLogger,
    };

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(path) = ctx.get_log_file_path()
        && let Ok(file) = std::fs::File::create(&path)
    {
        loggers.push(WriteLogger::new(
            LevelFilter::Debug,
            simplelog::Config::default(),
            file,
        ));
    }
    let _ = CombinedLogger::init(loggers);
}
