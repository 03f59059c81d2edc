use std::error;
use std::fs;
use std::io::{self, Read};
use std::process;
use std::result;

use clap::{App, AppSettings, Arg, ArgMatches};
use log::{info, LevelFilter};
use program::perror;

use klox::{parse, run, KloxError, Value, DESCRIPTION, NAME, VERSION};

type Error = Box<dyn error::Error>;
type Result<T> = result::Result<T, Error>;

const STDIN: &str = "-";

struct Config {
    file: Option<String>,
    entry: String,
    args: Vec<Value>,
    log_level: LevelFilter,
}

impl Config {
    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let args = matches
            .values_of("args")
            .into_iter()
            .flatten()
            .map(|arg| {
                arg.parse::<i64>()
                    .map(Value)
                    .map_err(|e| format!("invalid argument '{}': {}", arg, e))
            })
            .collect::<result::Result<Vec<_>, _>>()?;

        let log_level = match matches.occurrences_of("verbose") {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        Ok(Config {
            file: matches
                .value_of("file")
                .filter(|&file| file != STDIN)
                .map(str::to_owned),
            entry: matches.value_of("entry").unwrap_or("main").to_owned(),
            args,
            log_level,
        })
    }
}

fn parse_args<'a>() -> ArgMatches<'a> {
    App::new(NAME)
        .version(VERSION)
        .about(DESCRIPTION)
        .setting(AppSettings::AllowNegativeNumbers)
        .arg(
            Arg::with_name("entry")
                .short("e")
                .long("entry")
                .value_name("name")
                .help("the function to call (default: main)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("log more; repeat for more detail (RUST_LOG overrides)"),
        )
        .arg(
            Arg::with_name("file")
                .index(1)
                .help("the source file; '-' or nothing reads stdin"),
        )
        .arg(
            Arg::with_name("args")
                .index(2)
                .multiple(true)
                .help("integer arguments for the entry function"),
        )
        .get_matches()
}

fn read_source(file: Option<&str>) -> Result<String> {
    match file {
        Some(path) => Ok(fs::read_to_string(path)
            .map_err(|e| format!("could not read '{}': {}", path, e))?),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn run_config(config: &Config) -> Result<Value> {
    let source = read_source(config.file.as_deref())?;
    let program = parse(&source).map_err(KloxError::from)?;

    info!("running {} with {} argument(s)", config.entry, config.args.len());
    let value = run(&program, &config.entry, &config.args).map_err(KloxError::from)?;

    Ok(value)
}

fn main() {
    let matches = parse_args();
    let config = match Config::from_matches(&matches) {
        Ok(config) => config,
        Err(e) => {
            perror(e);
            process::exit(1);
        }
    };

    env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .init();

    match run_config(&config) {
        Ok(value) => println!("{}", value),
        Err(e) => {
            perror(e);
            process::exit(1);
        }
    }
}
