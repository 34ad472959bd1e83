// lexfst-cli: shared utilities for the command-line tools.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use lexfst::{FstError, MutableTransducer, StateIterator};
use lexfst_io::{Producer, att, binary, read_binary};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

/// On-disk automaton formats the tools understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Att,
    Native,
    /// HFST binary, read only.
    Hfst,
}

impl Format {
    pub fn from_name(name: &str) -> Result<Self, String> {
        match name.to_ascii_lowercase().as_str() {
            "att" | "txt" => Ok(Format::Att),
            "native" | "bin" => Ok(Format::Native),
            "hfst" => Ok(Format::Hfst),
            other => Err(format!("unknown format '{other}' (expected att, native or hfst)")),
        }
    }

    /// Guess from the file extension; anything unrecognised is native.
    pub fn from_path(path: &str) -> Self {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Format::from_name(ext).unwrap_or(Format::Native)
    }

    /// The symbol convention files of this format use unless overridden.
    pub fn default_producer(self) -> Producer {
        match self {
            Format::Att => Producer::HfstAtt,
            Format::Native => Producer::Native,
            Format::Hfst => Producer::HfstInternal,
        }
    }
}

/// Options shared by the tools. Each tool ignores what it has no use for.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// `-f FORMAT`: input format.
    pub from: Option<Format>,
    /// `-t FORMAT`: output format.
    pub to: Option<Format>,
    /// `--producer NAME`: symbol convention, overriding the format default.
    pub producer: Option<Producer>,
    /// `-i`: swap input and output while reading.
    pub inverse: bool,
    /// `-p`: prefix search instead of apply.
    pub prefix: bool,
    /// `-m N`: suffix bound for prefix search.
    pub max_suffix: Option<usize>,
    /// `--minimize`
    pub minimize: bool,
    /// `-v`: debug logging.
    pub verbose: bool,
    pub positional: Vec<String>,
}

/// Parse the flags every tool shares. `--` ends option parsing.
pub fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut opts = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-f" | "--from" => opts.from = Some(Format::from_name(&value(&mut iter, arg)?)?),
            "-t" | "--to" => opts.to = Some(Format::from_name(&value(&mut iter, arg)?)?),
            "--producer" => {
                let name = value(&mut iter, arg)?;
                opts.producer = Some(name.parse().map_err(|e: FstError| e.to_string())?);
            }
            "-m" | "--max-suffix" => {
                let n = value(&mut iter, arg)?;
                opts.max_suffix = Some(
                    n.parse()
                        .map_err(|_| format!("-m expects a number, got '{n}'"))?,
                );
            }
            "-i" | "--inverse" => opts.inverse = true,
            "-p" | "--prefix" => opts.prefix = true,
            "--minimize" => opts.minimize = true,
            "-v" | "--verbose" => opts.verbose = true,
            "--" => {
                opts.positional.extend(iter.by_ref().cloned());
                break;
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("unknown option {flag}"));
            }
            _ => opts.positional.push(arg.clone()),
        }
    }
    Ok(opts)
}

fn value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<String, String> {
    iter.next()
        .cloned()
        .ok_or_else(|| format!("{flag} requires a value"))
}

/// Install the terminal logger: warnings by default, debug with `-v`.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto);
}

/// Load an automaton from `path`.
pub fn load(
    path: &str,
    format: Format,
    producer: Producer,
    inverse: bool,
) -> Result<MutableTransducer, String> {
    let context = |e: FstError| format!("failed to read {path}: {e}");
    match format {
        Format::Att => {
            let text = fs::read_to_string(path).map_err(|e| context(e.into()))?;
            att::read(&text, producer, inverse).map_err(context)
        }
        Format::Native | Format::Hfst => {
            let bytes = fs::read(path).map_err(|e| context(e.into()))?;
            let producer = if format == Format::Native {
                Producer::Native
            } else {
                producer
            };
            read_binary(&bytes, producer, inverse).map_err(context)
        }
    }
}

/// Write `states` to `path` (or stdout for `-`).
pub fn save<S: StateIterator + ?Sized>(
    path: &str,
    states: &mut S,
    format: Format,
    producer: Producer,
) -> Result<(), String> {
    if format == Format::Hfst {
        return Err("writing HFST files is not supported".to_string());
    }
    let context = |e: FstError| format!("failed to write {path}: {e}");
    let mut out: Box<dyn Write> = if path == "-" {
        Box::new(io::BufWriter::new(io::stdout().lock()))
    } else {
        let file = fs::File::create(path).map_err(|e| context(e.into()))?;
        Box::new(io::BufWriter::new(file))
    };
    match format {
        Format::Att => att::write(&mut out, states, producer).map_err(context)?,
        Format::Native => binary::write(&mut out, states).map_err(context)?,
        Format::Hfst => unreachable!("HFST output rejected above"),
    }
    out.flush().map_err(|e| context(e.into()))
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Check if `--help` or `-h` is in the args.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}
