// fst-apply: Apply a transducer to words from the command line or stdin.
//
// Loads an automaton, freezes it into the compact form and prints every
// output for each input word. With -p, prints every accepted input
// starting with the word instead.
//
// Usage:
//   fst-apply [-f FORMAT] [-i] [-p] [-m N] [-v] FILE [WORD...]
//
// Options:
//   -f, --from FORMAT      att, native or hfst (default: from the extension)
//       --producer NAME    Symbol convention: hfst, hfst-att, sfst, native
//   -i, --inverse          Swap input and output while loading
//   -p, --prefix           Prefix search instead of apply
//   -m, --max-suffix N     Suffix bound for prefix search (default 100)
//   -v, --verbose          Debug logging
//   -h, --help             Print help

use std::io::{self, BufRead, Write};

use lexfst::{Applied, ApplyConfig, CompactTransducer, Transducer};
use lexfst_cli::Format;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if lexfst_cli::wants_help(&args) {
        println!("fst-apply: Apply a finite-state transducer to words.");
        println!();
        println!("Usage: fst-apply [-f FORMAT] [-i] [-p] [-m N] [-v] FILE [WORD...]");
        println!();
        println!("If WORD arguments are given, applies the transducer to each word.");
        println!("Otherwise reads words from stdin (one per line).");
        println!();
        println!("Options:");
        println!("  -f, --from FORMAT      att, native or hfst (default: from the extension)");
        println!("      --producer NAME    Symbol convention: hfst, hfst-att, sfst, native");
        println!("  -i, --inverse          Swap input and output while loading");
        println!("  -p, --prefix           Prefix search instead of apply");
        println!("  -m, --max-suffix N     Suffix bound for prefix search (default 100)");
        println!("  -v, --verbose          Debug logging");
        println!("  -h, --help             Print this help");
        return;
    }

    let opts = lexfst_cli::parse_options(&args).unwrap_or_else(|e| lexfst_cli::fatal(&e));
    lexfst_cli::init_logging(opts.verbose);

    let Some((path, words)) = opts.positional.split_first() else {
        lexfst_cli::fatal("missing transducer file (see --help)");
    };
    let format = opts.from.unwrap_or_else(|| Format::from_path(path));
    let producer = opts.producer.unwrap_or(format.default_producer());
    let fst: CompactTransducer = lexfst_cli::load(path, format, producer, opts.inverse)
        .unwrap_or_else(|e| lexfst_cli::fatal(&e))
        .make_compact();
    log::debug!(
        "loaded {path}: {} states, {} transitions",
        fst.state_count(),
        fst.transition_count()
    );

    let mut config = ApplyConfig::default();
    if let Some(n) = opts.max_suffix {
        config = config.with_max_suffix(n);
    }

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    let run = |word: &str, out: &mut io::BufWriter<io::StdoutLock<'_>>| {
        let result = if opts.prefix {
            fst.prefix_search_with(word, &config)
        } else {
            fst.apply_with(word, &config)
        };
        print_result(word, &result, out);
    };

    if words.is_empty() {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("error reading stdin: {e}");
                    break;
                }
            };
            let word = line.trim_end_matches(['\r', '\n']);
            if word.is_empty() {
                continue;
            }
            run(word, &mut out);
        }
    } else {
        for word in words {
            run(word.as_str(), &mut out);
        }
    }
    let _ = out.flush();
}

fn print_result(word: &str, result: &Applied, out: &mut impl Write) {
    if result.is_empty() {
        let _ = writeln!(out, "{word}\t+?");
    }
    for output in result.iter() {
        let _ = writeln!(out, "{word}\t{output}");
    }
    if result.truncated {
        let _ = writeln!(out, "{word}\t(incomplete)");
    }
    let _ = writeln!(out);
}
