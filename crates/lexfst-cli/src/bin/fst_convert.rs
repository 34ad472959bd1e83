// fst-convert: Convert a transducer between file formats.
//
// Reads INPUT, optionally minimizes it, and writes OUTPUT. Use - as
// OUTPUT to write to stdout.
//
// Usage:
//   fst-convert [-f FORMAT] [-t FORMAT] [--minimize] [-v] INPUT OUTPUT
//
// Options:
//   -f, --from FORMAT      Input format: att, native or hfst (default: from the extension)
//   -t, --to FORMAT        Output format: att or native (default: from the extension)
//       --producer NAME    Symbol convention for AT&T input and output
//   -i, --inverse          Swap input and output while loading
//       --minimize         Minimize before writing
//   -v, --verbose          Debug logging
//   -h, --help             Print help

use lexfst_cli::Format;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if lexfst_cli::wants_help(&args) {
        println!("fst-convert: Convert a finite-state transducer between formats.");
        println!();
        println!("Usage: fst-convert [-f FORMAT] [-t FORMAT] [--minimize] [-v] INPUT OUTPUT");
        println!();
        println!("Options:");
        println!("  -f, --from FORMAT      Input format: att, native or hfst (default: from the extension)");
        println!("  -t, --to FORMAT        Output format: att or native (default: from the extension)");
        println!("      --producer NAME    Symbol convention for AT&T input and output");
        println!("  -i, --inverse          Swap input and output while loading");
        println!("      --minimize         Minimize before writing");
        println!("  -v, --verbose          Debug logging");
        println!("  -h, --help             Print this help");
        return;
    }

    let opts = lexfst_cli::parse_options(&args).unwrap_or_else(|e| lexfst_cli::fatal(&e));
    lexfst_cli::init_logging(opts.verbose);

    let [input, output] = opts.positional.as_slice() else {
        lexfst_cli::fatal("expected INPUT and OUTPUT (see --help)");
    };
    let from = opts.from.unwrap_or_else(|| Format::from_path(input));
    let to = opts.to.unwrap_or_else(|| Format::from_path(output));
    if to == Format::Hfst {
        lexfst_cli::fatal("writing HFST files is not supported");
    }

    let mut fst = lexfst_cli::load(
        input,
        from,
        opts.producer.unwrap_or(from.default_producer()),
        opts.inverse,
    )
    .unwrap_or_else(|e| lexfst_cli::fatal(&e));

    if opts.minimize {
        fst.minimize()
            .unwrap_or_else(|e| lexfst_cli::fatal(&format!("minimize failed: {e}")));
    }
    log::info!(
        "{input} -> {output}: {} states, {} transitions",
        fst.state_count(),
        fst.transition_count()
    );

    lexfst_cli::save(
        output,
        &mut fst.states(),
        to,
        opts.producer.unwrap_or(to.default_producer()),
    )
    .unwrap_or_else(|e| lexfst_cli::fatal(&e));
}
