use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use jqpath::error::JqError;
use jqpath::output::{self, Indent, OutputOptions};
use jqpath::query::{self, eval::is_truthy, Expr};
use jqpath::stream::{self, Input};

const EXIT_FALSY: u8 = 1;
const EXIT_FATAL: u8 = 2;
const EXIT_NO_OUTPUT: u8 = 4;
const EXIT_EVAL_ERROR: u8 = 5;

#[derive(Parser)]
#[command(name = "jqpath", version, about = "A jq-compatible JSON query tool")]
struct Cli {
    /// Filter expression (default: "." returns each document unchanged)
    #[arg(default_value = ".")]
    filter: String,

    /// Input file(s) (reads from stdin if omitted)
    files: Vec<PathBuf>,

    /// Print top-level strings without quotes
    #[arg(short = 'r', long = "raw-output")]
    raw_output: bool,

    /// Like -r, and no newline after each output
    #[arg(short = 'j', long = "join-output")]
    join_output: bool,

    /// Compact output (no pretty printing)
    #[arg(short = 'c', long = "compact-output")]
    compact_output: bool,

    /// Use null as the single input instead of reading stdin/files
    #[arg(short = 'n', long = "null-input")]
    null_input: bool,

    /// Read every document of every input into one array
    #[arg(short = 's', long)]
    slurp: bool,

    /// Set the exit status from the last output (1 if null/false, 4 if none)
    #[arg(short = 'e', long = "exit-status")]
    exit_status: bool,

    /// Indent with a tab
    #[arg(long, conflicts_with = "indent")]
    tab: bool,

    /// Indent with N spaces (0 to 7)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(0..=7))]
    indent: Option<u8>,

    /// Colorize output
    #[arg(short = 'C', long = "color-output")]
    color_output: bool,

    /// Disable colorized output
    #[arg(short = 'M', long = "monochrome-output")]
    monochrome_output: bool,

    /// Stop at the first evaluation error
    #[arg(long)]
    halt_on_error: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("jqpath: error: {err:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let expr = query::parse(&cli.filter)?;
    let opts = output_options(cli);
    let stdout = io::stdout();
    let mut printer = Printer {
        expr: &expr,
        opts: &opts,
        out: stdout.lock(),
        halt_on_error: cli.halt_on_error,
        last_truthy: None,
        failed: false,
    };

    if cli.null_input {
        printer.process(Value::Null, "<null>")?;
        return printer.finish(cli.exit_status);
    }

    let inputs = read_inputs(&cli.files)?;

    if cli.slurp {
        let all = stream::slurp(&inputs)?;
        printer.process(all, "<slurp>")?;
        return printer.finish(cli.exit_status);
    }

    let mut count = 0usize;
    'inputs: for input in &inputs {
        for (i, doc) in input.documents().enumerate() {
            let origin = format!("{}:{}", input.name, i + 1);
            let doc = match doc {
                Ok(doc) => doc,
                Err(err) => {
                    printer.out.flush()?;
                    eprintln!("jqpath: error (at {origin}): {err}");
                    return Ok(ExitCode::from(EXIT_FATAL));
                }
            };
            count += 1;
            if printer.process(doc, &origin)? == Flow::Halt {
                break 'inputs;
            }
        }
    }
    log::debug!("processed {count} document(s) from {} input(s)", inputs.len());

    printer.finish(cli.exit_status)
}

fn read_inputs(files: &[PathBuf]) -> Result<Vec<Input>> {
    if files.is_empty() {
        let input = Input::from_reader("<stdin>", io::stdin().lock()).context("reading stdin")?;
        return Ok(vec![input]);
    }
    files
        .iter()
        .map(|path| Input::from_path(path).with_context(|| format!("reading {}", path.display())))
        .collect()
}

fn output_options(cli: &Cli) -> OutputOptions {
    let indent = match (cli.tab, cli.indent) {
        (true, _) => Indent::Tab,
        (false, Some(n)) => Indent::Spaces(n),
        (false, None) => Indent::default(),
    };
    OutputOptions {
        compact: cli.compact_output,
        raw: cli.raw_output || cli.join_output,
        join: cli.join_output,
        indent,
        color: should_colorize(cli),
    }
}

fn should_colorize(cli: &Cli) -> bool {
    if cli.monochrome_output {
        return false;
    }
    if cli.color_output {
        return true;
    }
    std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal()
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Halt,
}

/// Evaluates the filter per document and writes outputs as they are pulled.
struct Printer<'a, W: Write> {
    expr: &'a Expr,
    opts: &'a OutputOptions,
    out: W,
    halt_on_error: bool,
    last_truthy: Option<bool>,
    failed: bool,
}

impl<W: Write> Printer<'_, W> {
    fn process(&mut self, input: Value, origin: &str) -> Result<Flow> {
        if let Some(literal) = self.expr.as_literal() {
            log::debug!("constant filter, skipping traversal of {origin}");
            self.emit(literal)?;
            return Ok(Flow::Continue);
        }

        for item in query::eval::eval(self.expr, input) {
            match item {
                Ok(value) => self.emit(&value)?,
                Err(err) => return self.report(err, origin),
            }
        }
        Ok(Flow::Continue)
    }

    fn emit(&mut self, value: &Value) -> Result<()> {
        let rendered = output::pretty::format_value(value, self.opts)?;
        self.out.write_all(rendered.as_bytes())?;
        if !self.opts.join {
            self.out.write_all(b"\n")?;
        }
        self.last_truthy = Some(is_truthy(value));
        Ok(())
    }

    fn report(&mut self, err: JqError, origin: &str) -> Result<Flow> {
        // keep diagnostics ordered after the outputs that preceded them
        self.out.flush()?;
        eprintln!("jqpath: error (at {origin}): {err}");
        self.failed = true;
        Ok(if self.halt_on_error {
            Flow::Halt
        } else {
            Flow::Continue
        })
    }

    fn finish(mut self, exit_status: bool) -> Result<ExitCode> {
        self.out.flush()?;
        let code = if self.failed {
            EXIT_EVAL_ERROR
        } else if exit_status {
            match self.last_truthy {
                None => EXIT_NO_OUTPUT,
                Some(false) => EXIT_FALSY,
                Some(true) => 0,
            }
        } else {
            0
        };
        Ok(ExitCode::from(code))
    }
}
