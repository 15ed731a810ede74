//! CLI entry point for the socmap binary.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use serde as _;
use serde_json as _;
use soc_alloc as _;
use socmap::{Plan, PlanError, SocDescription};
#[cfg(test)]
use tempfile as _;
use thiserror as _;

const USAGE_TEXT: &str = "\
Usage: socmap <command> [options]

Commands:
  plan  <input> [-o <output>] [--verbose]  Allocate the layout and print it
  check <input>                            Allocate the layout and print a summary

Options:
  -o, --output <file>  Write the layout export as JSON (plan only)
  -v, --verbose        Print allocation events to stderr (plan only)
  -h, --help           Show this help message

Examples:
  socmap plan soc.json
  socmap plan soc.json -o csr.json
  socmap check soc.json
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Plan(PlanArgs),
    Check(CheckArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct PlanArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    verbose: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct CheckArgs {
    input: PathBuf,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

/// Flags recognised after the command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Output,
    Verbose,
    Help,
}

impl Flag {
    fn parse(arg: &str) -> Option<Self> {
        match arg {
            "-o" | "--output" => Some(Self::Output),
            "-v" | "--verbose" => Some(Self::Verbose),
            "-h" | "--help" => Some(Self::Help),
            _ => None,
        }
    }

    const fn long(self) -> &'static str {
        match self {
            Self::Output => "--output",
            Self::Verbose => "--verbose",
            Self::Help => "--help",
        }
    }
}

/// Everything given after the command name, before the command checks which
/// flags it takes.
#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    flags: Vec<Flag>,
}

impl Options {
    fn parse(args: impl IntoIterator<Item = OsString>) -> Result<Self, String> {
        let mut options = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let text = arg.to_string_lossy().into_owned();
            match Flag::parse(&text) {
                Some(Flag::Output) => {
                    let value = args
                        .next()
                        .ok_or_else(|| format!("missing value for {text}"))?;
                    options.output = Some(PathBuf::from(value));
                    options.flags.push(Flag::Output);
                }
                Some(flag) => options.flags.push(flag),
                None if text.starts_with('-') => return Err(format!("unknown option: {text}")),
                None if options.input.is_some() => {
                    return Err("multiple input paths provided".to_string());
                }
                None => options.input = Some(PathBuf::from(arg)),
            }
        }

        Ok(options)
    }

    fn has(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    /// Fails on the first flag outside `allowed`.
    fn only(&self, command: &str, allowed: &[Flag]) -> Result<(), String> {
        self.flags
            .iter()
            .find(|flag| !allowed.contains(flag))
            .map_or(Ok(()), |flag| {
                Err(format!("{command} does not take {}", flag.long()))
            })
    }

    fn into_input(self) -> Result<PathBuf, String> {
        self.input.ok_or_else(|| "missing input path".to_string())
    }
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;
    let command = first.to_string_lossy().into_owned();
    if Flag::parse(&command) == Some(Flag::Help) {
        return Ok(ParseResult::Help);
    }
    if command != "plan" && command != "check" {
        return Err(format!("unknown command: {command}"));
    }

    let options = Options::parse(args)?;
    if options.has(Flag::Help) {
        return Ok(ParseResult::Help);
    }

    let parsed = if command == "plan" {
        Command::Plan(PlanArgs {
            verbose: options.has(Flag::Verbose),
            output: options.output.clone(),
            input: options.into_input()?,
        })
    } else {
        options.only(&command, &[])?;
        Command::Check(CheckArgs {
            input: options.into_input()?,
        })
    };
    Ok(ParseResult::Command(parsed))
}

fn load_plan(input: &std::path::Path) -> Result<Plan, PlanError> {
    let description = SocDescription::load(input)?;
    Ok(Plan::build(&description)?)
}

fn run_plan(args: &PlanArgs) -> Result<(), PlanError> {
    let plan = load_plan(&args.input)?;

    if args.verbose {
        for event in plan.events() {
            eprintln!("{event}");
        }
    }

    println!("{plan}");

    if let Some(output) = &args.output {
        plan.export().write(output)?;
        println!("Layout written to {}", output.display());
    }

    Ok(())
}

fn run_check(args: &CheckArgs) -> Result<(), PlanError> {
    let plan = load_plan(&args.input)?;
    println!("{}: ok ({})", args.input.display(), plan.summary());
    Ok(())
}

fn report(result: Result<(), PlanError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Plan(args))) => report(run_plan(&args)),
        Ok(ParseResult::Command(Command::Check(args))) => report(run_check(&args)),
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}
