use std::{fmt::Write, path::PathBuf, process::ExitCode};

use clap::{CommandFactory, Parser as ClapParser, error::ErrorKind};
use colored::Colorize;
use log::{error, info};
use rillc::{LoweringOptions, emit_module, lower_crate, pretty_print_module};

mod samples;

/// Lowers the bundled sample programs to textual LIR
#[derive(Debug, ClapParser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Samples to lower, all of them when none are given
    samples: Vec<String>,

    /// List the bundled samples and exit
    #[arg(long)]
    list: bool,

    /// Write plain IR to this file instead of printing it
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, default_value = "main")]
    entry_point: String,

    /// Name of the integer print builtin
    #[arg(long, default_value = "printi")]
    print_int: String,

    /// Name of the string print builtin
    #[arg(long, default_value = "prints")]
    print_str: String,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    if args.list {
        for sample in samples::SAMPLES {
            println!("{:<12} {}", sample.name.blue(), sample.description);
        }

        return ExitCode::SUCCESS;
    }

    let selected = if args.samples.is_empty() {
        samples::SAMPLES.iter().collect::<Vec<_>>()
    } else {
        args.samples
            .iter()
            .map(|name| {
                samples::find(name).unwrap_or_else(|| {
                    Args::command()
                        .error(
                            ErrorKind::InvalidValue,
                            format!("Unknown sample '{name}'! Use --list to see them all."),
                        )
                        .exit()
                })
            })
            .collect()
    };

    let options = LoweringOptions {
        entry_point: args.entry_point,
        print_int: args.print_int,
        print_str: args.print_str,
        ..Default::default()
    };

    let mut plain = String::new();
    let mut failed = false;

    for sample in selected {
        info!("lowering sample `{}`", sample.name);

        let krate = (sample.build)(&options);

        let module = match lower_crate(&krate, &options) {
            Ok(module) => module,
            Err(e) => {
                error!("failed to lower `{}`: {e}", sample.name);
                failed = true;
                continue;
            }
        };

        if args.output.is_some() {
            // writing into a `String` cannot fail
            let _ = writeln!(plain, "; sample: {}", sample.name);
            plain.push_str(&emit_module(&module));
        } else {
            println!("{}", format!("; sample: {}", sample.name).bright_black());
            pretty_print_module(&module);
        }
    }

    if let Some(path) = &args.output
        && let Err(e) = std::fs::write(path, plain)
    {
        Args::command()
            .error(
                ErrorKind::Io,
                format!("Failed to write '{}': {e}", path.display()),
            )
            .exit()
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
