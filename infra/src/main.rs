// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use clap::{Arg, ArgAction};
use lambda_infra::commands::{APP_NAME, APP_VERSION, ERROR_STATUS_CODE, VERBOSE};
use lambda_infra::utils::get_infra_commands;
use lambda_infra::utils::reader::{ReadBuffer, Reader};
use lambda_infra::utils::writer::{WriteBuffer::Stderr, WriteBuffer::Stdout, Writer};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::collections::HashMap;
use std::process::exit;

fn main() {
    let mut app = clap::Command::new(APP_NAME)
        .version(APP_VERSION)
        .about(
            r#"
  Declares the x86_64 and arm64 container-image Lambda functions, the REST API
  and dashboard that compare them, their source and image repositories, and the
  pipeline that rebuilds both images and redeploys on every commit. Synthesizes
  all of it into CloudFormation templates."#,
        )
        .arg(
            Arg::new(VERBOSE)
                .long(VERBOSE)
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log every parameter lookup and stack being synthesized"),
        )
        .arg_required_else_help(true);

    let commands = get_infra_commands();
    let mappings = commands.iter().map(|s| (s.name(), s)).fold(
        HashMap::with_capacity(commands.len()),
        |mut map, entry| {
            map.insert(entry.0, entry.1.as_ref());
            map
        },
    );

    for each in &commands {
        app = app.subcommand(each.command());
    }

    let help = app.render_usage();
    let app = app.get_matches();

    let level = if app.get_flag(VERBOSE) {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("logger could not be initialized: {e}");
    }

    match app.subcommand() {
        Some((name, value)) => {
            if let Some(command) = mappings.get(name) {
                let mut output_writer =
                    Writer::new(Stdout(std::io::stdout()), Stderr(std::io::stderr()));

                match (*command).execute(
                    value,
                    &mut output_writer,
                    &mut Reader::new(ReadBuffer::Stdin(std::io::stdin())),
                ) {
                    Err(e) => {
                        if output_writer
                            .write_err(format!("Error occurred {e}"))
                            .is_err()
                        {
                            eprintln!("Error occurred {e}");
                        }
                        exit(ERROR_STATUS_CODE);
                    }
                    Ok(code) => exit(code),
                }
            } else {
                println!("{}", help);
            }
        }
        None => {
            println!("{}", help);
        }
    }
}
