// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::command::Command;
use crate::commands::{APP_NAME, APP_VERSION, COMPLETIONS, LOCATION, SHELL, SUCCESS_STATUS_CODE};
use crate::errors::{Error, Result};
use crate::utils::get_infra_commands;
use crate::utils::reader::Reader;
use crate::utils::writer::Writer;
use clap::{Arg, ArgAction, ArgMatches, ValueEnum};
use clap_complete::Shell;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Completions {}

#[allow(clippy::new_without_default)]
impl Completions {
    pub fn new() -> Self {
        Completions {}
    }
}

impl Command for Completions {
    fn name(&self) -> &'static str {
        COMPLETIONS
    }

    fn command(&self) -> clap::Command {
        clap::Command::new(COMPLETIONS)
            .about("Generates a shell completions script for lambda-infra.")
            .arg(
                Arg::new(SHELL.0)
                    .long(SHELL.0)
                    .short(SHELL.1)
                    .action(ArgAction::Set)
                    .required(true)
                    .value_parser(clap::builder::EnumValueParser::<Shell>::new())
                    .help("the shell you are currently running"),
            )
            .arg(
                Arg::new(LOCATION.0)
                    .long(LOCATION.0)
                    .short(LOCATION.1)
                    .action(ArgAction::Set)
                    .help("the directory the completions script is written to, if no value is present the script is written to stdout"),
            )
    }

    fn execute(&self, args: &ArgMatches, writer: &mut Writer, _: &mut Reader) -> Result<i32> {
        let shell = match args.get_one::<Shell>(SHELL.0) {
            Some(shell) => *shell,
            None => {
                let known = Shell::value_variants()
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>();
                return Err(Error::IllegalArguments(format!(
                    "a shell is required, one of {}",
                    known.join(", ")
                )));
            }
        };

        let mut app = clap::Command::new(APP_NAME).version(APP_VERSION);
        for each in get_infra_commands() {
            app = app.subcommand(each.command());
        }

        match args.get_one::<String>(LOCATION.0) {
            Some(location) => {
                let path = Path::new(location);
                if !path.is_dir() {
                    return Err(Error::InvalidCompletionsPath(location.clone()));
                }
                let mut file = File::create(path.join(format!("{APP_NAME}.{shell}")))?;
                clap_complete::generate(shell, &mut app, APP_NAME, &mut file);
            }
            None => clap_complete::generate(shell, &mut app, APP_NAME, writer),
        }

        Ok(SUCCESS_STATUS_CODE)
    }
}
