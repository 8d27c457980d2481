// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::command::Command;
use crate::commands::{NAME, OVERWRITE, PARAMETERS, PUT_PARAMETER, SUCCESS_STATUS_CODE, VALUE};
use crate::errors::{Error, Result};
use crate::parameters::{FileParameterStore, ParameterStore};
use crate::utils::reader::Reader;
use crate::utils::writer::Writer;
use clap::{Arg, ArgAction, ArgMatches};
use std::io::Write;

/// Records an image tag in a parameter file, the local stand-in for the
/// `aws ssm put-parameter` call the image builds make.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct PutParameter {}

#[allow(clippy::new_without_default)]
impl PutParameter {
    pub fn new() -> Self {
        PutParameter {}
    }
}

impl Command for PutParameter {
    fn name(&self) -> &'static str {
        PUT_PARAMETER
    }

    fn command(&self) -> clap::Command {
        clap::Command::new(PUT_PARAMETER)
            .about("Writes a parameter into a JSON or YAML parameter file that synth can read with --parameters. The file keeps the format its extension names.")
            .arg(
                Arg::new(PARAMETERS.0)
                    .long(PARAMETERS.0)
                    .short(PARAMETERS.1)
                    .action(ArgAction::Set)
                    .required(true)
                    .help("Parameter file to update; created when missing"),
            )
            .arg(
                Arg::new(NAME.0)
                    .long(NAME.0)
                    .short(NAME.1)
                    .action(ArgAction::Set)
                    .required(true)
                    .help("Parameter name, e.g. X86BuildLambdaImageId"),
            )
            .arg(
                Arg::new(VALUE.0)
                    .long(VALUE.0)
                    .short(VALUE.1)
                    .action(ArgAction::Set)
                    .required(true)
                    .help("Parameter value, usually the image tag"),
            )
            .arg(
                Arg::new(OVERWRITE)
                    .long(OVERWRITE)
                    .action(ArgAction::SetTrue)
                    .help("Replace an existing value"),
            )
            .arg_required_else_help(true)
    }

    fn execute(&self, args: &ArgMatches, writer: &mut Writer, _: &mut Reader) -> Result<i32> {
        let (file, name, value) = match (
            args.get_one::<String>(PARAMETERS.0),
            args.get_one::<String>(NAME.0),
            args.get_one::<String>(VALUE.0),
        ) {
            (Some(file), Some(name), Some(value)) => (file, name, value),
            _ => {
                return Err(Error::IllegalArguments(String::from(
                    "parameters file, name and value are all required",
                )))
            }
        };
        if value.trim().is_empty() {
            return Err(Error::IllegalArguments(format!(
                "refusing to record an empty value for `{name}`"
            )));
        }

        let mut store = FileParameterStore::new(file);
        store.put(name, value, args.get_flag(OVERWRITE))?;
        writeln!(writer, "{name} = {value}")?;
        Ok(SUCCESS_STATUS_CODE)
    }
}
