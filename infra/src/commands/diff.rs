// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::command::Command;
use crate::commands::synth::{parameter_args, parameter_source};
use crate::commands::{
    config_arg, load_app, DIFF, DIFFERENCES_STATUS_CODE, STACK, SUCCESS_STATUS_CODE, TEMPLATE,
};
use crate::errors::{Error, Result};
use crate::template::diff::{diff_templates, ResourceChange};
use crate::template::Template;
use crate::utils::reader::Reader;
use crate::utils::writer::Writer;
use clap::{Arg, ArgAction, ArgMatches};
use colored::*;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Diff {}

#[allow(clippy::new_without_default)]
impl Diff {
    pub fn new() -> Self {
        Diff {}
    }
}

impl Command for Diff {
    fn name(&self) -> &'static str {
        DIFF
    }

    fn command(&self) -> clap::Command {
        clap::Command::new(DIFF)
            .about(r#"Compares a freshly synthesized stack with an existing template, resource by
logical id. Reads the existing template from stdin when --template is not given.
Exits with 1 when there are differences.
"#)
            .arg(config_arg())
            .args(parameter_args())
            .arg(
                Arg::new(STACK.0)
                    .long(STACK.0)
                    .short(STACK.1)
                    .action(ArgAction::Set)
                    .required(true)
                    .help("Name of the stack to synthesize and compare"),
            )
            .arg(
                Arg::new(TEMPLATE.0)
                    .long(TEMPLATE.0)
                    .short(TEMPLATE.1)
                    .action(ArgAction::Set)
                    .help("Provide the existing template in JSON or YAML"),
            )
            .arg_required_else_help(true)
    }

    fn execute(&self, args: &ArgMatches, writer: &mut Writer, reader: &mut Reader) -> Result<i32> {
        let stack = match args.get_one::<String>(STACK.0) {
            Some(stack) => stack.clone(),
            None => return Err(Error::IllegalArguments(String::from("a stack name is required"))),
        };

        let content = match args.get_one::<String>(TEMPLATE.0) {
            Some(file) => {
                if !Path::new(file).exists() {
                    return Err(Error::FileNotFoundError(file.clone()));
                }
                let mut content = String::new();
                BufReader::new(File::open(file)?).read_to_string(&mut content)?;
                content
            }
            None => {
                log::debug!("reading the current template of {} from stdin", stack);
                reader.read_all()?
            }
        };
        let current = Template::parse(&content)?;

        let app = load_app(args)?;
        let (store, resolution) = parameter_source(args);
        let assembly = app.synthesize(store.as_ref(), resolution, &[stack.clone()])?;
        let proposed = assembly
            .template(&stack)
            .ok_or_else(|| Error::UnknownStack(stack.clone()))?;

        let changes = diff_templates(&current, proposed);
        print_changes(&stack, &changes, writer)?;

        if changes.is_empty() {
            Ok(SUCCESS_STATUS_CODE)
        } else {
            Ok(DIFFERENCES_STATUS_CODE)
        }
    }
}

fn print_changes(stack: &str, changes: &[ResourceChange], writer: &mut Writer) -> Result<()> {
    writeln!(writer, "Stack {}", stack.bold())?;
    if changes.is_empty() {
        writeln!(writer, "There were no differences")?;
        return Ok(());
    }
    for change in changes {
        match change {
            ResourceChange::Added {
                logical_id,
                resource_type,
            } => writeln!(writer, "{} {} {}", "[+]".green(), resource_type, logical_id)?,
            ResourceChange::Removed {
                logical_id,
                resource_type,
            } => writeln!(writer, "{} {} {}", "[-]".red(), resource_type, logical_id)?,
            ResourceChange::Modified {
                logical_id,
                resource_type,
                changed,
            } => writeln!(
                writer,
                "{} {} {} ({})",
                "[~]".yellow(),
                resource_type,
                logical_id,
                changed.join(", ")
            )?,
        }
    }
    writeln!(writer, "{} resource change(s)", changes.len())?;
    Ok(())
}
