// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::command::Command;
use crate::commands::{
    config_arg, load_app, DEFER_PARAMETERS, OUTPUT, PARAMETERS, STACK, SUCCESS_STATUS_CODE, SYNTH,
};
use crate::errors::Result;
use crate::parameters::{EnvParameterStore, FileParameterStore, ParameterStore};
use crate::stacks::TagResolution;
use crate::utils::reader::Reader;
use crate::utils::writer::Writer;
use clap::{Arg, ArgAction, ArgMatches};
use std::io::Write;
use std::path::Path;

#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Synth {}

#[allow(clippy::new_without_default)]
impl Synth {
    pub fn new() -> Self {
        Synth {}
    }
}

/// Picks the parameter store `synth` and `diff` read image tags from.
pub(crate) fn parameter_source(args: &ArgMatches) -> (Box<dyn ParameterStore>, TagResolution) {
    let resolution = if args.get_flag(DEFER_PARAMETERS) {
        TagResolution::Deferred
    } else {
        TagResolution::Resolved
    };
    let store: Box<dyn ParameterStore> = match args.get_one::<String>(PARAMETERS.0) {
        Some(file) => Box::new(FileParameterStore::new(file)),
        None => Box::new(EnvParameterStore),
    };
    (store, resolution)
}

pub(crate) fn parameter_args() -> [Arg; 2] {
    [
        Arg::new(PARAMETERS.0)
            .long(PARAMETERS.0)
            .short(PARAMETERS.1)
            .action(ArgAction::Set)
            .conflicts_with(DEFER_PARAMETERS)
            .help("Provide a JSON or YAML file mapping parameter names to image tags.\
                   \nWithout it, tags are read from environment variables named after each parameter"),
        Arg::new(DEFER_PARAMETERS)
            .long(DEFER_PARAMETERS)
            .action(ArgAction::SetTrue)
            .help("Leave image tags to CloudFormation: declare SSM-backed template parameters instead of reading tags now"),
    ]
}

impl Command for Synth {
    fn name(&self) -> &'static str {
        SYNTH
    }

    fn command(&self) -> clap::Command {
        clap::Command::new(SYNTH)
            .about(r#"Synthesizes CloudFormation templates for the declared stacks.
Image tags of the compute functions are read from the parameter store at this
point; a missing tag fails synthesis unless --defer-parameters is given.
"#)
            .arg(config_arg())
            .args(parameter_args())
            .arg(
                Arg::new(OUTPUT.0)
                    .long(OUTPUT.0)
                    .short(OUTPUT.1)
                    .action(ArgAction::Set)
                    .help("Write one <stack>.template.json per stack into this directory instead of printing"),
            )
            .arg(
                Arg::new(STACK.0)
                    .long(STACK.0)
                    .short(STACK.1)
                    .action(ArgAction::Append)
                    .help("Only synthesize the named stack. Supports passing multiple values by using this option repeatedly"),
            )
    }

    fn execute(&self, args: &ArgMatches, writer: &mut Writer, _: &mut Reader) -> Result<i32> {
        let app = load_app(args)?;
        let (store, resolution) = parameter_source(args);
        let selected = args
            .get_many::<String>(STACK.0)
            .map(|values| values.cloned().collect::<Vec<_>>())
            .unwrap_or_default();

        let assembly = app.synthesize(store.as_ref(), resolution, &selected)?;

        match args.get_one::<String>(OUTPUT.0) {
            Some(directory) => {
                for path in assembly.write_to(Path::new(directory))? {
                    writeln!(writer, "{}", path.display())?;
                }
            }
            None => {
                // A single stack prints as a bare template, several as a
                // map keyed by stack name.
                let mut templates = assembly.templates.values();
                match (templates.next(), templates.next()) {
                    (Some(only), None) => writeln!(writer, "{}", only.to_json_pretty()?)?,
                    _ => writeln!(
                        writer,
                        "{}",
                        serde_json::to_string_pretty(&assembly.templates)?
                    )?,
                }
            }
        }

        Ok(SUCCESS_STATUS_CODE)
    }
}
