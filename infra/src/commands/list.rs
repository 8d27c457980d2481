// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::command::Command;
use crate::commands::{config_arg, load_app, LIST, SUCCESS_STATUS_CODE};
use crate::errors::Result;
use crate::utils::reader::Reader;
use crate::utils::writer::Writer;
use clap::ArgMatches;
use std::io::Write;

#[derive(Clone, Copy, Eq, PartialEq)]
pub struct List {}

#[allow(clippy::new_without_default)]
impl List {
    pub fn new() -> Self {
        List {}
    }
}

impl Command for List {
    fn name(&self) -> &'static str {
        LIST
    }

    fn command(&self) -> clap::Command {
        clap::Command::new(LIST)
            .about("Lists the declared stacks in the order they are synthesized and first deployed.")
            .arg(config_arg())
    }

    fn execute(&self, args: &ArgMatches, writer: &mut Writer, _: &mut Reader) -> Result<i32> {
        let app = load_app(args)?;
        for name in app.stack_names() {
            writeln!(writer, "{name}")?;
        }
        Ok(SUCCESS_STATUS_CODE)
    }
}
