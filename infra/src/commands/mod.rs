// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

pub mod completions;
pub mod diff;
pub mod list;
pub mod put_parameter;
pub mod synth;

use crate::config::InfraConfig;
use crate::errors::Result;
use crate::App;
use clap::{Arg, ArgAction, ArgMatches};

//
// Constants
//
// Application metadata
pub const APP_NAME: &str = "lambda-infra";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
// Commands
pub const SYNTH: &str = "synth";
pub const LIST: &str = "list";
pub const DIFF: &str = "diff";
pub const PUT_PARAMETER: &str = "put-parameter";
pub const COMPLETIONS: &str = "completions";
// Arguments shared by synth, list, diff
pub const CONFIG: (&str, char) = ("config", 'c');
pub const STACK: (&str, char) = ("stack", 's');
// Arguments for synth, diff
pub const PARAMETERS: (&str, char) = ("parameters", 'p');
pub const DEFER_PARAMETERS: &str = "defer-parameters";
// Arguments for synth
pub const OUTPUT: (&str, char) = ("output", 'o');
// Arguments for diff
pub const TEMPLATE: (&str, char) = ("template", 't');
// Arguments for put-parameter
pub const NAME: (&str, char) = ("name", 'n');
pub const VALUE: (&str, char) = ("value", 'v');
pub const OVERWRITE: &str = "overwrite";
// Arguments for completions
pub const SHELL: (&str, char) = ("shell", 's');
pub const LOCATION: (&str, char) = ("location", 'l');
// Global
pub const VERBOSE: &str = "verbose";

pub const SUCCESS_STATUS_CODE: i32 = 0;
pub const DIFFERENCES_STATUS_CODE: i32 = 1;
pub const ERROR_STATUS_CODE: i32 = 5;

pub(crate) fn config_arg() -> Arg {
    Arg::new(CONFIG.0)
        .long(CONFIG.0)
        .short(CONFIG.1)
        .action(ArgAction::Set)
        .help("Provide a JSON or YAML file overriding the default names, region and account")
}

pub(crate) fn load_app(args: &ArgMatches) -> Result<App> {
    let config = match args.get_one::<String>(CONFIG.0) {
        Some(path) => InfraConfig::from_file(path)?,
        None => InfraConfig::default(),
    };
    Ok(App::new(config))
}
