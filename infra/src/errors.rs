// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error serializing or parsing JSON {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Error serializing or parsing YAML {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("I/O error when reading or writing {0}")]
    IoError(#[from] std::io::Error),
    #[error("Formatting error when writing {0}")]
    FormatError(#[from] std::fmt::Error),
    #[error("Parameter `{0}` could not be found in the parameter store")]
    MissingParameter(String),
    #[error("Parameter `{0}` already exists and overwrite was not requested")]
    ParameterExists(String),
    #[error("No stack named `{0}` is declared in this app")]
    UnknownStack(String),
    #[error("Resource wiring is inconsistent: {0}")]
    WiringError(String),
    #[error("Logical id `{0}` is declared more than once in the same template")]
    DuplicateLogicalId(String),
    #[error("The path `{0}` does not exist")]
    FileNotFoundError(String),
    #[error("{0}")]
    IllegalArguments(String),
    #[error("Could not create shell completions at {0}")]
    InvalidCompletionsPath(String),
}

pub type Result<R> = std::result::Result<R, Error>;
