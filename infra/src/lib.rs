// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Declares the x86_64/arm64 Lambda comparison stacks and the pipeline that
//! rebuilds them, and synthesizes them into CloudFormation templates.

pub mod app;
pub mod command;
pub mod commands;
pub mod config;
pub mod constructs;
pub mod errors;
pub mod parameters;
pub mod stacks;
pub mod template;
pub mod utils;

pub use crate::app::{App, CloudAssembly};
pub use crate::config::InfraConfig;
pub use crate::errors::{Error, Result};
pub use crate::parameters::{
    EnvParameterStore, FileParameterStore, InMemoryParameterStore, ParameterStore,
};
pub use crate::stacks::TagResolution;
