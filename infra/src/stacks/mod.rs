// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

pub mod api;
pub mod compute;
pub mod observability;
pub mod pipeline;
pub mod repositories;

use crate::config::InfraConfig;
use crate::errors::Result;
use crate::parameters::ParameterStore;
use crate::template::intrinsics::{logical_id, reference};
use crate::template::{Parameter, Template};
use serde_json::Value;

/// How parameter-store lookups are rendered into a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagResolution {
    /// Read the value while synthesizing. An absent entry fails synthesis.
    #[default]
    Resolved,
    /// Declare an `AWS::SSM::Parameter::Value<String>` template parameter
    /// and let CloudFormation read the entry at deploy time.
    Deferred,
}

pub struct SynthContext<'a> {
    pub config: &'a InfraConfig,
    pub parameters: &'a dyn ParameterStore,
    pub resolution: TagResolution,
}

impl<'a> SynthContext<'a> {
    pub fn new(
        config: &'a InfraConfig,
        parameters: &'a dyn ParameterStore,
        resolution: TagResolution,
    ) -> Self {
        SynthContext {
            config,
            parameters,
            resolution,
        }
    }

    /// The value of a string parameter as it should appear in `template`.
    pub fn string_parameter(&self, template: &mut Template, name: &str) -> Result<Value> {
        match self.resolution {
            TagResolution::Resolved => {
                let value = self.parameters.require(name)?;
                log::debug!("resolved parameter {} to {}", name, value);
                Ok(Value::from(value))
            }
            TagResolution::Deferred => {
                let id = logical_id(&["SsmParameterValue", name]);
                template.add_parameter(
                    &id,
                    Parameter {
                        parameter_type: String::from("AWS::SSM::Parameter::Value<String>"),
                        default: Some(name.to_string()),
                        description: None,
                    },
                )?;
                Ok(reference(&id))
            }
        }
    }
}

/// A named, independently deployable unit of resources.
pub trait Stack {
    fn name(&self) -> &str;
    fn synthesize(&self, context: &SynthContext<'_>) -> Result<Template>;
}

pub fn template_file_name(stack_name: &str) -> String {
    format!("{stack_name}.template.json")
}
