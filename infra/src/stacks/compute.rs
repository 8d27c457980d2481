// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::config::InfraConfig;
use crate::constructs::lambda::{Architecture, ComputeFunction};
use crate::errors::Result;
use crate::stacks::api::ApiStack;
use crate::stacks::observability::ObservabilityStack;
use crate::stacks::{Stack, SynthContext};
use crate::template::Template;

/// The two benchmark functions, plus the API and dashboard that front them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeStack {
    pub name: String,
    pub x86: ComputeFunction,
    pub arm: ComputeFunction,
    pub api: ApiStack,
    pub observability: ObservabilityStack,
}

impl ComputeStack {
    pub fn new(config: &InfraConfig) -> Self {
        let x86 = ComputeFunction::new(
            &config.x86.function_name,
            Architecture::X86_64,
            &config.x86.image_repository,
            &config.x86.image_tag_parameter,
        );
        let arm = ComputeFunction::new(
            &config.arm.function_name,
            Architecture::Arm64,
            &config.arm.image_repository,
            &config.arm.image_tag_parameter,
        );
        let api = ApiStack::new(config, &x86, &arm);
        let observability = ObservabilityStack::new(config, &[&x86, &arm]);
        ComputeStack {
            name: config.compute_stack_name.clone(),
            x86,
            arm,
            api,
            observability,
        }
    }

    pub fn functions(&self) -> [&ComputeFunction; 2] {
        [&self.x86, &self.arm]
    }
}

impl Stack for ComputeStack {
    fn name(&self) -> &str {
        &self.name
    }

    fn synthesize(&self, context: &SynthContext<'_>) -> Result<Template> {
        let mut template = Template::new(Some(
            "Container-image Lambda functions for x86_64 and arm64 behind one REST API, with a comparison dashboard",
        ));
        for function in self.functions() {
            let tag = context.string_parameter(&mut template, &function.image_tag_parameter)?;
            log::info!(
                "{} ({}) pinned to {}:{}",
                function.function_name,
                function.architecture,
                function.image_repository,
                tag
            );
            function.add_to(&mut template, context.config.account_value(), tag)?;
        }
        self.api.add_to(&mut template)?;
        self.observability.add_to(&mut template)?;
        Ok(template)
    }
}

#[cfg(test)]
#[path = "compute_tests.rs"]
mod compute_tests;
