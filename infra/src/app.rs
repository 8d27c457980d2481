// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::config::InfraConfig;
use crate::constructs::codepipeline::ActionKind;
use crate::errors::{Error, Result};
use crate::parameters::ParameterStore;
use crate::stacks::compute::ComputeStack;
use crate::stacks::pipeline::{PipelineStack, SYNTH_STAGE};
use crate::stacks::repositories::RepositoryStack;
use crate::stacks::{template_file_name, Stack, SynthContext, TagResolution};
use crate::template::Template;
use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Every stack of the project, in the order they are first deployed:
/// repositories, then the compute stack, then the pipeline that keeps the
/// compute stack up to date.
pub struct App {
    config: InfraConfig,
    repositories: Vec<RepositoryStack>,
    compute: ComputeStack,
    pipeline: PipelineStack,
}

/// The synthesized templates, keyed by stack name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloudAssembly {
    pub templates: IndexMap<String, Template>,
}

impl CloudAssembly {
    pub fn template(&self, stack_name: &str) -> Option<&Template> {
        self.templates.get(stack_name)
    }

    /// Writes `<stack>.template.json` for every stack, creating `directory`
    /// when needed, and returns the written paths.
    pub fn write_to(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(directory)?;
        let mut written = Vec::with_capacity(self.templates.len());
        for (name, template) in &self.templates {
            let path = directory.join(template_file_name(name));
            fs::write(&path, template.to_json_pretty()?)?;
            log::info!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

impl App {
    pub fn new(config: InfraConfig) -> Self {
        let repositories = vec![
            RepositoryStack::code_commit(&config),
            RepositoryStack::arm_images(&config),
            RepositoryStack::x86_images(&config),
        ];
        let compute = ComputeStack::new(&config);
        let pipeline = PipelineStack::new(&config);
        App {
            config,
            repositories,
            compute,
            pipeline,
        }
    }

    pub fn config(&self) -> &InfraConfig {
        &self.config
    }

    pub fn compute(&self) -> &ComputeStack {
        &self.compute
    }

    pub fn pipeline(&self) -> &PipelineStack {
        &self.pipeline
    }

    pub fn stacks(&self) -> Vec<&dyn Stack> {
        let mut stacks: Vec<&dyn Stack> = self
            .repositories
            .iter()
            .map(|stack| stack as &dyn Stack)
            .collect();
        stacks.push(&self.compute);
        stacks.push(&self.pipeline);
        stacks
    }

    pub fn stack_names(&self) -> Vec<&str> {
        self.stacks().into_iter().map(|stack| stack.name()).collect()
    }

    /// Cross-stack checks that no single stack can make on its own: the
    /// compute stack must read the parameters the image builds write, and
    /// the deploy stage must apply the template synthesis produces.
    pub fn validate_wiring(&self) -> Result<()> {
        for function in self.compute.functions() {
            let parameter = Value::from(function.image_tag_parameter.as_str());
            let project = self
                .pipeline
                .image_projects()
                .into_iter()
                .find(|project| project.environment_variable("IMAGE_TAG_SSM") == Some(&parameter))
                .ok_or_else(|| {
                    Error::WiringError(format!(
                        "no image build records a tag in {}, which {} reads",
                        function.image_tag_parameter, function.function_name
                    ))
                })?;

            if project.environment_variable("ECR_REPO")
                != Some(&Value::from(function.image_repository.as_str()))
            {
                return Err(Error::WiringError(format!(
                    "{} writes the tag for {} but does not push to {}",
                    project.project_name, function.function_name, function.image_repository
                )));
            }
            if project.environment.architecture != function.architecture {
                return Err(Error::WiringError(format!(
                    "{} builds {} images for {}, which runs on {}",
                    project.project_name,
                    project.environment.architecture,
                    function.function_name,
                    function.architecture
                )));
            }
            if !self.pipeline.synth_project.reads_parameter(&function.image_tag_parameter) {
                return Err(Error::WiringError(format!(
                    "{} does not expose {} to synthesis",
                    self.pipeline.synth_project.project_name, function.image_tag_parameter
                )));
            }
        }

        let synth_outputs = self
            .pipeline
            .pipeline
            .stage(SYNTH_STAGE)
            .map(|stage| {
                stage
                    .actions
                    .iter()
                    .flat_map(|action| action.outputs.iter())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let expected_file = template_file_name(&self.compute.name);
        let deploys_compute = self.pipeline.pipeline.actions().any(|action| match &action.kind {
            ActionKind::CloudFormationCreateUpdate {
                stack_name,
                template_path,
                ..
            } => {
                stack_name == &self.compute.name
                    && template_path.file_name == expected_file
                    && synth_outputs.contains(&&template_path.artifact)
            }
            _ => false,
        });
        if !deploys_compute {
            return Err(Error::WiringError(format!(
                "no deploy action applies {} from the {} output",
                expected_file, SYNTH_STAGE
            )));
        }
        Ok(())
    }

    /// Synthesizes the named stacks, or all of them when `selected` is empty.
    pub fn synthesize(
        &self,
        parameters: &dyn ParameterStore,
        resolution: TagResolution,
        selected: &[String],
    ) -> Result<CloudAssembly> {
        self.validate_wiring()?;

        let stacks = self.stacks();
        for name in selected {
            if !stacks.iter().any(|stack| stack.name() == name) {
                return Err(Error::UnknownStack(name.clone()));
            }
        }

        let context = SynthContext::new(&self.config, parameters, resolution);
        let mut assembly = CloudAssembly::default();
        for stack in stacks {
            if !selected.is_empty() && !selected.iter().any(|name| name == stack.name()) {
                continue;
            }
            log::debug!("synthesizing {}", stack.name());
            let template = stack.synthesize(&context)?;
            assembly.templates.insert(stack.name().to_string(), template);
        }
        Ok(assembly)
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod app_tests;
