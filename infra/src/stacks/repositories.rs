// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::config::InfraConfig;
use crate::constructs::repository::RepositoryDescriptor;
use crate::errors::Result;
use crate::stacks::{Stack, SynthContext};
use crate::template::Template;

/// A stack holding exactly one repository. Other stacks refer to the
/// repository by name only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryStack {
    pub name: String,
    pub repository: RepositoryDescriptor,
}

impl RepositoryStack {
    pub fn code_commit(config: &InfraConfig) -> Self {
        RepositoryStack {
            name: String::from("CodeCommitRepository"),
            repository: RepositoryDescriptor::code_commit(
                "CodeCommitRepository",
                &config.code_repository,
            ),
        }
    }

    pub fn arm_images(config: &InfraConfig) -> Self {
        RepositoryStack {
            name: String::from("EcrRepository"),
            repository: RepositoryDescriptor::image_registry(
                "EcrRepository",
                &config.arm.image_repository,
            ),
        }
    }

    pub fn x86_images(config: &InfraConfig) -> Self {
        RepositoryStack {
            name: String::from("EcrRepositoryX86"),
            repository: RepositoryDescriptor::image_registry(
                "EcrRepositoryX86",
                &config.x86.image_repository,
            ),
        }
    }
}

impl Stack for RepositoryStack {
    fn name(&self) -> &str {
        &self.name
    }

    fn synthesize(&self, _context: &SynthContext<'_>) -> Result<Template> {
        let mut template = Template::new(None);
        self.repository.add_to(&mut template)?;
        Ok(template)
    }
}
