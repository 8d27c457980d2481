// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::errors::Result;
use crate::template::intrinsics::{partition_arn, reference, ACCOUNT_ID, REGION};
use crate::template::{Resource, Template};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryKind {
    CodeCommit,
    ImageRegistry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    pub id: String,
    pub name: String,
    pub kind: RepositoryKind,
}

impl RepositoryDescriptor {
    pub fn code_commit(id: &str, name: &str) -> Self {
        RepositoryDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            kind: RepositoryKind::CodeCommit,
        }
    }

    pub fn image_registry(id: &str, name: &str) -> Self {
        RepositoryDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            kind: RepositoryKind::ImageRegistry,
        }
    }

    pub fn resource_type(&self) -> &'static str {
        match self.kind {
            RepositoryKind::CodeCommit => "AWS::CodeCommit::Repository",
            RepositoryKind::ImageRegistry => "AWS::ECR::Repository",
        }
    }

    /// ARN of a repository looked up by name from another stack.
    pub fn arn(&self) -> Value {
        let service = match self.kind {
            RepositoryKind::CodeCommit => "codecommit:",
            RepositoryKind::ImageRegistry => "ecr:",
        };
        let name = match self.kind {
            RepositoryKind::CodeCommit => format!(":{}", self.name),
            RepositoryKind::ImageRegistry => format!(":repository/{}", self.name),
        };
        partition_arn(vec![
            Value::from(service),
            reference(REGION),
            Value::from(":"),
            reference(ACCOUNT_ID),
            Value::from(name),
        ])
    }

    pub fn add_to(&self, template: &mut Template) -> Result<()> {
        let resource =
            Resource::new(self.resource_type()).property("RepositoryName", self.name.as_str());
        let resource = match self.kind {
            // Images outlive the stack that declared their registry.
            RepositoryKind::ImageRegistry => resource.retained(),
            RepositoryKind::CodeCommit => resource,
        };
        template.add_resource(&self.id, resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn image_registry_is_retained() {
        let mut template = Template::new(None);
        RepositoryDescriptor::image_registry("EcrRepository", "arm-image-for-lambda")
            .add_to(&mut template)
            .unwrap();
        let repo = template.resource("EcrRepository").unwrap();
        assert_eq!(repo.resource_type, "AWS::ECR::Repository");
        assert_eq!(repo.deletion_policy.as_deref(), Some("Retain"));
    }

    #[test]
    fn code_commit_arn_ends_with_name() {
        let repo = RepositoryDescriptor::code_commit("CodeCommitRepository", "arm-codebuild-lambda");
        let arn = repo.arn();
        let parts = arn["Fn::Join"][1].as_array().unwrap();
        assert_eq!(parts.last(), Some(&json!(":arm-codebuild-lambda")));
    }
}
