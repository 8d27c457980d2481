// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::errors::{Error, Result};
use crate::template::intrinsics::{get_att, reference};
use crate::template::{Resource, Template};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// `<artifact>::<file>` as CodePipeline expects it in a template path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPath {
    pub artifact: String,
    pub file_name: String,
}

impl ArtifactPath {
    pub fn new(artifact: &str, file_name: &str) -> Self {
        ArtifactPath {
            artifact: artifact.to_string(),
            file_name: file_name.to_string(),
        }
    }
}

impl Display for ArtifactPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.artifact, self.file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    CodeCommitSource {
        repository_name: String,
        branch: String,
    },
    CodeBuild {
        project_id: String,
    },
    CloudFormationCreateUpdate {
        stack_name: String,
        template_path: ArtifactPath,
        deployment_role_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub kind: ActionKind,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

impl Action {
    pub fn code_commit_source(name: &str, repository_name: &str, branch: &str, output: &str) -> Self {
        Action {
            name: name.to_string(),
            kind: ActionKind::CodeCommitSource {
                repository_name: repository_name.to_string(),
                branch: branch.to_string(),
            },
            inputs: vec![],
            outputs: vec![output.to_string()],
        }
    }

    pub fn code_build(name: &str, project_id: &str, input: &str, output: &str) -> Self {
        Action {
            name: name.to_string(),
            kind: ActionKind::CodeBuild {
                project_id: project_id.to_string(),
            },
            inputs: vec![input.to_string()],
            outputs: vec![output.to_string()],
        }
    }

    /// The template path's artifact becomes the action's only input.
    pub fn cloudformation_create_update(
        name: &str,
        stack_name: &str,
        template_path: ArtifactPath,
        deployment_role_id: &str,
    ) -> Self {
        Action {
            name: name.to_string(),
            inputs: vec![template_path.artifact.clone()],
            kind: ActionKind::CloudFormationCreateUpdate {
                stack_name: stack_name.to_string(),
                template_path,
                deployment_role_id: deployment_role_id.to_string(),
            },
            outputs: vec![],
        }
    }

    fn to_value(&self) -> Value {
        let (category, provider, configuration) = match &self.kind {
            ActionKind::CodeCommitSource {
                repository_name,
                branch,
            } => (
                "Source",
                "CodeCommit",
                json!({
                    "RepositoryName": repository_name,
                    "BranchName": branch,
                    "PollForSourceChanges": false,
                }),
            ),
            ActionKind::CodeBuild { project_id } => (
                "Build",
                "CodeBuild",
                json!({ "ProjectName": reference(project_id) }),
            ),
            ActionKind::CloudFormationCreateUpdate {
                stack_name,
                template_path,
                deployment_role_id,
            } => (
                "Deploy",
                "CloudFormation",
                json!({
                    "StackName": stack_name,
                    "Capabilities": "CAPABILITY_NAMED_IAM",
                    "RoleArn": get_att(deployment_role_id, "Arn"),
                    "ActionMode": "CREATE_UPDATE",
                    "TemplatePath": template_path.to_string(),
                }),
            ),
        };

        let mut action = json!({
            "ActionTypeId": {
                "Category": category,
                "Owner": "AWS",
                "Provider": provider,
                "Version": "1",
            },
            "Configuration": configuration,
            "Name": self.name,
        });
        if !self.inputs.is_empty() {
            action["InputArtifacts"] = artifact_list(&self.inputs);
        }
        if !self.outputs.is_empty() {
            action["OutputArtifacts"] = artifact_list(&self.outputs);
        }
        action["RunOrder"] = json!(1);
        action
    }
}

fn artifact_list(names: &[String]) -> Value {
    Value::Array(names.iter().map(|name| json!({ "Name": name })).collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStage {
    pub name: String,
    pub actions: Vec<Action>,
}

impl PipelineStage {
    pub fn new(name: &str, actions: Vec<Action>) -> Self {
        PipelineStage {
            name: name.to_string(),
            actions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub id: String,
    pub pipeline_name: String,
    pub role_id: String,
    /// Inline policy granting the role its permissions. The pipeline starts
    /// an execution as soon as it exists, so it waits for this policy too.
    pub role_policy_id: String,
    pub artifact_bucket_id: String,
    pub stages: Vec<PipelineStage>,
}

impl Pipeline {
    pub fn stage(&self, name: &str) -> Option<&PipelineStage> {
        self.stages.iter().find(|stage| stage.name == name)
    }

    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.stages.iter().flat_map(|stage| stage.actions.iter())
    }

    /// Checks the artifact graph: every input was produced by an earlier
    /// stage, and no artifact is produced twice.
    pub fn validate(&self) -> Result<()> {
        if self.stages.len() < 2 {
            return Err(Error::WiringError(format!(
                "pipeline {} needs a source stage and at least one more stage",
                self.pipeline_name
            )));
        }
        let mut produced: HashSet<&str> = HashSet::new();
        for stage in &self.stages {
            if stage.actions.is_empty() {
                return Err(Error::WiringError(format!(
                    "stage {} of pipeline {} has no actions",
                    stage.name, self.pipeline_name
                )));
            }
            // Actions of one stage run in parallel and cannot see each
            // other's outputs.
            let mut produced_here = Vec::new();
            for action in &stage.actions {
                for input in &action.inputs {
                    if !produced.contains(input.as_str()) {
                        return Err(Error::WiringError(format!(
                            "action {} in stage {} consumes artifact {} before any earlier stage produces it",
                            action.name, stage.name, input
                        )));
                    }
                }
                for output in &action.outputs {
                    if produced.contains(output.as_str()) || produced_here.contains(&output.as_str()) {
                        return Err(Error::WiringError(format!(
                            "artifact {} is produced more than once",
                            output
                        )));
                    }
                    produced_here.push(output.as_str());
                }
            }
            produced.extend(produced_here);
        }
        Ok(())
    }

    pub fn add_to(&self, template: &mut Template) -> Result<()> {
        self.validate()?;
        let stages = self
            .stages
            .iter()
            .map(|stage| {
                json!({
                    "Actions": stage.actions.iter().map(Action::to_value).collect::<Vec<_>>(),
                    "Name": stage.name,
                })
            })
            .collect::<Vec<_>>();

        template.add_resource(
            &self.id,
            Resource::new("AWS::CodePipeline::Pipeline")
                .property("RoleArn", get_att(&self.role_id, "Arn"))
                .property("Stages", stages)
                .property(
                    "ArtifactStore",
                    json!({ "Location": reference(&self.artifact_bucket_id), "Type": "S3" }),
                )
                .property("Name", self.pipeline_name.as_str())
                .depends_on(&self.role_policy_id)
                .depends_on(&self.role_id),
        )
    }
}
