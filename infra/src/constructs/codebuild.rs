// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::constructs::lambda::Architecture;
use crate::errors::Result;
use crate::template::intrinsics::get_att;
use crate::template::{Resource, Template};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const STANDARD_5_0: &str = "aws/codebuild/standard:5.0";
pub const AMAZON_LINUX_2_ARM_STANDARD_2_0: &str = "aws/codebuild/amazonlinux2-aarch64-standard:2.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeType {
    Small,
    Medium,
}

impl ComputeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComputeType::Small => "BUILD_GENERAL1_SMALL",
            ComputeType::Medium => "BUILD_GENERAL1_MEDIUM",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEnvironment {
    pub architecture: Architecture,
    pub image: String,
    pub compute_type: ComputeType,
    /// Required to run the docker daemon inside the build.
    pub privileged: bool,
}

impl BuildEnvironment {
    pub fn linux(image: &str, compute_type: ComputeType) -> Self {
        BuildEnvironment {
            architecture: Architecture::X86_64,
            image: image.to_string(),
            compute_type,
            privileged: true,
        }
    }

    pub fn linux_arm(image: &str, compute_type: ComputeType) -> Self {
        BuildEnvironment {
            architecture: Architecture::Arm64,
            image: image.to_string(),
            compute_type,
            privileged: true,
        }
    }

    pub fn container_type(&self) -> &'static str {
        match self.architecture {
            Architecture::X86_64 => "LINUX_CONTAINER",
            Architecture::Arm64 => "ARM_CONTAINER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Plaintext,
    /// CodeBuild resolves the value from the named parameter store entry
    /// when the build starts.
    ParameterStore,
}

impl VariableKind {
    fn as_str(&self) -> &'static str {
        match self {
            VariableKind::Plaintext => "PLAINTEXT",
            VariableKind::ParameterStore => "PARAMETER_STORE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentVariable {
    pub name: String,
    pub value: Value,
    pub kind: VariableKind,
}

impl EnvironmentVariable {
    pub fn plain<V: Into<Value>>(name: &str, value: V) -> Self {
        EnvironmentVariable {
            name: name.to_string(),
            value: value.into(),
            kind: VariableKind::Plaintext,
        }
    }

    /// Exposes a parameter store entry under its own name.
    pub fn from_parameter(parameter_name: &str) -> Self {
        EnvironmentVariable {
            name: parameter_name.to_string(),
            value: Value::from(parameter_name),
            kind: VariableKind::ParameterStore,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCommands {
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPhases {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_build: Option<PhaseCommands>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<PhaseCommands>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_build: Option<PhaseCommands>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildArtifacts {
    #[serde(rename = "base-directory", default, skip_serializing_if = "Option::is_none")]
    pub base_directory: Option<String>,
    pub files: Vec<String>,
}

/// A CodeBuild buildspec, version 0.2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpec {
    pub version: String,
    pub phases: BuildPhases,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<BuildArtifacts>,
}

fn commands(lines: &[&str]) -> Option<PhaseCommands> {
    if lines.is_empty() {
        return None;
    }
    Some(PhaseCommands {
        commands: lines.iter().map(|line| line.to_string()).collect(),
    })
}

impl BuildSpec {
    pub fn new(pre_build: &[&str], build: &[&str], post_build: &[&str]) -> Self {
        BuildSpec {
            version: String::from("0.2"),
            phases: BuildPhases {
                pre_build: commands(pre_build),
                build: commands(build),
                post_build: commands(post_build),
            },
            artifacts: None,
        }
    }

    pub fn with_artifacts(mut self, base_directory: &str, files: &[&str]) -> Self {
        self.artifacts = Some(BuildArtifacts {
            base_directory: Some(base_directory.to_string()),
            files: files.iter().map(|f| f.to_string()).collect(),
        });
        self
    }

    /// Every command, in phase order.
    pub fn all_commands(&self) -> impl Iterator<Item = &String> {
        [
            &self.phases.pre_build,
            &self.phases.build,
            &self.phases.post_build,
        ]
        .into_iter()
        .flatten()
        .flat_map(|phase| phase.commands.iter())
    }
}

/// A CodeBuild project fed by, and reporting back to, CodePipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildProject {
    pub id: String,
    pub project_name: String,
    pub environment: BuildEnvironment,
    pub environment_variables: Vec<EnvironmentVariable>,
    pub build_spec: BuildSpec,
    pub service_role_id: String,
}

impl BuildProject {
    pub fn environment_variable(&self, name: &str) -> Option<&Value> {
        self.environment_variables
            .iter()
            .find(|variable| variable.name == name)
            .map(|variable| &variable.value)
    }

    pub fn reads_parameter(&self, parameter_name: &str) -> bool {
        self.environment_variables.iter().any(|variable| {
            variable.kind == VariableKind::ParameterStore
                && variable.value.as_str() == Some(parameter_name)
        })
    }

    pub fn add_to(&self, template: &mut Template) -> Result<()> {
        let mut environment = json!({
            "ComputeType": self.environment.compute_type.as_str(),
            "Image": self.environment.image,
            "ImagePullCredentialsType": "CODEBUILD",
            "PrivilegedMode": self.environment.privileged,
            "Type": self.environment.container_type(),
        });
        if !self.environment_variables.is_empty() {
            environment["EnvironmentVariables"] = Value::Array(
                self.environment_variables
                    .iter()
                    .map(|variable| {
                        json!({
                            "Name": variable.name,
                            "Type": variable.kind.as_str(),
                            "Value": variable.value,
                        })
                    })
                    .collect(),
            );
        }

        template.add_resource(
            &self.id,
            Resource::new("AWS::CodeBuild::Project")
                .property("Artifacts", json!({ "Type": "CODEPIPELINE" }))
                .property("Environment", environment)
                .property("ServiceRole", get_att(&self.service_role_id, "Arn"))
                .property(
                    "Source",
                    json!({
                        "BuildSpec": serde_json::to_string_pretty(&self.build_spec)?,
                        "Type": "CODEPIPELINE",
                    }),
                )
                .property("Cache", json!({ "Type": "NO_CACHE" }))
                .property("EncryptionKey", "alias/aws/s3")
                .property("Name", self.project_name.as_str()),
        )
    }
}
