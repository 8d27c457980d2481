// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::errors::{Error, Result};
use crate::template::intrinsics::{reference, ACCOUNT_ID};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Names and environment settings shared by every stack. All fields have
/// defaults; a config file only needs to list what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InfraConfig {
    /// Region the image build projects log in to and push to.
    pub region: String,
    /// Literal account id. When unset, templates use `AWS::AccountId`.
    pub account: Option<String>,
    pub code_repository: String,
    pub source_branch: String,
    pub compute_stack_name: String,
    pub pipeline_stack_name: String,
    pub api_name: String,
    pub dashboard_name: String,
    pub pipeline_name: String,
    /// Dockerfile and build context of the benchmark function, relative to
    /// the repository root.
    pub dockerfile: String,
    pub docker_context: String,
    pub x86: ArchitectureConfig,
    pub arm: ArchitectureConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchitectureConfig {
    pub function_name: String,
    pub image_repository: String,
    /// Parameter store entry holding the tag of the last image pushed.
    pub image_tag_parameter: String,
    pub path_part: String,
    pub build_project_name: String,
}

impl Default for InfraConfig {
    fn default() -> Self {
        InfraConfig {
            region: String::from("ap-southeast-1"),
            account: None,
            code_repository: String::from("arm-codebuild-lambda"),
            source_branch: String::from("master"),
            compute_stack_name: String::from("CdkArmCodebuildLambdaStack"),
            pipeline_stack_name: String::from("CodePipelineStack"),
            api_name: String::from("ArmLambdaApi"),
            dashboard_name: String::from("Compare-X86-And-Arm-Lambda"),
            pipeline_name: String::from("build-arm-image-for-lambda"),
            dockerfile: String::from("./benchmark-lambda/Dockerfile"),
            docker_context: String::from("."),
            x86: ArchitectureConfig {
                function_name: String::from("X86LambdaFunction"),
                image_repository: String::from("x86-image-for-lambda"),
                image_tag_parameter: String::from("X86BuildLambdaImageId"),
                path_part: String::from("x86-lambda"),
                build_project_name: String::from("BuildX86EcrImageForLambda"),
            },
            arm: ArchitectureConfig {
                function_name: String::from("ArmLambdaFunction"),
                image_repository: String::from("arm-image-for-lambda"),
                image_tag_parameter: String::from("ArmBuildLambdaImageTagId"),
                path_part: String::from("arm-lambda"),
                build_project_name: String::from("BuildArmEcrImageForLambda"),
            },
        }
    }
}

impl InfraConfig {
    /// Reads a JSON or YAML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFoundError(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let config: InfraConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.x86.image_tag_parameter == self.arm.image_tag_parameter {
            return Err(Error::IllegalArguments(format!(
                "both architectures record their image tag in `{}`",
                self.x86.image_tag_parameter
            )));
        }
        if self.x86.path_part == self.arm.path_part {
            return Err(Error::IllegalArguments(format!(
                "both architectures are routed at `/{}`",
                self.x86.path_part
            )));
        }
        Ok(())
    }

    pub fn account_value(&self) -> Value {
        match &self.account {
            Some(account) => Value::from(account.as_str()),
            None => reference(ACCOUNT_ID),
        }
    }

    /// `<account>.dkr.ecr.<region>.amazonaws.com`, as the build shell sees it.
    pub fn registry_host(&self) -> String {
        format!("${{ACCOUNT_ID}}.dkr.ecr.{}.amazonaws.com", self.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_yaml_overrides_defaults() {
        let config: InfraConfig = serde_yaml::from_str(indoc! {r#"
            region: us-east-1
            x86:
              function_name: X86Fn
              image_repository: x86-repo
              image_tag_parameter: X86Tag
              path_part: x86
              build_project_name: BuildX86
        "#})
        .unwrap();

        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.x86.image_tag_parameter, "X86Tag");
        assert_eq!(config.arm, InfraConfig::default().arm);
        assert_eq!(config.pipeline_name, "build-arm-image-for-lambda");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = serde_yaml::from_str::<InfraConfig>("regoin: us-east-1\n");
        assert!(result.is_err());
    }

    #[test]
    fn shared_tag_parameter_is_invalid() {
        let mut config = InfraConfig::default();
        config.arm.image_tag_parameter = config.x86.image_tag_parameter.clone();
        assert!(matches!(
            config.validate(),
            Err(Error::IllegalArguments(_))
        ));
    }

    #[test]
    fn account_defaults_to_pseudo_parameter() {
        let mut config = InfraConfig::default();
        assert_eq!(config.account_value(), serde_json::json!({ "Ref": "AWS::AccountId" }));
        config.account = Some(String::from("123456789012"));
        assert_eq!(config.account_value(), serde_json::json!("123456789012"));
    }
}
