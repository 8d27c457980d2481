// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::constructs::iam::Role;
use crate::errors::Result;
use crate::template::intrinsics::{get_att, join, reference, REGION, URL_SUFFIX};
use crate::template::{Resource, Template};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "arm64")]
    Arm64,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X86_64 => "x86_64",
            Architecture::Arm64 => "arm64",
        }
    }
}

impl Display for Architecture {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_MEMORY_SIZE: u32 = 10240;
pub const DEFAULT_TIMEOUT_SECONDS: u32 = 10;

/// A Lambda function packaged as a container image from an ECR repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeFunction {
    pub id: String,
    pub function_name: String,
    pub architecture: Architecture,
    pub memory_size: u32,
    pub timeout_seconds: u32,
    pub image_repository: String,
    /// Name of the parameter store entry the image tag is read from.
    pub image_tag_parameter: String,
}

impl ComputeFunction {
    pub fn new(
        function_name: &str,
        architecture: Architecture,
        image_repository: &str,
        image_tag_parameter: &str,
    ) -> Self {
        ComputeFunction {
            id: function_name.to_string(),
            function_name: function_name.to_string(),
            architecture,
            memory_size: DEFAULT_MEMORY_SIZE,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            image_repository: image_repository.to_string(),
            image_tag_parameter: image_tag_parameter.to_string(),
        }
    }

    pub fn role(&self) -> Role {
        Role::new(&format!("{}ServiceRole", self.id), "lambda.amazonaws.com")
            .with_managed_policy("service-role/AWSLambdaBasicExecutionRole")
    }

    pub fn arn(&self) -> Value {
        get_att(&self.id, "Arn")
    }

    /// `<account>.dkr.ecr.<region>.<suffix>/<repository>:<tag>`
    pub fn image_uri(&self, account: Value, image_tag: Value) -> Value {
        join(
            "",
            vec![
                account,
                Value::from(".dkr.ecr."),
                reference(REGION),
                Value::from("."),
                reference(URL_SUFFIX),
                Value::from(format!("/{}:", self.image_repository)),
                image_tag,
            ],
        )
    }

    pub fn add_to(&self, template: &mut Template, account: Value, image_tag: Value) -> Result<()> {
        let role = self.role();
        role.add_to(template)?;

        template.add_resource(
            &self.id,
            Resource::new("AWS::Lambda::Function")
                .property(
                    "Code",
                    serde_json::json!({ "ImageUri": self.image_uri(account, image_tag) }),
                )
                .property("Role", role.arn())
                .property("Architectures", vec![self.architecture.as_str()])
                .property("FunctionName", self.function_name.as_str())
                .property("MemorySize", self.memory_size)
                .property("PackageType", "Image")
                .property("Timeout", self.timeout_seconds)
                .depends_on(&role.id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn function_declares_image_package_and_role() {
        let function = ComputeFunction::new(
            "ArmLambdaFunction",
            Architecture::Arm64,
            "arm-image-for-lambda",
            "ArmBuildLambdaImageTagId",
        );
        let mut template = Template::new(None);
        function
            .add_to(&mut template, Value::from("123456789012"), Value::from("abc123"))
            .unwrap();

        assert_eq!(template.count_of_type("AWS::IAM::Role"), 1);
        let resource = template.resource("ArmLambdaFunction").unwrap();
        assert_eq!(resource.get("Architectures"), Some(&json!(["arm64"])));
        assert_eq!(resource.get("MemorySize"), Some(&json!(10240)));
        assert_eq!(resource.get("Timeout"), Some(&json!(10)));
        assert_eq!(resource.get("PackageType"), Some(&json!("Image")));
        assert_eq!(
            resource.get("Code").unwrap()["ImageUri"],
            json!({ "Fn::Join": ["", [
                "123456789012.dkr.ecr.",
                { "Ref": "AWS::Region" },
                ".",
                { "Ref": "AWS::URLSuffix" },
                "/arm-image-for-lambda:abc123"
            ]]})
        );
        assert_eq!(resource.depends_on, vec!["ArmLambdaFunctionServiceRole"]);
    }
}
