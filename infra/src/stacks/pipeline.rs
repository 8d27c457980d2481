// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::config::{ArchitectureConfig, InfraConfig};
use crate::constructs::codebuild::{
    BuildEnvironment, BuildProject, BuildSpec, ComputeType, EnvironmentVariable,
    AMAZON_LINUX_2_ARM_STANDARD_2_0, STANDARD_5_0,
};
use crate::constructs::codepipeline::{Action, ArtifactPath, Pipeline, PipelineStage};
use crate::constructs::iam::{Policy, PolicyStatement, Role};
use crate::constructs::repository::RepositoryDescriptor;
use crate::errors::Result;
use crate::stacks::{template_file_name, Stack, SynthContext};
use crate::template::intrinsics::{get_att, join, partition_arn, reference, ACCOUNT_ID, REGION};
use crate::template::{Resource, Template};
use serde_json::{json, Value};

pub const SOURCE_OUTPUT: &str = "SourceOutput";
pub const BUILD_OUTPUT: &str = "BuildOutput";
pub const BUILD_OUTPUT_X86: &str = "BuildOutputX86";
pub const CDK_BUILD_OUTPUT: &str = "CdkBuildOutput";

pub const SOURCE_STAGE: &str = "Source";
pub const ARM_BUILD_STAGE: &str = "Build";
pub const X86_BUILD_STAGE: &str = "BuildX86EcrImage";
pub const SYNTH_STAGE: &str = "CdkBuild";
pub const DEPLOY_STAGE: &str = "Deploy";

/// Directory the synth project writes templates to, also the artifact base.
pub const SYNTH_OUTPUT_DIR: &str = "dist";

const BUILD_ROLE_ID: &str = "IamRoleForCodeBuildToPushEcr";
const SYNTH_ROLE_ID: &str = "CdkBuildRole";
const PIPELINE_ROLE_ID: &str = "CodePipelineRole";
const PIPELINE_POLICY_ID: &str = "CodePipelineRoleDefaultPolicy";
const DEPLOY_ROLE_ID: &str = "CodePipelineDeployArmLambdaRole";
const EVENTS_ROLE_ID: &str = "CodePipelineEventsRole";
const ARTIFACT_BUCKET_ID: &str = "CodePipelineArtifactsBucket";

/// Source, two image builds, template synthesis and deployment of the
/// compute stack.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStack {
    pub name: String,
    pub source_repository: RepositoryDescriptor,
    pub arm_image_project: BuildProject,
    pub x86_image_project: BuildProject,
    pub synth_project: BuildProject,
    pub pipeline: Pipeline,
}

fn image_build_spec(config: &InfraConfig) -> BuildSpec {
    let host = config.registry_host();
    let local_tag = "${ECR_REPO}:${CODEBUILD_RESOLVED_SOURCE_VERSION}";
    let remote_tag = format!("{host}/{local_tag}");
    BuildSpec::new(
        &[&format!(
            "aws ecr get-login-password --region {} | docker login --username AWS --password-stdin {}",
            config.region, host
        )],
        &[
            &format!(
                "docker build -t {} -f {} {}",
                local_tag, config.dockerfile, config.docker_context
            ),
            &format!("docker tag {local_tag} {remote_tag}"),
        ],
        &[
            &format!("docker push {remote_tag}"),
            "aws ssm put-parameter --name ${IMAGE_TAG_SSM} --type String --value ${CODEBUILD_RESOLVED_SOURCE_VERSION} --overwrite",
        ],
    )
}

fn image_build_project(
    config: &InfraConfig,
    id: &str,
    architecture: &ArchitectureConfig,
    environment: BuildEnvironment,
) -> BuildProject {
    BuildProject {
        id: id.to_string(),
        project_name: architecture.build_project_name.clone(),
        environment,
        environment_variables: vec![
            EnvironmentVariable::plain("ACCOUNT_ID", config.account_value()),
            EnvironmentVariable::plain("ECR_REPO", architecture.image_repository.as_str()),
            EnvironmentVariable::plain("IMAGE_TAG_SSM", architecture.image_tag_parameter.as_str()),
        ],
        build_spec: image_build_spec(config),
        service_role_id: BUILD_ROLE_ID.to_string(),
    }
}

fn synth_project(config: &InfraConfig) -> BuildProject {
    BuildProject {
        id: String::from("CdkBuild"),
        project_name: String::from("CdkBuild"),
        environment: BuildEnvironment::linux(STANDARD_5_0, ComputeType::Medium),
        // Both tags land in the environment under their parameter names,
        // where `synth` looks them up.
        environment_variables: vec![
            EnvironmentVariable::from_parameter(&config.x86.image_tag_parameter),
            EnvironmentVariable::from_parameter(&config.arm.image_tag_parameter),
        ],
        build_spec: BuildSpec::new(
            &[
                "curl https://sh.rustup.rs -sSf | sh -s -- -y --profile minimal",
                ". \"$HOME/.cargo/env\"",
                "cargo --version",
            ],
            &[
                "cargo build --release --package lambda-infra",
                &format!("./target/release/lambda-infra synth --output {SYNTH_OUTPUT_DIR}"),
            ],
            &[],
        )
        .with_artifacts(SYNTH_OUTPUT_DIR, &["*.template.json"]),
        service_role_id: SYNTH_ROLE_ID.to_string(),
    }
}

impl PipelineStack {
    pub fn new(config: &InfraConfig) -> Self {
        let arm_image_project = image_build_project(
            config,
            "CodeBuild",
            &config.arm,
            BuildEnvironment::linux_arm(AMAZON_LINUX_2_ARM_STANDARD_2_0, ComputeType::Small),
        );
        let x86_image_project = image_build_project(
            config,
            "CodeBuildX86",
            &config.x86,
            BuildEnvironment::linux(STANDARD_5_0, ComputeType::Medium),
        );
        let synth_project = synth_project(config);

        let pipeline = Pipeline {
            id: String::from("CodePipeline"),
            pipeline_name: config.pipeline_name.clone(),
            role_id: PIPELINE_ROLE_ID.to_string(),
            role_policy_id: PIPELINE_POLICY_ID.to_string(),
            artifact_bucket_id: ARTIFACT_BUCKET_ID.to_string(),
            stages: vec![
                PipelineStage::new(
                    SOURCE_STAGE,
                    vec![Action::code_commit_source(
                        "CodeCommit",
                        &config.code_repository,
                        &config.source_branch,
                        SOURCE_OUTPUT,
                    )],
                ),
                PipelineStage::new(
                    ARM_BUILD_STAGE,
                    vec![Action::code_build(
                        "BuildEcrImage",
                        &arm_image_project.id,
                        SOURCE_OUTPUT,
                        BUILD_OUTPUT,
                    )],
                ),
                PipelineStage::new(
                    X86_BUILD_STAGE,
                    vec![Action::code_build(
                        "BuildX86EcrImage",
                        &x86_image_project.id,
                        SOURCE_OUTPUT,
                        BUILD_OUTPUT_X86,
                    )],
                ),
                PipelineStage::new(
                    SYNTH_STAGE,
                    vec![Action::code_build(
                        "CdkBuild",
                        &synth_project.id,
                        SOURCE_OUTPUT,
                        CDK_BUILD_OUTPUT,
                    )],
                ),
                PipelineStage::new(
                    DEPLOY_STAGE,
                    vec![Action::cloudformation_create_update(
                        "DeployArmLambda",
                        &config.compute_stack_name,
                        ArtifactPath::new(
                            CDK_BUILD_OUTPUT,
                            &template_file_name(&config.compute_stack_name),
                        ),
                        DEPLOY_ROLE_ID,
                    )],
                ),
            ],
        };

        PipelineStack {
            name: config.pipeline_stack_name.clone(),
            source_repository: RepositoryDescriptor::code_commit(
                "CodeCommitRepository",
                &config.code_repository,
            ),
            arm_image_project,
            x86_image_project,
            synth_project,
            pipeline,
        }
    }

    pub fn image_projects(&self) -> [&BuildProject; 2] {
        [&self.arm_image_project, &self.x86_image_project]
    }

    fn projects(&self) -> [&BuildProject; 3] {
        [
            &self.synth_project,
            &self.x86_image_project,
            &self.arm_image_project,
        ]
    }

    fn pipeline_arn(&self) -> Value {
        partition_arn(vec![
            Value::from("codepipeline:"),
            reference(REGION),
            Value::from(":"),
            reference(ACCOUNT_ID),
            Value::from(":"),
            reference(&self.pipeline.id),
        ])
    }

    fn add_roles(&self, template: &mut Template) -> Result<()> {
        let bucket_arn = get_att(ARTIFACT_BUCKET_ID, "Arn");
        let bucket_objects = join("", vec![bucket_arn.clone(), Value::from("/*")]);
        let logs = PolicyStatement::allow(
            &["logs:CreateLogGroup", "logs:CreateLogStream", "logs:PutLogEvents"],
            vec![Value::from("*")],
        );
        let artifacts = PolicyStatement::allow(
            &["s3:GetObject*", "s3:GetBucket*", "s3:List*", "s3:DeleteObject*", "s3:PutObject*", "s3:Abort*"],
            vec![bucket_arn, bucket_objects],
        );

        let build_role = Role::new(BUILD_ROLE_ID, "codebuild.amazonaws.com");
        build_role.add_to(template)?;
        Policy::new(
            "PolicyForCodeBuildToPushEcr",
            vec![
                PolicyStatement::allow(&["ecr:*"], vec![Value::from("*")]),
                PolicyStatement::allow(&["ssm:*"], vec![Value::from("*")]),
                logs.clone(),
                artifacts.clone(),
            ],
        )
        .attach_to(&build_role)
        .add_to(template)?;

        let synth_role = Role::new(SYNTH_ROLE_ID, "codebuild.amazonaws.com");
        synth_role.add_to(template)?;
        Policy::new(
            "CdkBuildRoleDefaultPolicy",
            vec![
                PolicyStatement::allow(&["ssm:GetParameters"], vec![Value::from("*")]),
                logs,
                artifacts.clone(),
            ],
        )
        .attach_to(&synth_role)
        .add_to(template)?;

        // adminPermissions: the deploy role may create anything the compute
        // template declares.
        Role::new(DEPLOY_ROLE_ID, "cloudformation.amazonaws.com")
            .with_managed_policy("AdministratorAccess")
            .add_to(template)?;

        let pipeline_role = Role::new(PIPELINE_ROLE_ID, "codepipeline.amazonaws.com");
        pipeline_role.add_to(template)?;
        let project_arns = self
            .projects()
            .iter()
            .map(|project| get_att(&project.id, "Arn"))
            .collect();
        Policy::new(
            PIPELINE_POLICY_ID,
            vec![
                artifacts,
                PolicyStatement::allow(
                    &[
                        "codecommit:GetBranch",
                        "codecommit:GetCommit",
                        "codecommit:UploadArchive",
                        "codecommit:GetUploadArchiveStatus",
                        "codecommit:CancelUploadArchive",
                    ],
                    vec![self.source_repository.arn()],
                ),
                PolicyStatement::allow(
                    &["codebuild:BatchGetBuilds", "codebuild:StartBuild", "codebuild:StopBuild"],
                    project_arns,
                ),
                PolicyStatement::allow(
                    &["cloudformation:CreateStack", "cloudformation:DescribeStack*", "cloudformation:GetStackPolicy", "cloudformation:GetTemplate*", "cloudformation:SetStackPolicy", "cloudformation:UpdateStack", "cloudformation:ValidateTemplate"],
                    vec![Value::from("*")],
                ),
                PolicyStatement::allow(&["iam:PassRole"], vec![get_att(DEPLOY_ROLE_ID, "Arn")]),
            ],
        )
        .attach_to(&pipeline_role)
        .add_to(template)?;

        let events_role = Role::new(EVENTS_ROLE_ID, "events.amazonaws.com");
        events_role.add_to(template)?;
        Policy::new(
            "CodePipelineEventsRoleDefaultPolicy",
            vec![PolicyStatement::allow(
                &["codepipeline:StartPipelineExecution"],
                vec![self.pipeline_arn()],
            )],
        )
        .attach_to(&events_role)
        .add_to(template)
    }

    /// Starts the pipeline whenever the source branch moves, replacing
    /// CodePipeline's polling.
    fn add_source_trigger(&self, template: &mut Template, branch: &str) -> Result<()> {
        template.add_resource(
            "CodeCommitRepositoryOnCommit",
            Resource::new("AWS::Events::Rule")
                .property(
                    "EventPattern",
                    json!({
                        "source": ["aws.codecommit"],
                        "resources": [self.source_repository.arn()],
                        "detail-type": ["CodeCommit Repository State Change"],
                        "detail": {
                            "event": ["referenceCreated", "referenceUpdated"],
                            "referenceName": [branch],
                        },
                    }),
                )
                .property("State", "ENABLED")
                .property(
                    "Targets",
                    json!([{
                        "Arn": self.pipeline_arn(),
                        "Id": "Target0",
                        "RoleArn": get_att(EVENTS_ROLE_ID, "Arn"),
                    }]),
                ),
        )
    }
}

impl Stack for PipelineStack {
    fn name(&self) -> &str {
        &self.name
    }

    fn synthesize(&self, context: &SynthContext<'_>) -> Result<Template> {
        let mut template = Template::new(Some(
            "Builds the x86_64 and arm64 benchmark images and redeploys the compute stack on every commit",
        ));
        template.add_resource(
            ARTIFACT_BUCKET_ID,
            Resource::new("AWS::S3::Bucket")
                .property(
                    "PublicAccessBlockConfiguration",
                    json!({
                        "BlockPublicAcls": true,
                        "BlockPublicPolicy": true,
                        "IgnorePublicAcls": true,
                        "RestrictPublicBuckets": true,
                    }),
                )
                .retained(),
        )?;
        self.add_roles(&mut template)?;
        for project in self.projects() {
            project.add_to(&mut template)?;
        }
        self.pipeline.add_to(&mut template)?;
        self.add_source_trigger(&mut template, &context.config.source_branch)?;
        Ok(template)
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod pipeline_tests;
