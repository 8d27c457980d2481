// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::constructs::codebuild::EnvironmentVariable;
use crate::constructs::lambda::Architecture;
use crate::parameters::InMemoryParameterStore;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::env::temp_dir;

fn tags() -> InMemoryParameterStore {
    InMemoryParameterStore::new()
        .with("X86BuildLambdaImageId", "0a1b2c3")
        .with("ArmBuildLambdaImageTagId", "4d5e6f7")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = temp_dir().join(format!("lambda-infra-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn stacks_are_listed_in_deployment_order() {
    let app = App::new(InfraConfig::default());
    assert_eq!(
        app.stack_names(),
        vec![
            "CodeCommitRepository",
            "EcrRepository",
            "EcrRepositoryX86",
            "CdkArmCodebuildLambdaStack",
            "CodePipelineStack",
        ]
    );
}

#[test]
fn default_wiring_is_consistent() {
    App::new(InfraConfig::default()).validate_wiring().unwrap();
}

#[rstest]
#[case("CodeCommitRepository", "AWS::CodeCommit::Repository", "arm-codebuild-lambda")]
#[case("EcrRepository", "AWS::ECR::Repository", "arm-image-for-lambda")]
#[case("EcrRepositoryX86", "AWS::ECR::Repository", "x86-image-for-lambda")]
fn repository_stacks_hold_one_named_repository(
    #[case] stack: &str,
    #[case] resource_type: &str,
    #[case] repository_name: &str,
) {
    let app = App::new(InfraConfig::default());
    let assembly = app
        .synthesize(&tags(), TagResolution::Resolved, &[stack.to_string()])
        .unwrap();
    let template = assembly.template(stack).unwrap();
    assert_eq!(template.resources.len(), 1);
    let (_, repository) = template.resources_of_type(resource_type).next().unwrap();
    assert_eq!(
        repository.get("RepositoryName"),
        Some(&Value::from(repository_name))
    );
}

#[test]
fn synthesizes_every_stack_by_default() {
    let app = App::new(InfraConfig::default());
    let assembly = app
        .synthesize(&tags(), TagResolution::Resolved, &[])
        .unwrap();
    assert_eq!(
        assembly.templates.keys().map(String::as_str).collect::<Vec<_>>(),
        app.stack_names()
    );
}

#[test]
fn unknown_stack_is_rejected() {
    let app = App::new(InfraConfig::default());
    match app.synthesize(&tags(), TagResolution::Resolved, &[String::from("NoSuchStack")]) {
        Err(Error::UnknownStack(name)) => assert_eq!(name, "NoSuchStack"),
        other => panic!("expected UnknownStack, got {:?}", other.map(|a| a.templates.len())),
    }
}

#[test]
fn stacks_without_parameters_synthesize_with_an_empty_store() {
    let app = App::new(InfraConfig::default());
    let selected = vec![
        String::from("CodeCommitRepository"),
        String::from("CodePipelineStack"),
    ];
    let assembly = app
        .synthesize(&InMemoryParameterStore::new(), TagResolution::Resolved, &selected)
        .unwrap();
    assert_eq!(assembly.templates.len(), 2);
}

#[test]
fn missing_tag_fails_whole_synthesis() {
    let app = App::new(InfraConfig::default());
    let store = InMemoryParameterStore::new().with("X86BuildLambdaImageId", "0a1b2c3");
    match app.synthesize(&store, TagResolution::Resolved, &[]) {
        Err(Error::MissingParameter(name)) => assert_eq!(name, "ArmBuildLambdaImageTagId"),
        other => panic!("expected MissingParameter, got {:?}", other.is_ok()),
    }
}

#[test]
fn deferred_tags_need_no_store_entries() {
    let app = App::new(InfraConfig::default());
    let assembly = app
        .synthesize(&InMemoryParameterStore::new(), TagResolution::Deferred, &[])
        .unwrap();
    let compute = assembly.template("CdkArmCodebuildLambdaStack").unwrap();
    assert_eq!(compute.parameters.len(), 2);
}

#[test]
fn tag_written_to_the_wrong_parameter_is_a_wiring_error() {
    let mut app = App::new(InfraConfig::default());
    app.pipeline.x86_image_project.environment_variables = vec![
        EnvironmentVariable::plain("ACCOUNT_ID", app.config.account_value()),
        EnvironmentVariable::plain("ECR_REPO", "x86-image-for-lambda"),
        EnvironmentVariable::plain("IMAGE_TAG_SSM", "SomeOtherParameter"),
    ];
    match app.validate_wiring() {
        Err(Error::WiringError(message)) => assert!(message.contains("X86BuildLambdaImageId")),
        other => panic!("expected WiringError, got {:?}", other.is_ok()),
    }
    assert!(app
        .synthesize(&tags(), TagResolution::Resolved, &[])
        .is_err());
}

#[test]
fn image_built_for_the_wrong_architecture_is_a_wiring_error() {
    let mut app = App::new(InfraConfig::default());
    app.pipeline.arm_image_project.environment.architecture = Architecture::X86_64;
    assert!(matches!(app.validate_wiring(), Err(Error::WiringError(_))));
}

#[test]
fn deploy_of_another_file_is_a_wiring_error() {
    let mut app = App::new(InfraConfig::default());
    app.compute.name = String::from("RenamedComputeStack");
    assert!(matches!(app.validate_wiring(), Err(Error::WiringError(_))));
}

#[test]
fn assembly_writes_one_file_per_stack() {
    let app = App::new(InfraConfig::default());
    let assembly = app
        .synthesize(&tags(), TagResolution::Resolved, &[])
        .unwrap();
    let dir = scratch_dir("assembly");
    let written = assembly.write_to(&dir).unwrap();
    assert_eq!(written.len(), 5);
    assert_eq!(
        written[3].file_name().unwrap().to_str(),
        Some("CdkArmCodebuildLambdaStack.template.json")
    );

    let content = fs::read_to_string(&written[3]).unwrap();
    let reparsed = Template::parse(&content).unwrap();
    assert_eq!(&reparsed, assembly.template("CdkArmCodebuildLambdaStack").unwrap());
    fs::remove_dir_all(&dir).unwrap();
}
