// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::errors::Error;
use crate::parameters::InMemoryParameterStore;
use crate::stacks::TagResolution;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};

fn tags() -> InMemoryParameterStore {
    InMemoryParameterStore::new()
        .with("X86BuildLambdaImageId", "3f2a9c1")
        .with("ArmBuildLambdaImageTagId", "3f2a9c1-arm")
}

fn synthesize(store: &InMemoryParameterStore, resolution: TagResolution) -> crate::errors::Result<Template> {
    let config = InfraConfig::default();
    let stack = ComputeStack::new(&config);
    stack.synthesize(&SynthContext::new(&config, store, resolution))
}

fn image_uri_tail(template: &Template, function_id: &str) -> Value {
    let uri = &template.resource(function_id).unwrap().get("Code").unwrap()["ImageUri"];
    uri["Fn::Join"][1].as_array().unwrap().last().cloned().unwrap()
}

#[rstest]
#[case("X86LambdaFunction", "x86_64")]
#[case("ArmLambdaFunction", "arm64")]
fn one_function_per_architecture(#[case] function_id: &str, #[case] architecture: &str) {
    let template = synthesize(&tags(), TagResolution::Resolved).unwrap();

    let matching = template
        .resources_of_type("AWS::Lambda::Function")
        .filter(|(_, r)| r.get("Architectures") == Some(&json!([architecture])))
        .collect::<Vec<_>>();
    assert_eq!(matching.len(), 1);

    let (id, function) = matching[0];
    assert_eq!(id, function_id);
    assert_eq!(function.get("FunctionName"), Some(&json!(function_id)));
    assert_eq!(function.get("MemorySize"), Some(&json!(10240)));
    assert_eq!(function.get("Timeout"), Some(&json!(10)));
}

#[test]
fn image_tags_come_from_the_parameter_store() {
    let template = synthesize(&tags(), TagResolution::Resolved).unwrap();
    assert_eq!(
        image_uri_tail(&template, "X86LambdaFunction"),
        json!("/x86-image-for-lambda:3f2a9c1")
    );
    assert_eq!(
        image_uri_tail(&template, "ArmLambdaFunction"),
        json!("/arm-image-for-lambda:3f2a9c1-arm")
    );
    assert!(template.parameters.is_empty());
}

#[test]
fn missing_tag_fails_synthesis() {
    let store = InMemoryParameterStore::new().with("X86BuildLambdaImageId", "3f2a9c1");
    match synthesize(&store, TagResolution::Resolved) {
        Err(Error::MissingParameter(name)) => assert_eq!(name, "ArmBuildLambdaImageTagId"),
        other => panic!("expected a missing parameter, got {other:?}"),
    }
}

#[test]
fn deferred_tags_become_ssm_template_parameters() {
    let template = synthesize(&InMemoryParameterStore::new(), TagResolution::Deferred).unwrap();

    assert_eq!(template.parameters.len(), 2);
    let parameter = &template.parameters["SsmParameterValueX86BuildLambdaImageId"];
    assert_eq!(parameter.parameter_type, "AWS::SSM::Parameter::Value<String>");
    assert_eq!(parameter.default.as_deref(), Some("X86BuildLambdaImageId"));
    assert_eq!(
        image_uri_tail(&template, "X86LambdaFunction"),
        json!({ "Ref": "SsmParameterValueX86BuildLambdaImageId" })
    );
}

#[test]
fn api_has_two_resources_with_one_get_each() {
    let template = synthesize(&tags(), TagResolution::Resolved).unwrap();

    assert_eq!(template.count_of_type("AWS::ApiGateway::RestApi"), 1);
    let (api_id, api) = template.resources_of_type("AWS::ApiGateway::RestApi").next().unwrap();
    assert_eq!(api.get("Name"), Some(&json!("ArmLambdaApi")));

    let mut paths = template
        .resources_of_type("AWS::ApiGateway::Resource")
        .map(|(_, r)| r.get("PathPart").cloned().unwrap())
        .collect::<Vec<_>>();
    paths.sort_by_key(|p| p.to_string());
    assert_eq!(paths, vec![json!("arm-lambda"), json!("x86-lambda")]);

    for (resource_id, _) in template.resources_of_type("AWS::ApiGateway::Resource") {
        let methods = template
            .resources_of_type("AWS::ApiGateway::Method")
            .filter(|(_, m)| m.get("ResourceId") == Some(&json!({ "Ref": resource_id })))
            .collect::<Vec<_>>();
        assert_eq!(methods.len(), 1);
        let method = methods[0].1;
        assert_eq!(method.get("HttpMethod"), Some(&json!("GET")));
        assert_eq!(method.get("RestApiId"), Some(&json!({ "Ref": api_id })));
    }
}

#[test]
fn each_method_proxies_its_own_function() {
    let template = synthesize(&tags(), TagResolution::Resolved).unwrap();
    let method = template.resource("RestApiGatewayArmLambdaArmLambdaGet").unwrap();
    let uri = method.get("Integration").unwrap()["Uri"].to_string();
    assert!(uri.contains("ArmLambdaFunction"));
    assert!(!uri.contains("X86LambdaFunction"));
}

#[test]
fn dashboard_has_header_and_two_graphs_over_both_functions() {
    let template = synthesize(&tags(), TagResolution::Resolved).unwrap();
    assert_eq!(template.count_of_type("AWS::CloudWatch::Dashboard"), 1);

    let (_, dashboard) = template
        .resources_of_type("AWS::CloudWatch::Dashboard")
        .next()
        .unwrap();
    assert_eq!(
        dashboard.get("DashboardName"),
        Some(&json!("Compare-X86-And-Arm-Lambda"))
    );
    let body: Value = serde_json::from_str(
        dashboard.get("DashboardBody").unwrap()["Fn::Sub"]
            .as_str()
            .unwrap(),
    )
    .unwrap();
    let widgets = body["widgets"].as_array().unwrap();

    let texts = widgets.iter().filter(|w| w["type"] == "text").count();
    let graphs = widgets
        .iter()
        .filter(|w| w["type"] == "metric")
        .collect::<Vec<_>>();
    assert_eq!(texts, 1);
    assert_eq!(graphs.len(), 2);

    for graph in graphs {
        let functions = graph["properties"]["metrics"]
            .as_array()
            .unwrap()
            .iter()
            .map(|metric| metric[3].clone())
            .collect::<Vec<_>>();
        assert_eq!(
            functions,
            vec![json!("X86LambdaFunction"), json!("ArmLambdaFunction")]
        );
    }

    let invocations = &widgets[1]["properties"]["metrics"][0][4];
    assert_eq!(invocations, &json!({ "stat": "Sum", "period": 60 }));
    let duration = &widgets[2]["properties"]["metrics"][1][4];
    assert_eq!(duration, &json!({ "stat": "Average", "period": 10 }));
}
