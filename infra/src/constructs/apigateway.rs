// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::constructs::lambda::ComputeFunction;
use crate::errors::Result;
use crate::template::intrinsics::{
    get_att, join, logical_id, partition_arn, reference, ACCOUNT_ID, REGION, URL_SUFFIX,
};
use crate::template::{Output, Resource, Template};
use serde_json::{json, Value};

/// One path below the API root, proxying a single method to a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEntry {
    pub path_part: String,
    pub http_method: String,
    pub target: ComputeFunction,
}

impl ApiEntry {
    pub fn get(path_part: &str, target: &ComputeFunction) -> Self {
        ApiEntry {
            path_part: path_part.to_string(),
            http_method: String::from("GET"),
            target: target.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestApi {
    pub id: String,
    pub name: String,
    pub stage_name: String,
    pub entries: Vec<ApiEntry>,
}

impl RestApi {
    pub fn new(id: &str, name: &str) -> Self {
        RestApi {
            id: id.to_string(),
            name: name.to_string(),
            stage_name: String::from("prod"),
            entries: vec![],
        }
    }

    pub fn add_entry(&mut self, entry: ApiEntry) -> &mut Self {
        self.entries.push(entry);
        self
    }

    pub fn resource_id(&self, entry: &ApiEntry) -> String {
        logical_id(&[&self.id, &entry.path_part])
    }

    pub fn method_id(&self, entry: &ApiEntry) -> String {
        logical_id(&[&self.id, &entry.path_part, &entry.http_method])
    }

    fn deployment_id(&self) -> String {
        format!("{}Deployment", self.id)
    }

    fn stage_id(&self) -> String {
        logical_id(&[&self.id, "DeploymentStage", &self.stage_name])
    }

    pub fn add_to(&self, template: &mut Template) -> Result<()> {
        template.add_resource(
            &self.id,
            Resource::new("AWS::ApiGateway::RestApi").property("Name", self.name.as_str()),
        )?;

        let mut method_ids = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let resource_id = self.resource_id(entry);
            template.add_resource(
                &resource_id,
                Resource::new("AWS::ApiGateway::Resource")
                    .property("ParentId", get_att(&self.id, "RootResourceId"))
                    .property("PathPart", entry.path_part.as_str())
                    .property("RestApiId", reference(&self.id)),
            )?;

            template.add_resource(
                &logical_id(&[&self.method_id(entry), "ApiPermission"]),
                Resource::new("AWS::Lambda::Permission")
                    .property("Action", "lambda:InvokeFunction")
                    .property("FunctionName", entry.target.arn())
                    .property("Principal", "apigateway.amazonaws.com")
                    .property("SourceArn", self.execute_api_arn(entry)),
            )?;

            let method_id = self.method_id(entry);
            template.add_resource(
                &method_id,
                Resource::new("AWS::ApiGateway::Method")
                    .property("AuthorizationType", "NONE")
                    .property("HttpMethod", entry.http_method.as_str())
                    .property(
                        "Integration",
                        json!({
                            "IntegrationHttpMethod": "POST",
                            "Type": "AWS_PROXY",
                            "Uri": self.integration_uri(&entry.target),
                        }),
                    )
                    .property("ResourceId", reference(&resource_id))
                    .property("RestApiId", reference(&self.id)),
            )?;
            method_ids.push(method_id);
        }

        let mut deployment = Resource::new("AWS::ApiGateway::Deployment")
            .property("Description", "Automatically created by the RestApi construct")
            .property("RestApiId", reference(&self.id));
        for method_id in &method_ids {
            deployment = deployment.depends_on(method_id);
        }
        template.add_resource(&self.deployment_id(), deployment)?;

        template.add_resource(
            &self.stage_id(),
            Resource::new("AWS::ApiGateway::Stage")
                .property("DeploymentId", reference(&self.deployment_id()))
                .property("RestApiId", reference(&self.id))
                .property("StageName", self.stage_name.as_str()),
        )?;

        template.add_output(
            &logical_id(&[&self.id, "Endpoint"]),
            Output {
                value: join(
                    "",
                    vec![
                        Value::from("https://"),
                        reference(&self.id),
                        Value::from(".execute-api."),
                        reference(REGION),
                        Value::from("."),
                        reference(URL_SUFFIX),
                        Value::from("/"),
                        reference(&self.stage_id()),
                        Value::from("/"),
                    ],
                ),
                description: Some(format!("Invoke URL of {}", self.name)),
            },
        )
    }

    fn integration_uri(&self, target: &ComputeFunction) -> Value {
        partition_arn(vec![
            Value::from("apigateway:"),
            reference(REGION),
            Value::from(":lambda:path/2015-03-31/functions/"),
            target.arn(),
            Value::from("/invocations"),
        ])
    }

    /// Grants invoke for any stage, so console test calls also work.
    fn execute_api_arn(&self, entry: &ApiEntry) -> Value {
        partition_arn(vec![
            Value::from("execute-api:"),
            reference(REGION),
            Value::from(":"),
            reference(ACCOUNT_ID),
            Value::from(":"),
            reference(&self.id),
            Value::from(format!("/*/{}/{}", entry.http_method, entry.path_part)),
        ])
    }
}
