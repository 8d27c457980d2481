// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::config::InfraConfig;
use crate::constructs::apigateway::{ApiEntry, RestApi};
use crate::constructs::lambda::ComputeFunction;
use crate::errors::Result;
use crate::template::Template;

/// REST entry point with one `GET` resource per compute function. Lives
/// inside the compute stack's template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiStack {
    pub rest_api: RestApi,
}

impl ApiStack {
    pub fn new(config: &InfraConfig, x86: &ComputeFunction, arm: &ComputeFunction) -> Self {
        let mut rest_api = RestApi::new("RestApiGatewayArmLambda", &config.api_name);
        rest_api
            .add_entry(ApiEntry::get(&config.x86.path_part, x86))
            .add_entry(ApiEntry::get(&config.arm.path_part, arm));
        ApiStack { rest_api }
    }

    pub fn add_to(&self, template: &mut Template) -> Result<()> {
        self.rest_api.add_to(template)
    }
}
