// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::errors::Result;
use crate::template::intrinsics::{partition_arn, reference};
use crate::template::{Resource, Template};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyStatement {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<Value>,
}

impl PolicyStatement {
    pub fn allow(actions: &[&str], resources: Vec<Value>) -> Self {
        PolicyStatement {
            effect: Effect::Allow,
            actions: actions.iter().map(|a| a.to_string()).collect(),
            resources,
        }
    }

    fn to_value(&self) -> Value {
        // A single action or resource is emitted as a scalar, which is how
        // IAM echoes policies back.
        let action = match self.actions.as_slice() {
            [single] => Value::from(single.as_str()),
            many => json!(many),
        };
        let resource = match self.resources.as_slice() {
            [single] => single.clone(),
            many => Value::Array(many.to_vec()),
        };
        json!({
            "Effect": self.effect.as_str(),
            "Action": action,
            "Resource": resource,
        })
    }
}

pub fn policy_document(statements: &[PolicyStatement]) -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": statements.iter().map(PolicyStatement::to_value).collect::<Vec<_>>(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub id: String,
    /// Service principal allowed to assume the role, e.g. `lambda.amazonaws.com`.
    pub assumed_by: String,
    pub managed_policies: Vec<String>,
}

impl Role {
    pub fn new(id: &str, assumed_by: &str) -> Self {
        Role {
            id: id.to_string(),
            assumed_by: assumed_by.to_string(),
            managed_policies: vec![],
        }
    }

    /// Attaches an AWS managed policy by its name below `arn:aws:iam::aws:policy/`.
    pub fn with_managed_policy(mut self, policy: &str) -> Self {
        self.managed_policies.push(policy.to_string());
        self
    }

    pub fn arn(&self) -> Value {
        crate::template::intrinsics::get_att(&self.id, "Arn")
    }

    pub fn add_to(&self, template: &mut Template) -> Result<()> {
        let mut resource = Resource::new("AWS::IAM::Role").property(
            "AssumeRolePolicyDocument",
            json!({
                "Statement": [{
                    "Action": "sts:AssumeRole",
                    "Effect": "Allow",
                    "Principal": { "Service": self.assumed_by },
                }],
                "Version": "2012-10-17",
            }),
        );
        if !self.managed_policies.is_empty() {
            let arns = self
                .managed_policies
                .iter()
                .map(|policy| partition_arn(vec![Value::from(format!("iam::aws:policy/{policy}"))]))
                .collect::<Vec<_>>();
            resource = resource.property("ManagedPolicyArns", arns);
        }
        template.add_resource(&self.id, resource)
    }
}

/// An inline policy attached to one or more roles of the same template.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub id: String,
    pub policy_name: String,
    pub statements: Vec<PolicyStatement>,
    pub role_ids: Vec<String>,
}

impl Policy {
    pub fn new(id: &str, statements: Vec<PolicyStatement>) -> Self {
        Policy {
            id: id.to_string(),
            policy_name: id.to_string(),
            statements,
            role_ids: vec![],
        }
    }

    pub fn attach_to(mut self, role: &Role) -> Self {
        self.role_ids.push(role.id.clone());
        self
    }

    pub fn add_to(&self, template: &mut Template) -> Result<()> {
        let roles = self
            .role_ids
            .iter()
            .map(|id| reference(id))
            .collect::<Vec<_>>();
        template.add_resource(
            &self.id,
            Resource::new("AWS::IAM::Policy")
                .property("PolicyDocument", policy_document(&self.statements))
                .property("PolicyName", self.policy_name.as_str())
                .property("Roles", roles),
        )
    }
}
