// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

pub mod diff;
pub mod intrinsics;

use crate::errors::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_yaml::value::{Mapping, TaggedValue, Value as YamlValue};

/// A CloudFormation template. Sections keep declaration order so that two
/// synthesis runs over the same declarations produce byte-identical output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Parameter>,
    #[serde(default)]
    pub resources: IndexMap<String, Resource>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, Output>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,
}

impl Resource {
    pub fn new(resource_type: &str) -> Self {
        Resource {
            resource_type: resource_type.to_string(),
            properties: Map::new(),
            depends_on: vec![],
            update_replace_policy: None,
            deletion_policy: None,
        }
    }

    pub fn property<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    pub fn depends_on(mut self, logical_id: &str) -> Self {
        self.depends_on.push(logical_id.to_string());
        self
    }

    /// Sets both the update-replace and deletion policy to `Retain`.
    pub fn retained(mut self) -> Self {
        self.update_replace_policy = Some(String::from("Retain"));
        self.deletion_policy = Some(String::from("Retain"));
        self
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.properties.get(property)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub parameter_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Template {
    pub fn new(description: Option<&str>) -> Self {
        Template {
            description: description.map(String::from),
            ..Default::default()
        }
    }

    pub fn add_resource(&mut self, logical_id: &str, resource: Resource) -> Result<()> {
        if self.resources.contains_key(logical_id) {
            return Err(Error::DuplicateLogicalId(logical_id.to_string()));
        }
        self.resources.insert(logical_id.to_string(), resource);
        Ok(())
    }

    /// Parameters may be requested more than once by constructs sharing the
    /// same lookup; identical re-declarations are accepted.
    pub fn add_parameter(&mut self, logical_id: &str, parameter: Parameter) -> Result<()> {
        match self.parameters.get(logical_id) {
            Some(existing) if *existing == parameter => Ok(()),
            Some(_) => Err(Error::DuplicateLogicalId(logical_id.to_string())),
            None => {
                self.parameters.insert(logical_id.to_string(), parameter);
                Ok(())
            }
        }
    }

    pub fn add_output(&mut self, logical_id: &str, output: Output) -> Result<()> {
        if self.outputs.contains_key(logical_id) {
            return Err(Error::DuplicateLogicalId(logical_id.to_string()));
        }
        self.outputs.insert(logical_id.to_string(), output);
        Ok(())
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn resources_of_type<'t>(
        &'t self,
        resource_type: &'t str,
    ) -> impl Iterator<Item = (&'t String, &'t Resource)> + 't {
        self.resources
            .iter()
            .filter(move |(_, resource)| resource.resource_type == resource_type)
    }

    pub fn count_of_type(&self, resource_type: &str) -> usize {
        self.resources_of_type(resource_type).count()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Accepts both JSON and YAML, YAML being a superset. Short-form
    /// intrinsics such as `!Ref` or `!GetAtt` are read as their long form.
    pub fn parse(content: &str) -> Result<Self> {
        match serde_json::from_str::<Template>(content) {
            Ok(template) => Ok(template),
            Err(_) => {
                let value = serde_yaml::from_str::<serde_yaml::Value>(content)?;
                Ok(serde_yaml::from_value::<Template>(expand_short_form(value))?)
            }
        }
    }
}

/// Rewrites YAML tags into the mappings CloudFormation defines them as:
/// `!Ref X` to `{Ref: X}`, `!GetAtt a.b` to `{Fn::GetAtt: [a, b]}` and any
/// other `!Name v` to `{Fn::Name: v}`.
fn expand_short_form(value: YamlValue) -> YamlValue {
    match value {
        YamlValue::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            let tag = tag.to_string();
            let name = tag.trim_start_matches('!');
            let value = expand_short_form(value);
            let (key, value) = match name {
                "Ref" | "Condition" => (name.to_string(), value),
                "GetAtt" => {
                    let value = match value {
                        YamlValue::String(path) => match path.split_once('.') {
                            Some((resource, attribute)) => YamlValue::Sequence(vec![
                                YamlValue::from(resource),
                                YamlValue::from(attribute),
                            ]),
                            None => YamlValue::String(path),
                        },
                        other => other,
                    };
                    (String::from("Fn::GetAtt"), value)
                }
                other => (format!("Fn::{other}"), value),
            };
            let mut mapping = Mapping::new();
            mapping.insert(YamlValue::String(key), value);
            YamlValue::Mapping(mapping)
        }
        YamlValue::Sequence(items) => {
            YamlValue::Sequence(items.into_iter().map(expand_short_form).collect())
        }
        YamlValue::Mapping(mapping) => YamlValue::Mapping(
            mapping
                .into_iter()
                .map(|(key, value)| (key, expand_short_form(value)))
                .collect(),
        ),
        other => other,
    }
}
