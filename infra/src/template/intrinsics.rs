// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Builders for the CloudFormation intrinsic functions and pseudo parameters
//! the stacks reference.

use serde_json::{json, Value};

pub const ACCOUNT_ID: &str = "AWS::AccountId";
pub const REGION: &str = "AWS::Region";
pub const PARTITION: &str = "AWS::Partition";
pub const URL_SUFFIX: &str = "AWS::URLSuffix";

pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

/// `Fn::Join` with adjacent literal strings merged, so the emitted template
/// stays as small as the one CloudFormation would echo back.
pub fn join(delimiter: &str, parts: Vec<Value>) -> Value {
    let mut merged: Vec<Value> = Vec::with_capacity(parts.len());
    for part in parts {
        match (merged.last_mut(), &part) {
            (Some(Value::String(prev)), Value::String(next)) if delimiter.is_empty() => {
                prev.push_str(next)
            }
            _ => merged.push(part),
        }
    }
    json!({ "Fn::Join": [delimiter, merged] })
}

pub fn sub(template: &str) -> Value {
    json!({ "Fn::Sub": template })
}

/// `arn:${AWS::Partition}:<rest...>`
pub fn partition_arn(rest: Vec<Value>) -> Value {
    let mut parts = vec![Value::from("arn:"), reference(PARTITION), Value::from(":")];
    parts.extend(rest);
    join("", parts)
}

/// Strips everything CloudFormation does not accept in a logical id and
/// concatenates the pieces in CamelCase.
pub fn logical_id(parts: &[&str]) -> String {
    use heck::CamelCase;

    parts
        .iter()
        .map(|part| part.to_camel_case())
        .collect::<String>()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}
