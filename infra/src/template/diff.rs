// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::template::{Resource, Template};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    Added {
        logical_id: String,
        resource_type: String,
    },
    Removed {
        logical_id: String,
        resource_type: String,
    },
    Modified {
        logical_id: String,
        resource_type: String,
        /// Top-level property names whose values differ, plus `Type`,
        /// `DependsOn` or a policy attribute when those changed.
        changed: Vec<String>,
    },
}

/// Compares the resources of a previously deployed (or previously
/// synthesized) template against a freshly synthesized one. Changes come
/// back ordered: modifications and additions in the order of `proposed`,
/// then removals in the order of `current`.
pub fn diff_templates(current: &Template, proposed: &Template) -> Vec<ResourceChange> {
    let mut changes = Vec::new();

    for (logical_id, resource) in &proposed.resources {
        match current.resources.get(logical_id) {
            None => changes.push(ResourceChange::Added {
                logical_id: logical_id.clone(),
                resource_type: resource.resource_type.clone(),
            }),
            Some(existing) => {
                let changed = changed_attributes(existing, resource);
                if !changed.is_empty() {
                    changes.push(ResourceChange::Modified {
                        logical_id: logical_id.clone(),
                        resource_type: resource.resource_type.clone(),
                        changed,
                    });
                }
            }
        }
    }

    for (logical_id, resource) in &current.resources {
        if !proposed.resources.contains_key(logical_id) {
            changes.push(ResourceChange::Removed {
                logical_id: logical_id.clone(),
                resource_type: resource.resource_type.clone(),
            });
        }
    }

    changes
}

fn changed_attributes(current: &Resource, proposed: &Resource) -> Vec<String> {
    let mut changed = Vec::new();
    if current.resource_type != proposed.resource_type {
        changed.push(String::from("Type"));
    }

    let names = current
        .properties
        .keys()
        .chain(proposed.properties.keys())
        .collect::<BTreeSet<_>>();
    for name in names {
        if current.properties.get(name) != proposed.properties.get(name) {
            changed.push(name.clone());
        }
    }

    if current.depends_on != proposed.depends_on {
        changed.push(String::from("DependsOn"));
    }
    if current.deletion_policy != proposed.deletion_policy {
        changed.push(String::from("DeletionPolicy"));
    }
    if current.update_replace_policy != proposed.update_replace_policy {
        changed.push(String::from("UpdateReplacePolicy"));
    }
    changed
}
