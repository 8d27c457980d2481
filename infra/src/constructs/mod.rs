// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-shape descriptors, one module per AWS service. Each descriptor
//! knows how to add its resources to a [`Template`](crate::template::Template).

pub mod apigateway;
pub mod cloudwatch;
pub mod codebuild;
pub mod codepipeline;
pub mod iam;
pub mod lambda;
pub mod repository;
