// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use benchmark_lambda::handle_request;
use lambda_runtime::{service_fn, Error};
use log::LevelFilter;
use simple_logger::SimpleLogger;

#[tokio::main]
async fn main() -> Result<(), Error> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .map_err(|e| Error::from(e.to_string()))?;
    lambda_runtime::run(service_fn(handle_request)).await
}
