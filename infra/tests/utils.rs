// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use lambda_infra::utils;
use lambda_infra::utils::reader::Reader;
use lambda_infra::utils::writer::Writer;

#[non_exhaustive]
pub struct StatusCode;

const INFRA_TEST_APP_NAME: &str = "lambda-infra-test";

#[allow(dead_code)]
impl StatusCode {
    pub const SUCCESS: i32 = 0;
    pub const DIFFERENCES: i32 = 1;
    pub const ERROR: i32 = 5;
    pub const COMMAND_MAPPING_ERROR: i32 = -2;
}

#[allow(dead_code)]
pub fn read_from_resource_file(path: &str) -> String {
    let mut content = String::new();
    let mut reader = BufReader::new(File::open(get_full_path_for_resource_file(path)).unwrap());
    reader.read_to_string(&mut content).unwrap();
    content
}

pub fn get_full_path_for_resource_file(path: &str) -> String {
    let mut resource = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    resource.push(path);
    resource.display().to_string()
}

/// A fresh directory under the system temp dir, unique per test name.
#[allow(dead_code)]
pub fn scratch_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{}-{}-{}", INFRA_TEST_APP_NAME, name, std::process::id()));
    let _ = std::fs::remove_dir_all(&path);
    let _ = std::fs::remove_file(&path);
    path
}

pub trait CommandTestRunner {
    fn build_args(&self) -> Vec<String>;

    fn run(&self, writer: &mut Writer, reader: &mut Reader) -> i32 {
        let mut app = clap::Command::new(INFRA_TEST_APP_NAME);

        let command_options = self.build_args().into_iter().fold(
            vec![String::from(INFRA_TEST_APP_NAME)],
            |mut res, arg| {
                res.push(arg);
                res
            },
        );

        let commands = utils::get_infra_commands();
        let mappings = commands
            .iter()
            .map(|command| (command.name(), command.as_ref()))
            .collect::<HashMap<_, _>>();

        for each in &commands {
            app = app.subcommand(each.command());
        }

        let app = app.get_matches_from(command_options);

        match app.subcommand() {
            Some((name, value)) => match mappings.get(name) {
                Some(command) => match command.execute(value, writer, reader) {
                    Err(e) => {
                        writer
                            .write_err(format!("Error occurred {e}"))
                            .expect("failed to write to stderr");
                        StatusCode::ERROR
                    }
                    Ok(code) => code,
                },
                None => StatusCode::COMMAND_MAPPING_ERROR,
            },
            None => StatusCode::COMMAND_MAPPING_ERROR,
        }
    }
}
