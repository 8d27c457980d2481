// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0
pub(crate) mod utils;

#[cfg(test)]
mod completions_tests {
    use lambda_infra::commands::{COMPLETIONS, LOCATION, SHELL};
    use lambda_infra::utils::reader::Reader;
    use lambda_infra::utils::writer::Writer;
    use pretty_assertions::assert_eq;

    use crate::utils::{get_full_path_for_resource_file, CommandTestRunner, StatusCode};

    struct CompletionsTestRunner<'args> {
        shell: &'args str,
        location: Option<&'args str>,
    }

    impl<'args> CommandTestRunner for CompletionsTestRunner<'args> {
        fn build_args(&self) -> Vec<String> {
            let mut args = vec![
                String::from(COMPLETIONS),
                format!("--{}", SHELL.0),
                self.shell.to_string(),
            ];
            if let Some(location) = self.location {
                args.push(format!("-{}", LOCATION.1));
                args.push(get_full_path_for_resource_file(location));
            }
            args
        }
    }

    #[rstest::rstest]
    #[case("bash")]
    #[case("zsh")]
    #[case("fish")]
    fn test_completions_to_stdout(#[case] shell: &str) {
        let mut reader = Reader::default();
        let mut writer = Writer::default();
        let status_code = CompletionsTestRunner {
            shell,
            location: None,
        }
        .run(&mut writer, &mut reader);

        assert_eq!(StatusCode::SUCCESS, status_code);
        let script = writer.stripped().unwrap();
        assert!(script.contains("lambda-infra"));
        assert!(script.contains("put-parameter"));
    }

    #[test]
    fn test_completions_location_must_be_a_directory() {
        let mut reader = Reader::default();
        let mut writer = Writer::default();
        let status_code = CompletionsTestRunner {
            shell: "bash",
            location: Some("resources/parameters/tags.yaml"),
        }
        .run(&mut writer, &mut reader);

        assert_eq!(StatusCode::ERROR, status_code);
        assert!(writer.err_to_stripped().unwrap().contains("tags.yaml"));
    }
}
