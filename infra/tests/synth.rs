// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0
pub(crate) mod utils;

#[cfg(test)]
mod synth_tests {
    use lambda_infra::commands::{CONFIG, DEFER_PARAMETERS, OUTPUT, PARAMETERS, STACK, SYNTH};
    use lambda_infra::utils::reader::Reader;
    use lambda_infra::utils::writer::Writer;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::Value;

    use crate::utils::{get_full_path_for_resource_file, scratch_path, CommandTestRunner, StatusCode};

    #[derive(Default)]
    struct SynthTestRunner<'args> {
        config: Option<&'args str>,
        parameters: Option<&'args str>,
        defer_parameters: bool,
        output: Option<String>,
        stacks: Vec<&'args str>,
    }

    impl<'args> SynthTestRunner<'args> {
        fn config(&'args mut self, arg: Option<&'args str>) -> &'args mut SynthTestRunner {
            self.config = arg;
            self
        }

        fn parameters(&'args mut self, arg: Option<&'args str>) -> &'args mut SynthTestRunner {
            self.parameters = arg;
            self
        }

        fn defer_parameters(&'args mut self, arg: bool) -> &'args mut SynthTestRunner {
            self.defer_parameters = arg;
            self
        }

        fn output(&'args mut self, arg: Option<String>) -> &'args mut SynthTestRunner {
            self.output = arg;
            self
        }

        fn stacks(&'args mut self, args: Vec<&'args str>) -> &'args mut SynthTestRunner {
            self.stacks = args;
            self
        }
    }

    impl<'args> CommandTestRunner for SynthTestRunner<'args> {
        fn build_args(&self) -> Vec<String> {
            let mut args = vec![String::from(SYNTH)];

            if let Some(config) = self.config {
                args.push(format!("-{}", CONFIG.1));
                args.push(get_full_path_for_resource_file(config));
            }

            if let Some(parameters) = self.parameters {
                args.push(format!("-{}", PARAMETERS.1));
                args.push(get_full_path_for_resource_file(parameters));
            }

            if self.defer_parameters {
                args.push(format!("--{DEFER_PARAMETERS}"));
            }

            if let Some(output) = &self.output {
                args.push(format!("-{}", OUTPUT.1));
                args.push(output.clone());
            }

            for stack in &self.stacks {
                args.push(format!("-{}", STACK.1));
                args.push(stack.to_string());
            }

            args
        }
    }

    fn printed_json(writer: &Writer) -> Value {
        serde_json::from_str(&writer.stripped().unwrap()).unwrap()
    }

    #[test]
    fn test_single_stack_prints_bare_template() {
        let mut reader = Reader::default();
        let mut writer = Writer::default();
        let status_code = SynthTestRunner::default()
            .parameters(Some("resources/parameters/tags.yaml"))
            .stacks(vec!["CodeCommitRepository"])
            .run(&mut writer, &mut reader);

        assert_eq!(StatusCode::SUCCESS, status_code);
        let template = printed_json(&writer);
        assert_eq!(
            template["Resources"]["CodeCommitRepository"]["Properties"]["RepositoryName"],
            Value::from("arm-codebuild-lambda")
        );
    }

    #[test]
    fn test_several_stacks_print_keyed_by_name() {
        let mut reader = Reader::default();
        let mut writer = Writer::default();
        let status_code = SynthTestRunner::default()
            .parameters(Some("resources/parameters/tags.yaml"))
            .run(&mut writer, &mut reader);

        assert_eq!(StatusCode::SUCCESS, status_code);
        let assembly = printed_json(&writer);
        let names = assembly
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "CodeCommitRepository",
                "EcrRepository",
                "EcrRepositoryX86",
                "CdkArmCodebuildLambdaStack",
                "CodePipelineStack",
            ]
        );

        let functions = assembly["CdkArmCodebuildLambdaStack"]["Resources"].to_string();
        assert!(functions.contains("/x86-image-for-lambda:9c1e4f2"));
        assert!(functions.contains("/arm-image-for-lambda:5b7d0a3"));
    }

    #[test]
    fn test_output_directory_receives_one_template_per_stack() {
        let output = scratch_path("synth-output");
        let mut reader = Reader::default();
        let mut writer = Writer::default();
        let status_code = SynthTestRunner::default()
            .parameters(Some("resources/parameters/tags.yaml"))
            .output(Some(output.display().to_string()))
            .run(&mut writer, &mut reader);

        assert_eq!(StatusCode::SUCCESS, status_code);
        let printed = writer.stripped().unwrap();
        assert_eq!(printed.lines().count(), 5);
        for line in printed.lines() {
            assert!(line.ends_with(".template.json"));
            assert!(std::path::Path::new(line).exists());
        }
        assert!(output.join("CodePipelineStack.template.json").exists());
        std::fs::remove_dir_all(&output).unwrap();
    }

    #[rstest]
    #[case(Some("resources/parameters/arm-tag-missing.json"), "ArmBuildLambdaImageTagId")]
    #[case(Some("resources/parameters/does-not-exist.json"), "does-not-exist.json")]
    fn test_unresolvable_tags_fail(#[case] parameters: Option<&str>, #[case] mentioned: &str) {
        let mut reader = Reader::default();
        let mut writer = Writer::default();
        let status_code = SynthTestRunner::default()
            .parameters(parameters)
            .run(&mut writer, &mut reader);

        assert_eq!(StatusCode::ERROR, status_code);
        assert_eq!(writer.stripped().unwrap(), "");
        assert!(writer.err_to_stripped().unwrap().contains(mentioned));
    }

    #[test]
    fn test_deferred_tags_become_ssm_parameters() {
        let mut reader = Reader::default();
        let mut writer = Writer::default();
        let status_code = SynthTestRunner::default()
            .defer_parameters(true)
            .stacks(vec!["CdkArmCodebuildLambdaStack"])
            .run(&mut writer, &mut reader);

        assert_eq!(StatusCode::SUCCESS, status_code);
        let template = printed_json(&writer);
        let parameters = template["Parameters"].as_object().unwrap();
        assert_eq!(parameters.len(), 2);
        let mut defaults = parameters
            .values()
            .map(|parameter| {
                assert_eq!(parameter["Type"], Value::from("AWS::SSM::Parameter::Value<String>"));
                parameter["Default"].as_str().unwrap().to_string()
            })
            .collect::<Vec<_>>();
        defaults.sort();
        assert_eq!(defaults, vec!["ArmBuildLambdaImageTagId", "X86BuildLambdaImageId"]);
    }

    #[test]
    fn test_config_overrides_reach_the_pipeline() {
        let mut reader = Reader::default();
        let mut writer = Writer::default();
        let status_code = SynthTestRunner::default()
            .config(Some("resources/config/frankfurt.yaml"))
            .stacks(vec!["CodePipelineStack"])
            .run(&mut writer, &mut reader);

        assert_eq!(StatusCode::SUCCESS, status_code);
        let printed = writer.stripped().unwrap();
        assert!(printed.contains("${ACCOUNT_ID}.dkr.ecr.eu-central-1.amazonaws.com"));
        assert!(printed.contains("\"111122223333\""));
        assert!(printed.contains("graviton-benchmark"));
        assert!(printed.contains("\"main\""));
    }

    #[rstest]
    #[case(Some("resources/config/shared-tag-parameter.yaml"), vec![])]
    #[case(None, vec!["NoSuchStack"])]
    fn test_invalid_app_fails(#[case] config: Option<&str>, #[case] stacks: Vec<&str>) {
        let mut reader = Reader::default();
        let mut writer = Writer::default();
        let status_code = SynthTestRunner::default()
            .config(config)
            .parameters(Some("resources/parameters/tags.yaml"))
            .stacks(stacks)
            .run(&mut writer, &mut reader);

        assert_eq!(StatusCode::ERROR, status_code);
        assert!(writer.err_to_stripped().unwrap().starts_with("Error occurred"));
    }
}
