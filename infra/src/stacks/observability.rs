// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::config::InfraConfig;
use crate::constructs::cloudwatch::{Dashboard, DashboardWidget, Metric, Statistic, FULL_WIDTH};
use crate::constructs::lambda::ComputeFunction;
use crate::errors::Result;
use crate::template::Template;

pub const HEADER_MARKDOWN: &str = "Dashboard X86 And Arm Lambda";
pub const INVOCATIONS_TITLE: &str = "Number of Invocation";
pub const DURATION_TITLE: &str = "Duration Running Time";

/// Side-by-side invocation count and duration of both functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityStack {
    pub dashboard: Dashboard,
}

impl ObservabilityStack {
    pub fn new(config: &InfraConfig, functions: &[&ComputeFunction]) -> Self {
        let invocations = functions
            .iter()
            .map(|f| Metric::lambda("Invocations", &f.function_name, Statistic::Sum, 60))
            .collect();
        let duration = functions
            .iter()
            .map(|f| Metric::lambda("Duration", &f.function_name, Statistic::Average, 10))
            .collect();

        let mut dashboard = Dashboard::new("ArmAndX86Peformance", &config.dashboard_name);
        dashboard
            .add_widget(DashboardWidget::text(HEADER_MARKDOWN, FULL_WIDTH, 1))
            .add_widget(DashboardWidget::graph(INVOCATIONS_TITLE, invocations, FULL_WIDTH))
            .add_widget(DashboardWidget::graph(DURATION_TITLE, duration, FULL_WIDTH));
        ObservabilityStack { dashboard }
    }

    pub fn add_to(&self, template: &mut Template) -> Result<()> {
        self.dashboard.add_to(template)
    }
}
