// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::errors::Result;
use crate::template::intrinsics::sub;
use crate::template::{Resource, Template};
use serde_json::{json, Value};

pub const FULL_WIDTH: u32 = 24;
const DEFAULT_GRAPH_HEIGHT: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Sum,
    Average,
}

impl Statistic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Sum => "Sum",
            Statistic::Average => "Average",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<(String, String)>,
    pub statistic: Statistic,
    pub period_seconds: u32,
}

impl Metric {
    pub fn lambda(metric_name: &str, function_name: &str, statistic: Statistic, period_seconds: u32) -> Self {
        Metric {
            namespace: String::from("AWS/Lambda"),
            metric_name: metric_name.to_string(),
            dimensions: vec![(String::from("FunctionName"), function_name.to_string())],
            statistic,
            period_seconds,
        }
    }

    /// `[namespace, metric, dim, value, ..., {stat, period}]`, the dashboard
    /// body's metric array form.
    fn to_value(&self) -> Value {
        let mut row = vec![
            Value::from(self.namespace.as_str()),
            Value::from(self.metric_name.as_str()),
        ];
        for (name, value) in &self.dimensions {
            row.push(Value::from(name.as_str()));
            row.push(Value::from(value.as_str()));
        }
        row.push(json!({ "stat": self.statistic.as_str(), "period": self.period_seconds }));
        Value::Array(row)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardWidget {
    Text {
        markdown: String,
        width: u32,
        height: u32,
    },
    Graph {
        title: String,
        left: Vec<Metric>,
        width: u32,
        height: u32,
    },
}

impl DashboardWidget {
    pub fn text(markdown: &str, width: u32, height: u32) -> Self {
        DashboardWidget::Text {
            markdown: markdown.to_string(),
            width,
            height,
        }
    }

    pub fn graph(title: &str, left: Vec<Metric>, width: u32) -> Self {
        DashboardWidget::Graph {
            title: title.to_string(),
            left,
            width,
            height: DEFAULT_GRAPH_HEIGHT,
        }
    }

    fn height(&self) -> u32 {
        match self {
            DashboardWidget::Text { height, .. } | DashboardWidget::Graph { height, .. } => *height,
        }
    }

    fn to_value(&self, y: u32) -> Value {
        match self {
            DashboardWidget::Text {
                markdown,
                width,
                height,
            } => json!({
                "type": "text",
                "width": width,
                "height": height,
                "x": 0,
                "y": y,
                "properties": { "markdown": markdown },
            }),
            DashboardWidget::Graph {
                title,
                left,
                width,
                height,
            } => json!({
                "type": "metric",
                "width": width,
                "height": height,
                "x": 0,
                "y": y,
                "properties": {
                    "view": "timeSeries",
                    "title": title,
                    "region": "${AWS::Region}",
                    "metrics": left.iter().map(Metric::to_value).collect::<Vec<_>>(),
                    "yAxis": {},
                },
            }),
        }
    }
}

/// Widgets are laid out one per row, each starting at x = 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub id: String,
    pub dashboard_name: String,
    pub widgets: Vec<DashboardWidget>,
}

impl Dashboard {
    pub fn new(id: &str, dashboard_name: &str) -> Self {
        Dashboard {
            id: id.to_string(),
            dashboard_name: dashboard_name.to_string(),
            widgets: vec![],
        }
    }

    pub fn add_widget(&mut self, widget: DashboardWidget) -> &mut Self {
        self.widgets.push(widget);
        self
    }

    pub fn body(&self) -> Value {
        let mut y = 0;
        let mut widgets = Vec::with_capacity(self.widgets.len());
        for widget in &self.widgets {
            widgets.push(widget.to_value(y));
            y += widget.height();
        }
        json!({ "widgets": widgets })
    }

    pub fn add_to(&self, template: &mut Template) -> Result<()> {
        let body = serde_json::to_string(&self.body())?;
        template.add_resource(
            &self.id,
            Resource::new("AWS::CloudWatch::Dashboard")
                .property("DashboardBody", sub(&body))
                .property("DashboardName", self.dashboard_name.as_str()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn widgets_stack_vertically() {
        let mut dashboard = Dashboard::new("Board", "board");
        dashboard
            .add_widget(DashboardWidget::text("# Title", FULL_WIDTH, 1))
            .add_widget(DashboardWidget::graph(
                "Invocations",
                vec![Metric::lambda("Invocations", "Fn", Statistic::Sum, 60)],
                FULL_WIDTH,
            ));

        let body = dashboard.body();
        assert_eq!(body["widgets"][0]["y"], json!(0));
        assert_eq!(body["widgets"][1]["y"], json!(1));
        assert_eq!(
            body["widgets"][1]["properties"]["metrics"],
            json!([["AWS/Lambda", "Invocations", "FunctionName", "Fn", { "stat": "Sum", "period": 60 }]])
        );
    }

    #[test]
    fn body_is_substituted_for_region() {
        let dashboard = Dashboard::new("Board", "board");
        let mut template = Template::new(None);
        dashboard.add_to(&mut template).unwrap();
        let resource = template.resource("Board").unwrap();
        assert_eq!(
            resource.get("DashboardBody"),
            Some(&json!({ "Fn::Sub": "{\"widgets\":[]}" }))
        );
    }
}
