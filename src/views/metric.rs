//! Single-metric formatter.

use crate::dom::{Element, Node};

/// One metric as fetched, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    /// Unique within a rendered view; becomes the data marker verbatim.
    pub key: String,
    pub value: String,
    pub human_name: String,
    pub icon: String,
    pub unit: String,
}

impl MetricRecord {
    pub fn new(
        key: impl Into<String>,
        value: impl ToString,
        human_name: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
            human_name: human_name.into(),
            icon: icon.into(),
            unit: String::new(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }
}

/// Surrounding template for a metric. Data handling is identical for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricStyle {
    /// Status grid card.
    Card,
    /// Device detail line.
    Line,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricView {
    style: MetricStyle,
}

impl MetricView {
    pub fn new(style: MetricStyle) -> Self {
        Self { style }
    }

    pub fn card() -> Self {
        Self::new(MetricStyle::Card)
    }

    pub fn line() -> Self {
        Self::new(MetricStyle::Line)
    }

    pub fn render(&self, metric: &MetricRecord) -> Node {
        let icon = Element::new("i").class("material-icons").text(&metric.icon);
        let value = Element::new("span").class("value").text(&metric.value);
        let unit = Element::new("span").class("unit").text(&metric.unit);

        let el = match self.style {
            MetricStyle::Card => Element::new("div")
                .class("col s3 m2 system-metric")
                .marker(&metric.key)
                .child(
                    Element::new("div")
                        .class("top-value")
                        .child(icon)
                        .text(&metric.human_name),
                )
                .child(Element::new("div").class("value").text(&metric.value))
                .child(Element::new("div").class("unit").text(&metric.unit)),
            MetricStyle::Line => Element::new("p")
                .class("device-metric")
                .marker(&metric.key)
                .child(icon)
                .child(value)
                .text(" ")
                .child(unit)
                .text(" ")
                .child(Element::new("span").class("name").text(&metric.human_name)),
        };
        el.into()
    }

    /// Render and insert at the front of `container`.
    pub fn render_into(&self, metric: &MetricRecord, container: &mut Vec<Node>) -> Node {
        let node = self.render(metric);
        container.insert(0, node.clone());
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{find_element, marked_text, DATA_MARKER};

    fn uptime() -> MetricRecord {
        MetricRecord::new("uptime", 120, "Uptime", "timer").with_unit("seconds")
    }

    #[test]
    fn both_styles_carry_every_field_and_the_marker() {
        for view in [MetricView::card(), MetricView::line()] {
            let node = view.render(&uptime());
            let html = node.to_html();

            assert!(html.contains("120"), "{html}");
            assert!(html.contains("Uptime"), "{html}");
            assert!(html.contains("seconds"), "{html}");
            assert!(html.contains("timer"), "{html}");
            assert_eq!(
                node.as_element().and_then(|el| el.get_attr(DATA_MARKER)),
                Some("uptime")
            );
        }
    }

    #[test]
    fn value_slot_holds_only_the_value() {
        for view in [MetricView::card(), MetricView::line()] {
            let nodes = vec![view.render(&uptime())];
            assert_eq!(marked_text(&nodes, "uptime").as_deref(), Some("120"));
        }
    }

    #[test]
    fn unit_defaults_to_empty() {
        let record = MetricRecord::new("connections", 3, "Connections", "link");
        assert_eq!(record.unit, "");

        let nodes = vec![MetricView::card().render(&record)];
        let unit = find_element(&nodes, &|el: &Element| el.has_class("unit")).unwrap();
        assert!(unit.children.is_empty() || unit.text_content().is_empty());
    }

    #[test]
    fn key_is_used_verbatim() {
        let record = MetricRecord::new("Sent Messages/s", 1, "x", "y");
        let node = MetricView::card().render(&record);
        assert_eq!(
            node.as_element().and_then(|el| el.get_attr(DATA_MARKER)),
            Some("Sent Messages/s")
        );
    }

    #[test]
    fn render_into_prepends() {
        let mut container = vec![Node::text("existing")];
        MetricView::line().render_into(&uptime(), &mut container);

        assert_eq!(container.len(), 2);
        assert!(matches!(container[0], Node::Element(_)));
        assert_eq!(container[1], Node::text("existing"));
    }
}
