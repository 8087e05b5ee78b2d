//! Static HTML bubble chart of the topics an event's participants follow.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use meetup_graph::TopicCount;

use crate::traits::GraphStore;

/// Topics must be reached by more than this many participant paths to be charted.
pub const TOPIC_COUNT_THRESHOLD: i64 = 5;

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Serialize the data array for embedding in a `<script>` block. JSON takes
/// care of quotes and backslashes; `</` and `<!--` are the two sequences that
/// can still end or confuse the script element.
fn script_json(topics: &[TopicCount]) -> Result<String> {
    let json = serde_json::to_string(topics).context("Failed to serialize topic counts")?;
    Ok(json.replace("</", "<\\/").replace("<!--", "<\\!--"))
}

pub fn render_topic_chart(event_name: &str, topics: &[TopicCount]) -> Result<String> {
    let title = html_escape(event_name);
    let data = script_json(topics)?;

    Ok(format!(
        r##"<!DOCTYPE html>
<meta charset="utf-8">
<title>{title} - participant topics</title>
<style>
text {{
    font: 10px sans-serif;
}}
</style>
<body>
<h1>{title}</h1>
<script src="https://d3js.org/d3.v3.min.js"></script>
<script>
var diameter = 960,
    format = d3.format(",d"),
    color = d3.scale.category20c();

var bubble = d3.layout.pack()
    .sort(null)
    .size([diameter, diameter])
    .padding(1.5);

var svg = d3.select("body").append("svg")
    .attr("width", diameter)
    .attr("height", diameter)
    .attr("class", "bubble");

var data = {data};

var root = {{name: "interests", children: data}};

var node = svg.selectAll(".node")
    .data(bubble.nodes(classes(root)).filter(function(d) {{ return !d.children; }}))
  .enter().append("g")
    .attr("class", "node")
    .attr("transform", function(d) {{ return "translate(" + d.x + "," + d.y + ")"; }});

node.append("title")
    .text(function(d) {{ return d.className + ": " + format(d.value); }});

node.append("circle")
    .attr("r", function(d) {{ return d.r; }})
    .style("fill", function(d) {{ return color(d.className); }});

node.append("text")
    .attr("dy", ".3em")
    .style("text-anchor", "middle")
    .text(function(d) {{ return d.className.substring(0, d.r / 3); }});

// Flatten the hierarchy into its leaf topics.
function classes(root) {{
    var classes = [];
    root.children.forEach(function(child) {{
        classes.push({{className: child.topic, value: child.count}});
    }});
    return {{children: classes}};
}}

d3.select(self.frameElement).style("height", diameter + "px");
</script>
</body>
"##
    ))
}

/// Query the topic aggregate for `event_id`, render it and overwrite `path`.
/// Returns how many topics were charted.
pub async fn write_topic_chart(
    store: &dyn GraphStore,
    event_id: &str,
    event_name: &str,
    path: &Path,
) -> Result<usize> {
    let topics = store
        .topic_popularity(event_id, TOPIC_COUNT_THRESHOLD)
        .await
        .with_context(|| format!("Failed to query topic popularity for event {event_id}"))?;

    let html = render_topic_chart(event_name, &topics)?;
    std::fs::write(path, html)
        .with_context(|| format!("Failed to write chart to {}", path.display()))?;

    info!(path = %path.display(), topics = topics.len(), "Topic chart written");
    Ok(topics.len())
}
