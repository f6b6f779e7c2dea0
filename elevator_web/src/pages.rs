//! Server-rendered HTML pages. The game page is driven by
//! `/static/js/game.js` against the JSON API.

use elevator_core::RunSummary;
use std::fmt::Write;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>.hidden{{display:none}}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn index() -> String {
    layout(
        "Elevator Alignment",
        r#"<main>
<h1>Elevator Alignment</h1>
<p>A few floors, a few awkward moments. Nobody is judging you. Probably.</p>
<form method="post" action="/start">
<button type="submit">Step inside</button>
</form>
</main>"#,
    )
}

pub fn game() -> String {
    layout(
        "Going up",
        r#"<main>
<div id="scenario-progress"><div id="scenario-progress-fill"></div></div>
<section id="scenario-card" class="hidden">
<img id="scenario-image" class="hidden" alt="">
<h2 id="scenario-title"></h2>
<p id="scenario-description"></p>
<div id="scenario-options"></div>
</section>
<section id="consequence-card" class="hidden">
<img id="consequence-image" class="hidden" alt="">
<h2 id="consequence-title"></h2>
<p id="consequence-text"></p>
<button id="consequence-next" type="button"></button>
</section>
</main>
<script src="/static/js/game.js"></script>"#,
    )
}

pub fn error(message: &str) -> String {
    let body = format!(
        "<main>\n<h1>Out of service</h1>\n<p id=\"error\">{}</p>\n<form method=\"post\" action=\"/start\">\n<button type=\"submit\">Start a new ride</button>\n</form>\n</main>",
        escape(message)
    );
    layout("Out of service", &body)
}

/// Format a share for display. Absent data is shown as such, never as 0%.
pub fn format_percent(percent: Option<f64>) -> String {
    match percent {
        Some(p) => format!("{p:.1}% of riders chose the same"),
        None => "No one else has been here yet".to_string(),
    }
}

pub fn summary(summary: &RunSummary) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "<main>\n<h1>Top floor</h1>\n<h2 id=\"alignment\">{}</h2>",
        escape(summary.alignment_label)
    );
    let _ = writeln!(
        body,
        "<ul id=\"scores\">\n<li>Charisma: {}</li>\n<li>Karma: {}</li>\n<li>Weird: {}</li>\n</ul>",
        summary.scores.charisma, summary.scores.karma, summary.scores.weird
    );

    body.push_str("<ol id=\"choices\">\n");
    for entry in &summary.entries {
        let _ = writeln!(
            body,
            "<li><h3>{}</h3><p>{}</p><p>You: {}</p><p>{}</p></li>",
            escape(&entry.scenario_title),
            escape(&entry.scenario_description),
            escape(&entry.option_text),
            format_percent(entry.player_percent),
        );
    }
    body.push_str("</ol>\n<form method=\"post\" action=\"/start\">\n<button type=\"submit\">Ride again</button>\n</form>\n</main>");

    layout("Your elevator alignment", &body)
}
