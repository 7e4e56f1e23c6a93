use crate::handler::{Page, PageState};
use crate::types::{Observation, PredictionResult, Verdict, DAY_RANGE, HOUR_RANGE, MONTH_RANGE};

pub const PAGE_TITLE: &str = "Hurricane Prediction Center";
pub const BACKGROUND_ROUTE: &str = "/background.jpg";
pub const RESULT_SECTION_ID: &str = "result";

// Any edit drops the shown result; only the button brings one back.
const CLEAR_RESULT_ON_INPUT: &str =
    "var r = document.getElementById('result'); if (r) { r.remove(); }";

/// What the page chrome needs to know besides the handler's output.
#[derive(Debug, Clone, Default)]
pub struct Chrome {
    pub has_background: bool,
    pub warning: Option<String>,
}

pub fn page(page: &Page, chrome: &Chrome) -> String {
    let warning = chrome
        .warning
        .as_ref()
        .map(|w| format!(r#"<div class="warning">⚠️ {}</div>"#, escape(w)))
        .unwrap_or_default();

    let result = match &page.state {
        PageState::Idle => String::new(),
        PageState::ResultShown(r) => format!(
            "<section id=\"{}\">\n<hr>\n{}\n</section>",
            RESULT_SECTION_ID,
            panel(r)
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="icon" href="data:image/svg+xml,<svg xmlns=%22http://www.w3.org/2000/svg%22 viewBox=%220 0 100 100%22><text y=%22.9em%22 font-size=%2290%22>🌪️</text></svg>">
<style>
{style}
</style>
</head>
<body>
<main class="block-container">
{warning}
<h1>🌪️ HURRICANE WARNING SYSTEM</h1>
<h3>Meteorological Analysis Terminal</h3>
<hr>
{form}
{result}
</main>
</body>
</html>
"#,
        title = PAGE_TITLE,
        style = style(chrome.has_background),
        warning = warning,
        form = form(&page.observation),
        result = result,
    )
}

fn style(has_background: bool) -> String {
    let backdrop = if has_background {
        format!(
            "body {{ background: url({}); background-size: cover; background-position: center; \
             background-repeat: no-repeat; background-attachment: fixed; }}\n",
            BACKGROUND_ROUTE
        )
    } else {
        String::new()
    };

    format!(
        "{backdrop}\
body {{ font-family: sans-serif; margin: 0; background-color: #0e1117; }}
.block-container {{ max-width: 730px; margin: 50px auto; padding: 3rem; border-radius: 15px; background-color: rgba(0, 0, 0, 0.65); }}
h1, h2, h3, h4, p, label {{ color: white !important; }}
label {{ display: block; font-weight: bold; font-size: 16px; margin-top: 1rem; }}
input {{ width: 100%; box-sizing: border-box; }}
.columns {{ display: flex; gap: 2rem; }}
.columns > div {{ flex: 1; }}
.warning {{ background-color: rgba(255, 193, 7, 0.2); color: #ffd54f; padding: 1rem; border-radius: 5px; }}
button {{ background-color: #ff4b4b; color: white; font-weight: bold; border: none; border-radius: 5px; height: 3em; width: 100%; margin-top: 2rem; cursor: pointer; }}
button:hover {{ background-color: #ff3333; }}"
    )
}

fn form(obs: &Observation) -> String {
    format!(
        r#"<form method="post" action="/predict" oninput="{clear}">
<div class="columns">
<div>
<h4>📅 Temporal Data</h4>
{year}
{month}
{day}
{hour}
</div>
<div>
<h4>🧭 Geospatial &amp; Physics</h4>
{lat}
{long}
{pressure}
{diameter}
</div>
</div>
<button type="submit">RUN PREDICTION MODEL</button>
</form>"#,
        clear = CLEAR_RESULT_ON_INPUT,
        year = number_input("year", "Year", &obs.year.to_string(), "1", None),
        month = range_input("month", "Month", obs.month, MONTH_RANGE),
        day = range_input("day", "Day", obs.day, DAY_RANGE),
        hour = range_input("hour", "Hour (UTC)", obs.hour, HOUR_RANGE),
        lat = number_input("lat", "Latitude", &format!("{:.2}", obs.lat), "0.01", None),
        long = number_input("long", "Longitude", &format!("{:.2}", obs.long), "0.01", None),
        pressure = number_input(
            "pressure",
            "Pressure (mb)",
            &obs.pressure.to_string(),
            "1",
            Some("Lower pressure = Stronger storm"),
        ),
        diameter = number_input(
            "tropicalstorm_force_diameter",
            "Storm Diameter (nm)",
            &decimal(obs.tropicalstorm_force_diameter),
            "any",
            None,
        ),
    )
}

fn number_input(name: &str, label: &str, value: &str, step: &str, help: Option<&str>) -> String {
    let title = help
        .map(|h| format!(r#" title="{}""#, escape(h)))
        .unwrap_or_default();
    format!(
        r#"<label for="{name}"{title}>{label}</label><input type="number" id="{name}" name="{name}" value="{value}" step="{step}">"#
    )
}

fn range_input(name: &str, label: &str, value: i32, (min, max): (i32, i32)) -> String {
    format!(
        r#"<label for="{name}">{label}: <output>{value}</output></label><input type="range" id="{name}" name="{name}" min="{min}" max="{max}" step="1" value="{value}" oninput="this.previousElementSibling.lastElementChild.value = this.value">"#
    )
}

/// The result panel. Exactly one per result; the probability shown is
/// always the hurricane (positive-class) probability.
pub fn panel(result: &PredictionResult) -> String {
    let (background, heading, prob_label, note) = match result.verdict {
        Verdict::Hurricane => (
            "rgba(255, 0, 0, 0.8)",
            "🚨 ALERT: HURRICANE DETECTED 🚨",
            "Probability",
            "Conditions indicate high likelihood of hurricane formation.",
        ),
        Verdict::TropicalStorm => (
            "rgba(0, 128, 0, 0.8)",
            "✅ STATUS: TROPICAL STORM",
            "Hurricane Probability",
            "Conditions do not currently meet hurricane criteria.",
        ),
    };

    format!(
        r#"<div class="result {class}" style="background-color: {background}; padding: 20px; border-radius: 10px; text-align: center; border: 2px solid white;">
<h1 style="margin:0; color: white;">{heading}</h1>
<h3 style="color: white;">{prob_label}: {prob}</h3>
<p style="color: white;">{note}</p>
</div>"#,
        class = css_class(result.verdict),
        prob = result.probability_display(),
    )
}

pub fn css_class(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Hurricane => "hurricane",
        Verdict::TropicalStorm => "tropical-storm",
    }
}

/// Whole numbers keep one decimal ("120.0"); anything finer is kept as typed.
fn decimal(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

pub const FAULT_MESSAGE: &str = "The prediction could not be completed.";
pub const BAD_INPUT_MESSAGE: &str = "Every reading must be a finite number.";

/// Minimal error page for aborted renders. Carries no model detail.
pub fn fault(bad_input: bool) -> String {
    let message = if bad_input { BAD_INPUT_MESSAGE } else { FAULT_MESSAGE };
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><title>{}</title></head>\
         <body><h1>Something went wrong</h1><p>{}</p><p><a href=\"/\">Back to the form</a></p></body></html>\n",
        PAGE_TITLE, message
    )
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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
