//! Translation of a script into a k6 JavaScript test file.
//!
//! The output is a self-contained k6 script: `options` carry the VU count,
//! duration and default thresholds, and the default function issues one
//! `http.*` call per step followed by a 2xx status check.

use std::fmt::Write;

use crate::loadtest::model::{Script, Step, TestConfig};

/// Renders `script` as a k6 test using `config.vus` and `config.duration`.
pub fn render(script: &Script, config: &TestConfig) -> String {
    let mut out = format!(
        r#"import http from "k6/http";
import {{ check, sleep }} from "k6";

export const options = {{
  vus: {},
  duration: "{}s",
  thresholds: {{
    http_req_duration: ['p(95)<2000', 'p(99)<5000'],
    http_req_failed: ['rate<0.1'],
  }},
}};

export default function () {{
"#,
        config.vus, config.duration
    );

    for (i, step) in script.steps.iter().enumerate() {
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            r#"
  // Step {}: {} {}
  const res{i} = {};
  check(res{i}, {{
    "status is 2xx": (r) => r.status >= 200 && r.status < 300,
  }});
"#,
            i + 1,
            step.method.to_ascii_uppercase(),
            step.url,
            render_call(step),
        );
    }

    out.push_str("\n  sleep(1);\n}\n");
    out
}

/// The `http.<fn>(...)` expression for one step.
fn render_call(step: &Step) -> String {
    let method = step.method.trim().to_ascii_lowercase();
    let url = js_string(&step.url);
    let params = render_params(step);

    match method.as_str() {
        "get" | "head" | "options" => match params {
            Some(p) => format!("http.{method}({url}, {p})"),
            None => format!("http.{method}({url})"),
        },
        "post" | "put" | "patch" | "delete" => {
            let func = if method == "delete" { "del" } else { method.as_str() };
            let body = step
                .body
                .as_deref()
                .map(js_string)
                .unwrap_or_else(|| "null".to_string());
            match params {
                Some(p) => format!("http.{func}({url}, {body}, {p})"),
                None if step.body.is_some() => format!("http.{func}({url}, {body})"),
                None => format!("http.{func}({url})"),
            }
        },
        _ => {
            let body = step
                .body
                .as_deref()
                .map(js_string)
                .unwrap_or_else(|| "null".to_string());
            let params = params.unwrap_or_else(|| "{}".to_string());
            format!(
                "http.request({}, {url}, {body}, {params})",
                js_string(&step.method.to_ascii_uppercase())
            )
        },
    }
}

/// `{ headers: {...} }` when the step has headers.
fn render_params(step: &Step) -> Option<String> {
    if step.header.is_empty() {
        return None;
    }
    let mut names: Vec<_> = step.header.keys().collect();
    names.sort();
    let entries: Vec<String> = names
        .into_iter()
        .map(|name| format!("{}: {}", js_string(name), js_string(&step.header[name])))
        .collect();
    Some(format!("{{ headers: {{ {} }} }}", entries.join(", ")))
}

/// Quotes a value as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}
