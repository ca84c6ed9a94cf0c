#![forbid(unsafe_code)]

use crate::timefmt::ts_ms_to_display;
use ob_core::{ClientStatus, ClientSummary};
use serde_json::Value;
use std::fmt::Write as _;

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:2rem auto;max-width:64rem;color:#222}\
table{border-collapse:collapse;width:100%}th,td{padding:.4rem .6rem;border-bottom:1px solid #ddd;text-align:left}\
.bar{background:#eee;border-radius:4px;height:.6rem;width:10rem}.bar span{display:block;height:100%;background:#2a7;border-radius:4px}\
ol.steps li.done{color:#2a7}ol.steps li.current{font-weight:bold}";

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Serializes `value` for a `<script>` block; `<` is escaped so payload text
/// can never close the element.
pub(crate) fn script_json(value: &Value) -> String {
    value.to_string().replace('<', "\\u003c")
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

fn status_label(status: ClientStatus) -> &'static str {
    match status {
        ClientStatus::InProgress => "En progreso",
        ClientStatus::Completed => "Completado",
    }
}

pub(crate) fn dashboard(summaries: &[ClientSummary]) -> String {
    let mut body = String::new();
    body.push_str("<h1>Clientes</h1>\n");
    body.push_str(
        "<form method=\"post\" action=\"/cliente/nuevo\"><button type=\"submit\">Nuevo cliente</button></form>\n",
    );

    if summaries.is_empty() {
        body.push_str("<p>No hay clientes todavía.</p>\n");
        return page("Clientes", &body);
    }

    body.push_str(
        "<table>\n<thead><tr><th>Cliente</th><th>Paso</th><th>Progreso</th><th>Estado</th><th>Última actualización</th></tr></thead>\n<tbody>\n",
    );
    for summary in summaries {
        let client = &summary.client;
        let _ = writeln!(
            body,
            "<tr><td><a href=\"/cliente/{slug}\">{name}</a></td><td>{step}/6</td>\
             <td><div class=\"bar\"><span style=\"width:{pct}%\"></span></div>{pct}%</td>\
             <td>{status}</td><td>{updated}</td></tr>",
            slug = escape_html(&client.slug),
            name = escape_html(&client.display_name),
            step = summary.current_step.get(),
            pct = summary.completion_percentage,
            status = status_label(client.status),
            updated = ts_ms_to_display(summary.last_updated_ms),
        );
    }
    body.push_str("</tbody>\n</table>\n");
    page("Clientes", &body)
}

pub(crate) fn not_found_page(requested: &str) -> String {
    let body = format!(
        "<p><a href=\"/\">&larr; Clientes</a></p>\n<h1>Cliente no encontrado</h1>\n\
         <p>La dirección <code>/cliente/{}</code> no corresponde a ningún cliente.</p>\n",
        escape_html(requested)
    );
    page("Cliente no encontrado", &body)
}

/// Wizard page. `data` is the bootstrap object read by the client-side
/// script as `window.formularioData`.
pub(crate) fn form_page(display_name: &str, data: &Value) -> String {
    let current = data["pasoActual"].as_u64().unwrap_or(1);
    let percentage = data["porcentajeCompletado"].as_u64().unwrap_or(0);

    let mut body = String::new();
    let _ = writeln!(body, "<p><a href=\"/\">&larr; Clientes</a></p>");
    let _ = writeln!(body, "<h1>{}</h1>", escape_html(display_name));
    let _ = writeln!(
        body,
        "<div class=\"bar\"><span style=\"width:{percentage}%\"></span></div><p>{percentage}% completado</p>"
    );

    body.push_str("<ol class=\"steps\">\n");
    if let Some(names) = data["stepNames"].as_array() {
        for (index, name) in names.iter().enumerate() {
            let number = index as u64 + 1;
            let class = if number == current {
                " class=\"current\""
            } else if number < current {
                " class=\"done\""
            } else {
                ""
            };
            let _ = writeln!(
                body,
                "<li{class} data-step=\"{number}\">{}</li>",
                escape_html(name.as_str().unwrap_or_default())
            );
        }
    }
    body.push_str("</ol>\n");

    let _ = writeln!(
        body,
        "<script id=\"formulario-data\" type=\"application/json\">{}</script>",
        script_json(data)
    );
    body.push_str(
        "<script>window.formularioData = JSON.parse(document.getElementById('formulario-data').textContent);</script>\n",
    );
    page(display_name, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn embedded_json_cannot_close_script() {
        let data = json!({ "nombre": "</script><script>alert(1)</script>" });
        let encoded = script_json(&data);
        assert!(!encoded.contains("</script>"));
        let decoded: Value = serde_json::from_str(&encoded).expect("still valid json");
        assert_eq!(decoded, data);
    }

    #[test]
    fn form_page_marks_current_step() {
        let data = json!({
            "pasoActual": 2,
            "porcentajeCompletado": 33,
            "stepNames": ["Uno", "Dos", "Tres"],
        });
        let html = form_page("Acme <Corp>", &data);
        assert!(html.contains("<h1>Acme &lt;Corp&gt;</h1>"));
        assert!(html.contains("<li class=\"done\" data-step=\"1\">Uno</li>"));
        assert!(html.contains("<li class=\"current\" data-step=\"2\">Dos</li>"));
        assert!(html.contains("<li data-step=\"3\">Tres</li>"));
        assert!(html.contains("33% completado"));
    }

    #[test]
    fn not_found_page_escapes_requested_path() {
        let html = not_found_page("<x>");
        assert!(html.contains("<h1>Cliente no encontrado</h1>"));
        assert!(html.contains("/cliente/&lt;x&gt;"));
    }
}
