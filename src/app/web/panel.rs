//! API 面板渲染

use crate::core::rpc::{ProcedureKind, ProcedureMeta};

pub fn render_panel(title: &str, base_path: &str, procedures: &[ProcedureMeta]) -> String {
    let mut rows = String::new();
    for meta in procedures {
        let (badge, how) = match meta.kind {
            ProcedureKind::Query => ("query", format!("GET {}/{}?input=...", base_path, meta.path)),
            ProcedureKind::Mutation => ("mutation", format!("POST {}/{}", base_path, meta.path)),
        };
        rows.push_str(&format!(
            "<tr><td><code>{}</code></td><td class=\"{}\">{}</td><td><code>{}</code></td><td>{}</td></tr>\n",
            escape_html(meta.path),
            badge,
            badge,
            escape_html(&how),
            escape_html(meta.description),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 2rem; color: #1f2937; }}
table {{ border-collapse: collapse; width: 100%; }}
td, th {{ border-bottom: 1px solid #e5e7eb; padding: .5rem; text-align: left; }}
.query {{ color: #2563eb; }}
.mutation {{ color: #b45309; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p>Interactive RPC API documentation. Procedures are served under <code>{base}</code>.</p>
<table>
<thead><tr><th>Procedure</th><th>Kind</th><th>Call</th><th>Description</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
</body>
</html>
"#,
        title = escape_html(title),
        base = escape_html(base_path),
        rows = rows,
    )
}

fn escape_html(text: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_lists_procedures() {
        let procedures = [ProcedureMeta {
            path: "user.getAll",
            kind: ProcedureKind::Query,
            description: "List <all> users",
        }];
        let html = render_panel("Demo", "/api/trpc", &procedures);
        assert!(html.contains("<code>user.getAll</code>"));
        assert!(html.contains("GET /api/trpc/user.getAll?input=..."));
        assert!(html.contains("List &lt;all&gt; users"));
    }
}
