/// CSV export of post metadata
///
/// Output is a `Title,FileName` header followed by one line per post.
/// Fields containing a comma, quote or line break are quoted (RFC 4180)
/// unless legacy unquoted output is configured, in which case they are
/// written verbatim and such rows cannot be parsed back unambiguously.
use actix_web::{http::header, web, HttpResponse};

use crate::db::PostExport;
use crate::error::Result;
use crate::AppState;

const CSV_HEADER: &str = "Title,FileName\n";

pub async fn export_csv(state: web::Data<AppState>) -> Result<HttpResponse> {
    let rows = state.store.list_exports().await?;
    let export = &state.config.export;
    let body = render_csv(&rows, export.legacy_unquoted);

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.file_name),
        ))
        .body(body))
}

pub fn render_csv(rows: &[PostExport], legacy_unquoted: bool) -> String {
    let mut out = String::from(CSV_HEADER);
    for row in rows {
        push_field(&mut out, &row.title, legacy_unquoted);
        out.push(',');
        push_field(&mut out, &row.file_name, legacy_unquoted);
        out.push('\n');
    }
    out
}

fn push_field(out: &mut String, field: &str, legacy_unquoted: bool) {
    let needs_quotes = field.contains(|c| matches!(c, ',' | '"' | '\r' | '\n'));
    if legacy_unquoted || !needs_quotes {
        out.push_str(field);
        return;
    }

    out.push('"');
    for c in field.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
}
