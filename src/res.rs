use axum::response::Html;
use pulldown_cmark::{CowStr, Event, Parser, Tag};
use time::OffsetDateTime;
use tower_sessions::Session;

use crate::{db::User, session, AppResult};

#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

/// Substitutes `{key}` placeholders in a single pass, so substituted values
/// are never scanned for further placeholders. Unknown keys are left as is.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let value = after
            .find('}')
            .map(|close| &after[..close])
            .and_then(|key| vars.iter().find(|(k, _)| *k == key));

        match value {
            Some((key, value)) => {
                out.push_str(value);
                rest = &after[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

pub fn esc(text: &str) -> String {
    html_escape::encode_safe(text).into_owned()
}

/// Message bodies are Markdown. Raw HTML is shown as text and script links are dropped.
pub fn markdown(body: &str) -> String {
    fn scripted(url: &str) -> bool {
        let url = url.trim_start().to_ascii_lowercase();
        url.starts_with("javascript:") || url.starts_with("vbscript:") || url.starts_with("data:")
    }

    let parser = Parser::new(body).map(|event| match event {
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        Event::Start(Tag::Link { link_type, dest_url, title, id }) if scripted(&dest_url) => {
            Event::Start(Tag::Link { link_type, dest_url: CowStr::Borrowed("#"), title, id })
        }
        Event::Start(Tag::Image { link_type, dest_url, title, id }) if scripted(&dest_url) => {
            Event::Start(Tag::Image { link_type, dest_url: CowStr::Borrowed("#"), title, id })
        }
        _ => event,
    });

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    html_output
}

/// Coarse age of a timestamp, e.g. "3 hours".
pub fn since(then: OffsetDateTime) -> String {
    const UNITS: [(i64, &str); 6] = [
        (60 * 60 * 24 * 365, "year"),
        (60 * 60 * 24 * 30, "month"),
        (60 * 60 * 24 * 7, "week"),
        (60 * 60 * 24, "day"),
        (60 * 60, "hour"),
        (60, "minute"),
    ];

    let seconds = (OffsetDateTime::now_utc() - then).whole_seconds().max(0);
    let (count, unit) = UNITS
        .iter()
        .find(|(size, _)| seconds >= *size)
        .map(|(size, unit)| (seconds / size, *unit))
        .unwrap_or((0, "minute"));

    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

pub fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors.iter().map(|e| format!("<li>{}</li>", esc(e))).collect();
    format!(r#"<ul class="errors">{items}</ul>"#)
}

/// Stand-alone 404 page; rendered without the session.
pub fn sorry(what: &str) -> Html<String> {
    Html(fill(include_res!(str, "/pages/sorry.html"), &[("what", &esc(what))]))
}

/// Confirmation step shared by room and message deletion.
pub fn confirm_delete(action: &str, object: &str, back: &str) -> String {
    fill(
        include_res!(str, "/pages/delete.html"),
        &[("action", &esc(action)), ("obj", &esc(object)), ("back", &esc(back))],
    )
}

/// Wraps `content` in the site layout, draining pending flash notices.
pub async fn page(
    session: &Session,
    viewer: Option<&User>,
    title: &str,
    content: &str,
) -> AppResult<Html<String>> {
    let nav = match viewer {
        Some(user) => fill(
            include_res!(str, "/pages/nav_user.html"),
            &[("id", &user.id.to_string()), ("username", &esc(&user.username))],
        ),
        None => include_res!(str, "/pages/nav_anon.html").to_owned(),
    };

    let notices = session::take_flash(session).await?;
    let flash = if notices.is_empty() {
        String::new()
    } else {
        let items: String = notices.iter().map(|n| format!("<li>{}</li>", esc(n))).collect();
        format!(r#"<ul class="flash">{items}</ul>"#)
    };

    Ok(Html(fill(
        include_res!(str, "/pages/layout.html"),
        &[("title", &esc(title)), ("nav", &nav), ("flash", &flash), ("content", content)],
    )))
}
