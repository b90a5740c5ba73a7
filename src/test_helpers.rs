use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::api::types::{Member, Page};

pub const WORKSPACE: &str = "ws-1";

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 21, 9, 0, 0).unwrap()
}

/// A page in [`WORKSPACE`] updated `hours` after a fixed base time.
pub fn make_page(id: &str, title: &str, hours: i64) -> Page {
    Page {
        id: id.into(),
        workspace_id: WORKSPACE.into(),
        title: title.into(),
        page_type: "page".into(),
        tags: vec![],
        icon: None,
        updated_at: base_time() + Duration::hours(hours),
    }
}

pub fn make_member(id: &str, display_name: Option<&str>, email: Option<&str>) -> Member {
    Member {
        id: id.into(),
        display_name: display_name.map(String::from),
        email: email.map(String::from),
    }
}

/// Serialized page link the way the editor writes it.
pub fn link_html(id: &str, label: &str) -> String {
    format!(
        r#"<a class="page-link-ref" href="/app/pages/{id}" data-page-id="{id}">[[{label}]]</a>"#
    )
}

/// A paragraph linking to every id in `ids`, labelled by the id itself.
pub fn links_html(ids: &[&str]) -> String {
    let links: Vec<String> = ids.iter().map(|id| link_html(id, id)).collect();
    format!("<p>{}</p>", links.join(" "))
}
