use super::types::{Page, Resource, Row, SystemStats};
use serde_json::Value;

/// Longest message preview shown in a listing.
const PREVIEW_CHARS: usize = 50;

/// Cut `text` to at most 50 characters, ending in `...` when shortened.
pub fn truncate_preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(PREVIEW_CHARS - 3).collect();
    out.push_str("...");
    out
}

fn cell(resource: Resource, field: &str, row: &Row) -> String {
    match (resource, field, row.get(field)) {
        (_, "last_login", None | Some(Value::Null)) => "never".to_string(),
        (Resource::Messages, "text", Some(Value::String(s))) => {
            truncate_preview(&s.replace('\n', " "))
        }
        (Resource::Messages, "is_user", Some(v)) => {
            let from = if v.as_bool().unwrap_or(false) { "user" } else { "assistant" };
            from.to_string()
        }
        (_, _, None | Some(Value::Null)) => "-".to_string(),
        (_, _, Some(Value::String(s))) => s.clone(),
        (_, _, Some(other)) => other.to_string(),
    }
}

/// Plain-text table for one page, followed by a pagination line.
pub fn render_page(page: &Page) -> String {
    let columns = page.resource.columns();
    if page.rows.is_empty() {
        return format!("(no {} found)\n", page.resource.key());
    }

    let cells: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|(_, field)| cell(page.resource, field, row))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, (header, _))| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let headers: Vec<String> = columns.iter().map(|(h, _)| h.to_string()).collect();
    push_line(&mut out, &headers, &widths);
    for row in &cells {
        push_line(&mut out, row, &widths);
    }

    let p = page.pagination();
    if p.is_paged() {
        let window: Vec<String> = p
            .window()
            .map(|n| if n == p.current { format!("[{n}]") } else { n.to_string() })
            .collect();
        out.push_str(&format!(
            "\npage {} of {} ({} total)  {}\n",
            p.current,
            p.total_pages,
            page.total,
            window.join(" ")
        ));
    } else {
        out.push_str(&format!("\n{} total\n", page.total));
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| {
            let pad = w.saturating_sub(c.chars().count());
            format!("{c}{}", " ".repeat(pad))
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

pub fn render_stats(stats: &SystemStats) -> String {
    let mut out = format!(
        "users:         {}\nactive users:  {}\nconversations: {}\nmessages:      {}\n",
        stats.total_users, stats.active_users, stats.total_conversations, stats.total_messages
    );
    if !stats.recent_users.is_empty() {
        out.push_str("\nrecent users:\n");
        for user in &stats.recent_users {
            out.push_str(&format!(
                "  {}  {}\n",
                cell(Resource::Users, "email", user),
                cell(Resource::Users, "created_at", user)
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncate_preview() {
        assert_eq!(truncate_preview("short"), "short");
        let long = "行".repeat(60);
        let cut = truncate_preview(&long);
        assert_eq!(cut.chars().count(), 50);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_preview(&"a".repeat(50)), "a".repeat(50));
    }

    #[test]
    fn test_render_messages_page() {
        let page = Page::from_value(
            Resource::Messages,
            1,
            10,
            json!({
                "messages": [{
                    "id": 9,
                    "user_email": "a@b.c",
                    "conversation_id": "c1",
                    "text": "x".repeat(80),
                    "created_at": "2026-10-01 10:00:00",
                    "is_user": false,
                    "agent_type": "travel"
                }],
                "total": 25
            }),
        )
        .unwrap();

        let table = render_page(&page);
        let mut lines = table.lines();
        assert!(lines.next().unwrap().starts_with("ID"));
        let row = lines.next().unwrap();
        assert!(row.contains("assistant"));
        assert!(row.contains(&format!("{}...", "x".repeat(47))));
        assert!(table.contains("page 1 of 3 (25 total)  [1] 2 3"));
    }

    #[test]
    fn test_render_users_never_logged_in() {
        let page = Page::from_value(
            Resource::Users,
            1,
            10,
            json!({"users": [{"id": 1, "email": "a@b.c", "created_at": "2026-01-01", "last_login": null}], "total": 1}),
        )
        .unwrap();
        let table = render_page(&page);
        assert!(table.contains("never"));
        assert!(table.ends_with("\n1 total\n"));
    }

    #[test]
    fn test_render_empty_page() {
        let page = Page::from_value(Resource::Logs, 1, 10, json!({"logs": [], "total": 0})).unwrap();
        assert_eq!(render_page(&page), "(no logs found)\n");
    }

    #[test]
    fn test_render_stats() {
        let stats = SystemStats {
            total_users: 3,
            active_users: 1,
            total_conversations: 4,
            total_messages: 20,
            recent_users: vec![],
        };
        let out = render_stats(&stats);
        assert!(out.contains("users:         3"));
        assert!(!out.contains("recent users"));
    }
}
