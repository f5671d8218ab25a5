use crate::session::ChatMessage;
use pulldown_cmark::{html, Options, Parser};

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Render Markdown to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Standalone HTML page for a saved transcript.
///
/// `info` is the collected trip information, rendered as its own block after
/// the conversation.
pub fn transcript_html(title: &str, history: &[ChatMessage], info: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>");
    pulldown_cmark_escape::escape_html(&mut out, title).ok();
    out.push_str("</title>\n</head>\n<body>\n");

    for msg in history {
        let class = if msg.is_user { "message user-message" } else { "message ai-message" };
        out.push_str(&format!("<div class=\"{class}\">\n"));
        out.push_str(&markdown_to_html(&msg.content));
        out.push_str("</div>\n");
    }

    if let Some(info) = info {
        out.push_str("<div class=\"message ai-message info-collector\">\n");
        out.push_str(&markdown_to_html(info));
        out.push_str("</div>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}
