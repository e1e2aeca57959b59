//! Markdown answer rendering.
//!
//! Vendor answers are Markdown. Raw HTML in them is never passed through: it
//! is re-emitted as text, so the HTML writer escapes it. Script-capable link
//! and image targets are replaced by `#`.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

const UNSAFE_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

/// A rendered answer: sanitized HTML plus the plain text that is typed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAnswer {
    pub html: String,
    pub text: String,
}

impl RenderedAnswer {
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }
}

pub fn render_markdown(markdown: &str) -> RenderedAnswer {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let events: Vec<Event<'_>> = Parser::new_ext(markdown, options).map(sanitize).collect();

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.iter().cloned());

    RenderedAnswer {
        html: out,
        text: plain_text(&events),
    }
}

fn sanitize(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link { link_type, dest_url, title, id }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image { link_type, dest_url, title, id }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let lowered = url.trim_start().to_ascii_lowercase();
    if UNSAFE_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        CowStr::Borrowed("#")
    } else {
        url
    }
}

fn plain_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak => text.push(' '),
            Event::HardBreak | Event::Rule => text.push('\n'),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableCell
                | TagEnd::TableRow,
            ) => text.push('\n'),
            _ => {}
        }
    }
    text.trim().to_owned()
}
