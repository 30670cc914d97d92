use scraper::{Html, Node, Selector};

const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Approximates `innerText` from a serialized document: body text nodes,
/// one trimmed fragment per line, skipping script-like elements.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = match Selector::parse("body") {
        Ok(selector) => document.select(&selector).next(),
        Err(_) => None,
    };
    let Some(body) = root else {
        return String::new();
    };

    let mut lines = Vec::new();
    for node in body.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|el| HIDDEN_ELEMENTS.contains(&el.name()))
                .unwrap_or(false)
        });
        if hidden {
            continue;
        }
        let fragment = text.trim();
        if !fragment.is_empty() {
            lines.push(fragment.to_string());
        }
    }

    lines.join("\n")
}
