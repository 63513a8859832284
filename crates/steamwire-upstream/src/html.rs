//! Minimal HTML-to-text cleanup for Steam news titles and bodies.

const ENTITIES: [(&str, &str); 7] = [
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&nbsp;", " "),
];

/// Strip tags, decode common entities, and collapse whitespace.
pub fn clean_html(input: &str) -> String {
    let mut text = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                // Tags often separate words (`<br>`, `</p>`).
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    // `&amp;` is decoded last so `&amp;lt;` stays literal `&lt;`.
    for (entity, replacement) in ENTITIES.iter().skip(1) {
        text = text.replace(entity, replacement);
    }
    text = text.replace(ENTITIES[0].0, ENTITIES[0].1);

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip Steam's BBCode markup (`[b]`, `[url=...]`, `[img]...[/img]`).
pub fn strip_bbcode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after = &rest[open..];
        match after.find(']') {
            Some(close) if is_bbcode_tag(&after[1..close]) => {
                let tag = &after[1..close];
                rest = &after[close + 1..];
                if tag.eq_ignore_ascii_case("img") {
                    // Image URLs are noise in a text message.
                    rest = match rest.to_ascii_lowercase().find("[/img]") {
                        Some(end) => &rest[end + "[/img]".len()..],
                        None => rest,
                    };
                }
            }
            _ => {
                out.push('[');
                rest = &after[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_bbcode_tag(tag: &str) -> bool {
    let name = tag
        .trim_start_matches('/')
        .split(['=', ' '])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    matches!(
        name.as_str(),
        "b" | "i" | "u" | "s" | "h1" | "h2" | "h3" | "url" | "img" | "list" | "olist" | "*"
            | "quote" | "code" | "p" | "strike" | "spoiler" | "previewyoutube" | "hr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags_and_collapses_whitespace() {
        assert_eq!(
            clean_html("<p>Patch <b>notes</b></p>\n\n<br/>  below"),
            "Patch notes below"
        );
    }

    #[test]
    fn test_decodes_entities() {
        assert_eq!(
            clean_html("Tom &amp; Jerry &quot;live&quot; &#39;now&#39;&nbsp;!"),
            "Tom & Jerry \"live\" 'now' !"
        );
    }

    #[test]
    fn test_double_encoded_entity_decoded_once() {
        assert_eq!(clean_html("&amp;lt;tag&amp;gt;"), "&lt;tag&gt;");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(clean_html("Update Released"), "Update Released");
        assert_eq!(clean_html(""), "");
    }

    #[test]
    fn test_strip_bbcode() {
        assert_eq!(
            strip_bbcode("[b]Big[/b] news [url=https://x.y]here[/url]"),
            "Big news here"
        );
        assert_eq!(
            strip_bbcode("Look [img]{STEAM_CLAN_IMAGE}/a.png[/img]at this"),
            "Look at this"
        );
    }

    #[test]
    fn test_strip_bbcode_keeps_plain_brackets() {
        assert_eq!(strip_bbcode("[EU] servers [1.2]"), "[EU] servers [1.2]");
        assert_eq!(strip_bbcode("unclosed [b"), "unclosed [b");
    }
}
