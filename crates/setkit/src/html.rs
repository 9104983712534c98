//! Safe HTML subset filter for rich-text settings (`textarea`, `wysiwyg`).
//!
//! Removes:
//! - executable and embedding elements together with their content (`<script>`, `<iframe>`, ...)
//! - HTML comments
//! - tags outside the allowed set (their text content is kept)
//! - attributes outside the per-tag allow list, event handlers (`on*`)
//! - `javascript:`, `vbscript:` and `data:` URLs in `href`/`src`

use regex::{Captures, Regex};

use crate::prelude::*;

/// Elements removed together with everything between their tags
const STRIPPED_ELEMENTS: &[&str] =
	&["script", "style", "iframe", "object", "embed", "noscript", "template", "frameset"];

const ALLOWED_TAGS: &[&str] = &[
	"a",
	"abbr",
	"b",
	"blockquote",
	"br",
	"caption",
	"cite",
	"code",
	"del",
	"div",
	"em",
	"figcaption",
	"figure",
	"h1",
	"h2",
	"h3",
	"h4",
	"h5",
	"h6",
	"hr",
	"i",
	"img",
	"ins",
	"li",
	"ol",
	"p",
	"pre",
	"q",
	"s",
	"small",
	"span",
	"strike",
	"strong",
	"sub",
	"sup",
	"table",
	"tbody",
	"td",
	"tfoot",
	"th",
	"thead",
	"tr",
	"u",
	"ul",
];

const GLOBAL_ATTRS: &[&str] = &["class", "id", "title", "style", "dir", "lang", "align"];

const TAG_ATTRS: &[(&str, &[&str])] = &[
	("a", &["href", "target", "rel", "name"]),
	("img", &["src", "alt", "width", "height"]),
	("td", &["colspan", "rowspan"]),
	("th", &["colspan", "rowspan", "scope"]),
	("blockquote", &["cite"]),
	("q", &["cite"]),
	("ol", &["start", "type"]),
];

const URL_ATTRS: &[&str] = &["href", "src", "cite"];

const BLOCKED_URL_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

#[derive(Debug)]
pub struct HtmlSanitizer {
	comment: Regex,
	stripped: Vec<(Regex, Regex)>,
	tag: Regex,
	attr: Regex,
}

impl HtmlSanitizer {
	pub fn new() -> SkResult<Self> {
		let compile =
			|pattern: &str| Regex::new(pattern).map_err(|e| Error::Internal(format!("regex error: {}", e)));

		let mut stripped = Vec::with_capacity(STRIPPED_ELEMENTS.len());
		for element in STRIPPED_ELEMENTS {
			// <script ...>...</script>, then any lone opening/closing tag left over
			let with_content = compile(&format!(r"(?is)<{0}\b[^>]*>.*?</{0}\s*>", element))?;
			let lone_tag = compile(&format!(r"(?i)</?{}\b[^>]*>", element))?;
			stripped.push((with_content, lone_tag));
		}

		Ok(Self {
			comment: compile(r"(?s)<!--.*?-->")?,
			stripped,
			tag: compile(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)\b([^>]*)>")?,
			attr: compile(
				r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#,
			)?,
		})
	}

	pub fn sanitize(&self, input: &str) -> String {
		let mut result = self.comment.replace_all(input, "").into_owned();

		for (with_content, lone_tag) in &self.stripped {
			result = with_content.replace_all(&result, "").into_owned();
			result = lone_tag.replace_all(&result, "").into_owned();
		}

		self.tag.replace_all(&result, |caps: &Captures| self.rewrite_tag(caps)).into_owned()
	}

	fn rewrite_tag(&self, caps: &Captures) -> String {
		let name = caps[2].to_ascii_lowercase();
		if !ALLOWED_TAGS.contains(&name.as_str()) {
			return String::new();
		}
		if !caps[1].is_empty() {
			return format!("</{}>", name);
		}

		let raw_attrs = caps.get(3).map_or("", |m| m.as_str());
		let self_closing = raw_attrs.trim_end().ends_with('/');

		let mut tag = format!("<{}", name);
		for attr in self.attr.captures_iter(raw_attrs) {
			let attr_name = attr[1].to_ascii_lowercase();
			if !attr_allowed(&name, &attr_name) {
				continue;
			}
			let value = attr.get(2).or_else(|| attr.get(3)).or_else(|| attr.get(4)).map(|m| m.as_str());
			match value {
				Some(value) => {
					if URL_ATTRS.contains(&attr_name.as_str()) && has_blocked_scheme(value) {
						continue;
					}
					tag.push_str(&format!(" {}=\"{}\"", attr_name, value.replace('"', "&quot;")));
				}
				None => {
					tag.push(' ');
					tag.push_str(&attr_name);
				}
			}
		}
		if self_closing {
			tag.push_str(" /");
		}
		tag.push('>');
		tag
	}
}

fn attr_allowed(tag: &str, attr: &str) -> bool {
	if attr.starts_with("on") {
		return false;
	}
	GLOBAL_ATTRS.contains(&attr)
		|| TAG_ATTRS.iter().any(|(t, attrs)| *t == tag && attrs.contains(&attr))
}

/// Named references that can spell out a URL scheme
const NAMED_REFS: &[(&str, char)] = &[
	("colon", ':'),
	("tab", '\t'),
	("newline", '\n'),
	("amp", '&'),
	("sol", '/'),
	("period", '.'),
	("lpar", '('),
	("rpar", ')'),
	("quot", '"'),
	("apos", '\''),
	("nbsp", '\u{a0}'),
];

fn has_blocked_scheme(url: &str) -> bool {
	let normalized: String = decode_char_refs(url)
		.chars()
		.filter(|c| !c.is_whitespace() && !c.is_control())
		.collect::<String>()
		.to_ascii_lowercase();
	if BLOCKED_URL_SCHEMES.iter().any(|scheme| normalized.starts_with(scheme)) {
		return true;
	}

	// A scheme still holding an undecoded reference is not trusted
	normalized
		.split_once(':')
		.is_some_and(|(scheme, _)| scheme.contains('&') && !scheme.contains(['/', '?', '#']))
}

/// Decodes numeric (`&#97;`, `&#x61;`) and a few named character references,
/// with or without the closing `;`, the way browsers read attribute values
fn decode_char_refs(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	let mut rest = input;
	while let Some(pos) = rest.find('&') {
		out.push_str(&rest[..pos]);
		let after = &rest[pos + 1..];
		match decode_char_ref(after) {
			Some((c, used)) => {
				out.push(c);
				rest = &after[used..];
			}
			None => {
				out.push('&');
				rest = after;
			}
		}
	}
	out.push_str(rest);
	out
}

/// Decodes one reference at the start of `s` (just past the `&`), returning the char and bytes used
fn decode_char_ref(s: &str) -> Option<(char, usize)> {
	if let Some(num) = s.strip_prefix('#') {
		let (prefix, radix) = match num.as_bytes().first() {
			Some(b'x' | b'X') => (1, 16),
			_ => (0, 10),
		};
		let digits = &num[prefix..];
		let len = digits.find(|c: char| !c.is_digit(radix)).unwrap_or(digits.len());
		if len == 0 {
			return None;
		}
		let code = u32::from_str_radix(&digits[..len], radix).ok()?;
		let mut used = 1 + prefix + len;
		if s[used..].starts_with(';') {
			used += 1;
		}
		return Some((char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER), used));
	}

	let len = s.find(|c: char| !c.is_ascii_alphanumeric()).unwrap_or(s.len());
	let (_, c) = NAMED_REFS.iter().find(|(name, _)| name.eq_ignore_ascii_case(&s[..len]))?;
	let mut used = len;
	if s[used..].starts_with(';') {
		used += 1;
	}
	Some((*c, used))
}


// vim: ts=4
