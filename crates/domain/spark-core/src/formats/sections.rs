//! Line scanner for the `=== SECTION ===` / `Item #n:` / `Field: value`
//! convention used by agent output.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// Upper-cased header text with inner whitespace collapsed.
    pub name: String,
    pub lines: Vec<&'a str>,
}

/// Recognizes `=== NAME ===`, tolerating surrounding whitespace, extra `=`
/// and any casing.
pub fn section_header(line: &str) -> Option<String> {
    let inner = line.trim().strip_prefix("===")?.strip_suffix("===")?;
    let inner = inner.trim_matches('=').trim();
    if inner.is_empty() {
        return None;
    }
    Some(
        inner
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase(),
    )
}

/// Splits text into sections. Lines before the first header are dropped.
pub fn split_sections(text: &str) -> Vec<Section<'_>> {
    let mut sections: Vec<Section<'_>> = Vec::new();
    for line in text.lines() {
        if let Some(name) = section_header(line) {
            sections.push(Section {
                name,
                lines: Vec::new(),
            });
        } else if let Some(current) = sections.last_mut() {
            current.lines.push(line);
        }
    }
    sections
}

/// `base` matches itself, its plural, and either followed by one qualifier
/// word: "PROJECT" matches "PROJECTS" and "PROJECT RECOMMENDATIONS".
pub fn section_matches(name: &str, base: &str) -> bool {
    let Some(rest) = name.strip_prefix(base) else {
        return false;
    };
    let rest = rest.strip_prefix('S').unwrap_or(rest);
    if rest.is_empty() {
        return true;
    }
    match rest.strip_prefix(' ') {
        Some(qualifier) => qualifier.split_whitespace().count() == 1,
        None => false,
    }
}

pub fn find_section<'s, 'a>(sections: &'s [Section<'a>], base: &str) -> Option<&'s Section<'a>> {
    sections.iter().find(|s| section_matches(&s.name, base))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemHeader<'a> {
    pub number: u32,
    /// Text after the colon, e.g. "Portfolio Site" in `Project #2: Portfolio Site`.
    pub inline: &'a str,
}

/// Recognizes `<Noun> #<n>:` (the `#` is optional), case-insensitive.
pub fn item_header<'a>(line: &'a str, noun: &str) -> Option<ItemHeader<'a>> {
    let t = line.trim().trim_start_matches(['*', '#']).trim_start();
    let head = t.get(..noun.len())?;
    if !head.eq_ignore_ascii_case(noun) {
        return None;
    }
    let rest = t[noun.len()..].trim_start();
    let rest = rest.strip_prefix('#').unwrap_or(rest).trim_start();
    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits == 0 {
        return None;
    }
    let number = rest[..digits].parse().ok()?;
    let tail = rest[digits..].trim_start().strip_prefix(':')?;
    Some(ItemHeader {
        number,
        inline: tail.trim().trim_matches('*').trim(),
    })
}

/// One recognized `Field:` prefix.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec<K> {
    pub key: K,
    /// Canonical name, used in validation messages.
    pub label: &'static str,
    /// Accepted prefixes, compared case-insensitively.
    pub names: &'static [&'static str],
    /// Whether unprefixed follow-up lines extend this field.
    pub multiline: bool,
}

/// Splits `Field: value` at the first colon so values keep their own colons.
pub fn split_field<'s, 'l, K>(
    line: &'l str,
    specs: &'s [FieldSpec<K>],
) -> Option<(&'s FieldSpec<K>, &'l str)> {
    let t = strip_bullet(line.trim());
    let (head, value) = t.split_once(':')?;
    let head = head.trim().trim_matches('*').trim();
    let spec = specs
        .iter()
        .find(|s| s.names.iter().any(|n| n.eq_ignore_ascii_case(head)))?;
    Some((spec, value.trim().trim_start_matches('*').trim()))
}

#[derive(Debug, Clone)]
pub struct RawItem<K> {
    pub number: u32,
    pub inline_title: Option<String>,
    fields: Vec<(K, String)>,
}

impl<K: Copy + PartialEq> RawItem<K> {
    fn new(header: ItemHeader<'_>) -> Self {
        Self {
            number: header.number,
            inline_title: (!header.inline.is_empty()).then(|| header.inline.to_string()),
            fields: Vec::new(),
        }
    }

    pub fn has(&self, key: K) -> bool {
        self.fields.iter().any(|(k, _)| *k == key)
    }

    /// Non-empty value of a field.
    pub fn get(&self, key: K) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn owned(&self, key: K) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn set(&mut self, key: K, value: &str) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.fields.push((key, value.to_string())),
        }
    }

    fn append(&mut self, key: K, text: &str) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) if v.is_empty() => *v = text.to_string(),
            Some((_, v)) => {
                v.push(' ');
                v.push_str(text);
            }
            None => self.fields.push((key, text.to_string())),
        }
    }
}

/// Groups section lines into numbered items and fills their fields.
///
/// An unprefixed line continues the multi-line field opened last; any
/// recognized prefix resets that, so lines after a single-line field are
/// dropped. Lines before the first item header are ignored.
pub fn collect_items<K: Copy + PartialEq>(
    lines: &[&str],
    noun: &str,
    specs: &[FieldSpec<K>],
) -> Vec<RawItem<K>> {
    let mut items: Vec<RawItem<K>> = Vec::new();
    let mut open: Option<K> = None;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(header) = item_header(trimmed, noun) {
            items.push(RawItem::new(header));
            open = None;
            continue;
        }
        let Some(item) = items.last_mut() else {
            continue;
        };
        if let Some((spec, value)) = split_field(trimmed, specs) {
            item.set(spec.key, value);
            open = spec.multiline.then_some(spec.key);
        } else if let Some(key) = open {
            item.append(key, trimmed);
        }
    }

    items
}

/// Comma list, trimmed, empty entries dropped.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_bullet(line: &str) -> &str {
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
        .unwrap_or(line)
        .trim_start()
}

/// Body of a bullet line (`- `, `* ` or `• `), if non-empty.
pub fn bullet(line: &str) -> Option<&str> {
    let t = line.trim();
    let body = t
        .strip_prefix('-')
        .or_else(|| t.strip_prefix('*'))
        .or_else(|| t.strip_prefix('•'))?
        .trim();
    (!body.is_empty()).then_some(body)
}

/// Splits a trailing `(...)` group off: `"Fall 2025 (12 credits)"` becomes
/// `("Fall 2025", Some("12 credits"))`.
pub fn split_parenthetical(s: &str) -> (&str, Option<&str>) {
    let t = s.trim();
    if let Some(body) = t.strip_suffix(')') {
        if let Some((head, inner)) = body.rsplit_once('(') {
            return (head.trim(), Some(inner.trim()));
        }
    }
    (t, None)
}

/// First run of digits in `s`, ignoring thousands separators.
pub fn leading_number(s: &str) -> Option<u32> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let digits: String = s[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// `[TAG] rest` split into its parts.
pub fn tagged(line: &str) -> Option<(&str, &str)> {
    let t = line.trim().strip_prefix('[')?;
    let (tag, rest) = t.split_once(']')?;
    Some((tag.trim(), rest.trim()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedBlock {
    pub tag: String,
    pub title: String,
    pub description: String,
}

/// Groups `[TAG] Title` lines with the unprefixed lines that follow them.
pub fn tagged_blocks(lines: &[&str]) -> Vec<TaggedBlock> {
    let mut blocks: Vec<TaggedBlock> = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some((tag, title)) = tagged(trimmed) {
            blocks.push(TaggedBlock {
                tag: tag.to_string(),
                title: title.to_string(),
                description: String::new(),
            });
        } else if let Some(block) = blocks.last_mut() {
            if !block.description.is_empty() {
                block.description.push(' ');
            }
            block.description.push_str(trimmed);
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_tolerates_whitespace_and_case() {
        assert_eq!(
            section_header("  ===   project   recommendations ===  ").as_deref(),
            Some("PROJECT RECOMMENDATIONS")
        );
        assert_eq!(section_header("====HOT ROLES===="), Some("HOT ROLES".into()));
        assert_eq!(section_header("======"), None);
        assert_eq!(section_header("Title: === x"), None);
    }

    #[test]
    fn section_base_accepts_one_qualifier() {
        assert!(section_matches("PROJECT", "PROJECT"));
        assert!(section_matches("PROJECTS", "PROJECT"));
        assert!(section_matches("PROJECT RECOMMENDATIONS", "PROJECT"));
        assert!(!section_matches("PROJECT IDEAS FOR YOU", "PROJECT"));
        assert!(!section_matches("PROJECTOR", "PROJECT"));
    }

    #[test]
    fn item_header_variants() {
        assert_eq!(item_header("Project #1:", "Project").map(|h| h.number), Some(1));
        assert_eq!(item_header("project 12:", "Project").map(|h| h.number), Some(12));
        let h = item_header("**Project #3: Budget App**", "Project").unwrap();
        assert_eq!(h.number, 3);
        assert_eq!(h.inline, "Budget App");
        assert!(item_header("Project #x:", "Project").is_none());
        assert!(item_header("Projects overview:", "Project").is_none());
        assert!(item_header("Job #1", "Job").is_none());
    }

    #[test]
    fn numbers_and_parentheticals() {
        assert_eq!(leading_number("high demand, 1,200 listings"), Some(1200));
        assert_eq!(leading_number("none"), None);
        assert_eq!(
            split_parenthetical("Tech Corp (25 openings, Dallas TX)"),
            ("Tech Corp", Some("25 openings, Dallas TX"))
        );
        assert_eq!(split_parenthetical("Plain"), ("Plain", None));
    }
}
