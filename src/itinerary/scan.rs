//! Boundary scanning over itinerary markdown.
//!
//! Segmentation is two-phase: locate ordered markers first, then slice the
//! text between consecutive markers. A region always ends at the next marker
//! or at the end of the text it was cut from.

use super::model::TimeOfDay;

/// Marker that opens a tips section.
pub const TIPS_MARK: char = '💡';

/// Marker that opens a food highlights section.
pub const FOOD_MARK: char = '🍽';

/// A located marker. Byte offsets into the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    /// Where the marker itself begins; the previous region ends here.
    pub start: usize,
    /// Where the content governed by the marker begins.
    pub content_start: usize,
}

/// A `Day N:` heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayMarker {
    pub day_number: u32,
    pub marker: Marker,
}

/// An emphasized `**Morning ...**` style label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLabel {
    pub time_of_day: TimeOfDay,
    pub marker: Marker,
}

/// Content governed by each marker: from its content start up to the start
/// of the following marker, or the end of `text` for the last one.
///
/// `markers` must be in ascending order of `start`.
pub fn bounded_slices<'a>(text: &'a str, markers: &[Marker]) -> Vec<&'a str> {
    markers
        .iter()
        .enumerate()
        .map(|(i, marker)| {
            let end = markers
                .get(i + 1)
                .map(|next| next.start)
                .unwrap_or(text.len());
            &text[marker.content_start..end.max(marker.content_start)]
        })
        .collect()
}

/// Every `Day N:` heading in order of appearance.
///
/// A heading sits at the start of a line, optionally behind markdown heading
/// hashes or bold markers. `N` must be a positive integer.
pub fn day_markers(text: &str) -> Vec<DayMarker> {
    let mut markers = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if let Some((day_number, content_offset)) = parse_day_heading(line) {
            markers.push(DayMarker {
                day_number,
                marker: Marker {
                    start: offset,
                    content_start: offset + content_offset,
                },
            });
        }
        offset += line.len();
    }
    markers
}

/// Returns the day number and the offset just past the colon.
fn parse_day_heading(line: &str) -> Option<(u32, usize)> {
    let rest = line
        .trim_start()
        .trim_start_matches('#')
        .trim_start()
        .trim_start_matches('*')
        .trim_start();
    let rest = rest.strip_prefix("Day")?;

    let number = rest.trim_start_matches([' ', '\t']);
    if number.len() == rest.len() {
        return None;
    }
    let digits = number.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let day_number: u32 = number[..digits].parse().ok().filter(|n| *n > 0)?;

    let after_colon = number[digits..]
        .trim_start_matches([' ', '\t'])
        .strip_prefix(':')?;
    Some((day_number, line.len() - after_colon.len()))
}

/// First position at or after `from` where `**` is immediately followed by
/// text accepted by `accept`.
pub fn find_emphasis(text: &str, from: usize, accept: impl Fn(&str) -> bool) -> Option<usize> {
    text[from..]
        .char_indices()
        .map(|(i, _)| from + i)
        .find(|&p| text[p..].starts_with("**") && accept(&text[p + 2..]))
}

/// The next time-of-day label at or after `from`.
///
/// The label runs from `**Morning` to the next closing `**`; a label that is
/// never closed is not a label.
pub fn next_slot_label(text: &str, from: usize) -> Option<SlotLabel> {
    let start = find_emphasis(text, from, |rest| TimeOfDay::from_prefix(rest).is_some())?;
    let time_of_day = TimeOfDay::from_prefix(&text[start + 2..])?;
    let label_end = start + 2 + time_of_day.label().len();
    let close = text[label_end..].find("**")?;
    Some(SlotLabel {
        time_of_day,
        marker: Marker {
            start,
            content_start: label_end + close + 2,
        },
    })
}

/// Where a time-of-day sub-block starting at `from` ends: the next
/// time-of-day label, digit-prefixed emphasis, tips or food marker, or the
/// end of `text`.
pub fn slot_end(text: &str, from: usize) -> usize {
    find_emphasis(text, from, |rest| {
        TimeOfDay::from_prefix(rest).is_some()
            || starts_with_digit(rest)
            || rest.starts_with(TIPS_MARK)
            || rest.starts_with(FOOD_MARK)
    })
    .unwrap_or(text.len())
}

/// Tips section content: after the first `💡 ... Tips**`, up to the next
/// emphasized food marker or digit, or the end of `text`.
pub fn tips_section(text: &str) -> Option<&str> {
    tagged_section(text, TIPS_MARK, "Tips**", |rest| {
        rest.starts_with(FOOD_MARK) || starts_with_digit(rest)
    })
}

/// Food section content: after the first `🍽️ ... Highlights**`, up to the
/// next emphasized tips marker or digit, or the end of `text`.
pub fn food_section(text: &str) -> Option<&str> {
    tagged_section(text, FOOD_MARK, "Highlights**", |rest| {
        rest.starts_with(TIPS_MARK) || starts_with_digit(rest)
    })
}

fn tagged_section<'a>(
    text: &'a str,
    mark: char,
    closing: &str,
    stop: impl Fn(&str) -> bool,
) -> Option<&'a str> {
    let mark_at = text.find(mark)?;
    let content_start = mark_at + text[mark_at..].find(closing)? + closing.len();
    let end = find_emphasis(text, content_start, stop).unwrap_or(text.len());
    Some(&text[content_start..end])
}

fn starts_with_digit(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit())
}

/// Trimmed, non-empty lines of a section with list bullets removed.
/// Horizontal rules are dropped.
pub fn list_items(section: &str) -> Vec<String> {
    section
        .lines()
        .map(strip_bullet)
        .filter(|line| !line.is_empty() && !is_rule(line))
        .map(str::to_string)
        .collect()
}

fn strip_bullet(line: &str) -> &str {
    let line = line.trim();
    if is_rule(line) {
        return line;
    }
    line.strip_prefix('-')
        .or_else(|| line.strip_prefix('•'))
        .or_else(|| line.strip_prefix("* "))
        .unwrap_or(line)
        .trim()
}

fn is_rule(line: &str) -> bool {
    line.len() >= 3 && (line.chars().all(|c| c == '-') || line.chars().all(|c| c == '*'))
}
