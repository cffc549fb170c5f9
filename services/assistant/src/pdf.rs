//! Minimal PDF 1.4 writer: A4 pages of left-aligned Helvetica text lines.
//!
//! Text is encoded as WinAnsi; anything outside that code page (emoji and
//! other symbols) is dropped. Non-ASCII bytes are written as octal escapes so
//! the file is pure ASCII.

/// A4 in points.
const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const MARGIN_LEFT: u32 = 50;
const TOP_BASELINE: u32 = 790;
const LEADING: u32 = 18;
const FOOTER_BASELINE: u32 = 30;
const FOOTER_SIZE: u8 = 9;

/// One line of text at a given font size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub size: u8,
}

impl Line {
    pub fn new(text: impl Into<String>, size: u8) -> Self {
        Self {
            text: text.into(),
            size,
        }
    }

    pub fn blank() -> Self {
        Self::new("", 10)
    }
}

/// Map a char to its WinAnsi (cp1252) byte.
fn win_ansi(c: char) -> Option<u8> {
    let byte = match c {
        '\u{20}'..='\u{7e}' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        _ => return None,
    };
    Some(byte)
}

/// Drop every char the font cannot draw. Newlines survive so callers can
/// still wrap on them.
pub fn encodable(text: &str) -> String {
    text.chars()
        .filter(|&c| c == '\n' || win_ansi(c).is_some())
        .collect()
}

/// Encode `text` as the body of a PDF literal string.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.chars().filter_map(win_ansi) {
        match byte {
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\\' => out.push_str("\\\\"),
            b if b.is_ascii() => out.push(b as char),
            b => out.push_str(&format!("\\{b:03o}")),
        }
    }
    out
}

/// Greedy word wrap on character count. Explicit newlines start new lines;
/// words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }
        lines.push(current);
    }
    lines
}

fn page_content(lines: &[Line], footer: &str) -> String {
    let mut content = String::new();
    let mut y = TOP_BASELINE;
    for line in lines {
        if !line.text.is_empty() {
            content.push_str(&format!(
                "BT /F1 {} Tf {MARGIN_LEFT} {y} Td ({}) Tj ET\n",
                line.size,
                escape_text(&line.text)
            ));
        }
        y = y.saturating_sub(LEADING);
    }
    content.push_str(&format!(
        "BT /F1 {FOOTER_SIZE} Tf {} {FOOTER_BASELINE} Td ({}) Tj ET\n",
        PAGE_WIDTH / 2 - 30,
        escape_text(footer)
    ));
    content
}

/// Render pages into a complete PDF file. `footer(n, m)` labels page `n` of `m`.
/// An empty `pages` slice still yields one (blank) page.
pub fn render(pages: &[Vec<Line>], footer: impl Fn(usize, usize) -> String) -> Vec<u8> {
    let empty = [Vec::new()];
    let pages = if pages.is_empty() { &empty[..] } else { pages };
    let total = pages.len();

    // Objects: 1 catalog, 2 page tree, 3 font, then (page, contents) pairs.
    let mut objects: Vec<String> = Vec::with_capacity(3 + 2 * total);
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_owned());
    let kids: Vec<String> = (0..total).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {total} >>",
        kids.join(" ")
    ));
    objects.push(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_owned(),
    );
    for (i, lines) in pages.iter().enumerate() {
        let contents_id = 5 + 2 * i;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {contents_id} 0 R >>"
        ));
        let stream = page_content(lines, &footer(i + 1, total));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{stream}endstream",
            stream.len()
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
    }
    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len() + 1
    ));
    out.into_bytes()
}
