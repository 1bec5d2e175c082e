//! Document output seam.
//!
//! Reports are laid out as text at explicit coordinates (PDF points, origin
//! bottom-left) on A4 pages. [`PdfCanvas`] writes those calls out as a
//! plain PDF 1.4 file using the two built-in Helvetica faces in
//! WinAnsiEncoding.

use std::fmt::Write as _;

pub const A4_WIDTH: f32 = 595.28;
pub const A4_HEIGHT: f32 = 841.89;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

pub trait DocumentCanvas {
    fn set_font(&mut self, weight: FontWeight, size: f32);
    fn draw_text(&mut self, x: f32, y: f32, text: &str);
    /// Ends the current page; later drawing goes on a fresh one.
    fn show_page(&mut self);
}

#[derive(Debug)]
pub struct PdfCanvas {
    pages: Vec<String>,
    current: String,
    weight: FontWeight,
    size: f32,
}

impl Default for PdfCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfCanvas {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: String::new(),
            weight: FontWeight::Regular,
            size: 12.0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len() + usize::from(!self.current.is_empty() || self.pages.is_empty())
    }

    /// Serializes the document.
    pub fn finish(mut self) -> Vec<u8> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }

        let mut out: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n");

        let page_count = self.pages.len();
        // 1 catalog, 2 page tree, 3-4 fonts, then (page, content) pairs.
        let page_obj = |i: usize| 5 + i * 2;

        let mut push_obj = |out: &mut Vec<u8>, body: String| {
            offsets.push(out.len());
            let number = offsets.len();
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", number, body).as_bytes());
        };

        push_obj(&mut out, "<< /Type /Catalog /Pages 2 0 R >>".to_string());

        let kids = (0..page_count)
            .map(|i| format!("{} 0 R", page_obj(i)))
            .collect::<Vec<_>>()
            .join(" ");
        push_obj(
            &mut out,
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_count),
        );
        push_obj(
            &mut out,
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
        );
        push_obj(
            &mut out,
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>".to_string(),
        );

        for (i, content) in self.pages.iter().enumerate() {
            push_obj(
                &mut out,
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                     /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                    A4_WIDTH,
                    A4_HEIGHT,
                    page_obj(i) + 1
                ),
            );
            push_obj(
                &mut out,
                format!(
                    "<< /Length {} >>\nstream\n{}endstream",
                    content.len(),
                    content
                ),
            );
        }

        let xref_at = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1);
        for offset in &offsets {
            let _ = write!(xref, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            offsets.len() + 1,
            xref_at
        );
        out.extend_from_slice(xref.as_bytes());
        out
    }
}

impl DocumentCanvas for PdfCanvas {
    fn set_font(&mut self, weight: FontWeight, size: f32) {
        self.weight = weight;
        self.size = size;
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) {
        let font = match self.weight {
            FontWeight::Regular => "F1",
            FontWeight::Bold => "F2",
        };
        let _ = writeln!(
            self.current,
            "BT /{} {} Tf {} {} Td ({}) Tj ET",
            font,
            self.size,
            x,
            y,
            escape(text)
        );
    }

    fn show_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
    }
}

/// WinAnsiEncoding code for `c`. Latin-1 maps onto itself; the 0x80-0x9F
/// block holds typographic punctuation and a few extra letters.
fn win_ansi(c: char) -> Option<u8> {
    let code = match c {
        ' '..='~' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => return None,
    };
    Some(code)
}

/// Literal-string body for `text`. Codes above 0x7F are written as octal
/// escapes so content streams stay ASCII; characters outside WinAnsi print
/// as `?`.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match win_ansi(c) {
            Some(b'\\' | b'(' | b')') => {
                escaped.push('\\');
                escaped.push(c);
            }
            Some(code) if code.is_ascii() => escaped.push(c),
            Some(code) => {
                let _ = write!(escaped, "\\{:03o}", code);
            }
            None => escaped.push('?'),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut PdfCanvas)) -> String {
        let mut canvas = PdfCanvas::new();
        f(&mut canvas);
        String::from_utf8(canvas.finish()).unwrap()
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let pdf = render(|_| {});
        assert!(pdf.starts_with("%PDF-1.4"));
        assert!(pdf.ends_with("%%EOF\n"));
        assert!(pdf.contains("/Count 1"));
    }

    #[test]
    fn test_text_is_placed_with_font() {
        let pdf = render(|c| {
            c.set_font(FontWeight::Bold, 14.0);
            c.draw_text(72.0, 800.0, "Summary");
        });
        assert!(pdf.contains("BT /F2 14 Tf 72 800 Td (Summary) Tj ET"));
    }

    #[test]
    fn test_show_page_starts_new_page() {
        let pdf = render(|c| {
            c.draw_text(72.0, 800.0, "one");
            c.show_page();
            c.draw_text(72.0, 800.0, "two");
        });
        assert!(pdf.contains("/Count 2"));
        assert!(pdf.contains("/Kids [5 0 R 7 0 R]"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r"a(b)c\d"), r"a\(b\)c\\d");
    }

    #[test]
    fn test_escape_encodes_win_ansi() {
        assert_eq!(escape("José"), r"Jos\351");
        assert_eq!(escape("Zoë Ødegård"), r"Zo\353 \330deg\345rd");
        assert_eq!(escape("O’Neil"), r"O\222Neil");
        assert_eq!(escape("王 Li"), "? Li");
        assert_eq!(escape("tab\there"), "tab?here");
    }

    #[test]
    fn test_fonts_declare_win_ansi() {
        let pdf = render(|c| c.draw_text(72.0, 800.0, "José"));
        assert_eq!(pdf.matches("/Encoding /WinAnsiEncoding").count(), 2);
        assert!(pdf.contains(r"(Jos\351) Tj"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let pdf = render(|c| c.draw_text(72.0, 780.0, "x"));
        let xref_at: usize = pdf
            .lines()
            .rev()
            .nth(1)
            .and_then(|l| l.parse().ok())
            .unwrap();
        assert!(pdf[xref_at..].starts_with("xref"));

        let first_offset: usize = pdf[xref_at..]
            .lines()
            .nth(3)
            .and_then(|l| l.split(' ').next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(pdf[first_offset..].starts_with("1 0 obj"));
    }
}
