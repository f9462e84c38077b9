// Text decoding and delimiter detection for uploaded price lists

use std::borrow::Cow;

/// Which decoder produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Windows1250,
}

/// Decode bytes as UTF-8 (BOM stripped), falling back to Windows-1250.
///
/// Returns `None` when the input also contains bytes that code page 1250
/// leaves undefined (0x81, 0x83, 0x88, 0x90, 0x98). The WHATWG table used by
/// `encoding_rs` maps those to C1 controls, so they are rejected here.
pub fn decode_text(bytes: &[u8]) -> Option<(Cow<'_, str>, TextEncoding)> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        return Some((Cow::Borrowed(text), TextEncoding::Utf8));
    }

    // Polish wholesaler exports are commonly Windows-1250
    let (decoded, had_errors) = encoding_rs::WINDOWS_1250.decode_without_bom_handling(bytes);
    if had_errors || decoded.chars().any(|c| ('\u{80}'..='\u{9f}').contains(&c)) {
        return None;
    }
    Some((decoded, TextEncoding::Windows1250))
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| field_count(line, delim))
            .collect();

        // Header must split into more than one field
        let Some(&target) = counts.first() else {
            break;
        };
        if target <= 1 {
            continue;
        }

        // Higher field count breaks ties
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn field_count(line: &str, delim: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map(|r| r.len())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_passthrough() {
        let (text, enc) = decode_text("kod;nazwa\n1;Śruba\n".as_bytes()).unwrap();
        assert_eq!(enc, TextEncoding::Utf8);
        assert!(matches!(text, Cow::Borrowed(_)));
        assert!(text.contains("Śruba"));
    }

    #[test]
    fn utf8_bom_stripped() {
        let (text, _) = decode_text(b"\xEF\xBB\xBFcode,name\n").unwrap();
        assert!(text.starts_with("code"));
    }

    #[test]
    fn windows_1250_fallback() {
        // "Śruba" with Ś = 0x8C, "łożysko" with ł = 0xB3, ż = 0xBF
        let bytes = b"code;name\n1;\x8Cruba\n2;\xB3o\xBFysko\n";
        let (text, enc) = decode_text(bytes).unwrap();
        assert_eq!(enc, TextEncoding::Windows1250);
        assert!(text.contains("Śruba"));
        assert!(text.contains("łożysko"));
    }

    #[test]
    fn undecodable_bytes() {
        // 0x81 is unmapped in Windows-1250 and invalid as UTF-8
        assert!(decode_text(b"code\n\x81\x83\n").is_none());
    }

    #[test]
    fn sniff_semicolon_delimiter() {
        let content = "code;name;price\n1;Widget;10\n2;Gadget;5\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn sniff_comma_delimiter() {
        let content = "code,name,price\n1,Widget,10\n2,Gadget,5\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn sniff_tab_delimiter() {
        let content = "code\tname\tprice\n1\tWidget\t10\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn sniff_pipe_delimiter() {
        let content = "code|name|price\n1|Widget|10\n";
        assert_eq!(sniff_delimiter(content), b'|');
    }

    #[test]
    fn sniff_semicolon_with_decimal_commas() {
        // Decimal commas must not pull the vote toward comma
        let content = "code;name;price\n1;Widget;10,50\n2;\"Bolt, M6\";0,20\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn sniff_empty_defaults_to_comma() {
        assert_eq!(sniff_delimiter(""), b',');
        assert_eq!(sniff_delimiter("single_column\nvalue\n"), b',');
    }
}
