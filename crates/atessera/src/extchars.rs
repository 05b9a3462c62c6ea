//! Typographic digraph transcoding.

/// No-break space, from `~`
pub const NBSP: char = '\u{00A0}';
/// `«`, from `<<`
pub const LQUOT: char = '\u{00AB}';
/// `»`, from `>>`
pub const RQUOT: char = '\u{00BB}';
/// Em dash, from `---`
pub const MDASH: char = '\u{2014}';
/// En dash, from `--`
pub const NDASH: char = '\u{2013}';

/// Replace ASCII digraphs with typographic characters.
///
/// A backslash is dropped and the character after it is copied unchanged.
/// A `~` at the very start of the input is kept literally.
pub fn ext_chars(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut escaping = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if escaping {
            out.push(c);
            escaping = false;
            i += 1;
            continue;
        }

        match c {
            '\\' => {
                escaping = true;
                i += 1;
            }
            '~' if i > 0 => {
                out.push(NBSP);
                i += 1;
            }
            '<' if next == Some('<') => {
                out.push(LQUOT);
                i += 2;
            }
            '>' if next == Some('>') => {
                out.push(RQUOT);
                i += 2;
            }
            '-' if next == Some('-') && chars.get(i + 2) == Some(&'-') => {
                out.push(MDASH);
                i += 3;
            }
            '-' if next == Some('-') => {
                out.push(NDASH);
                i += 2;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}
