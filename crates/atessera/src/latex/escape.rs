//! LaTeX escaping policies.
//!
//! - [`escape`]: backslash-prefixes every special character, `~` included.
//! - [`escape_strict`]: symbolic `^`/`~`, and braces around `-<>'` and backtick
//!   to defuse ligatures. Used for inline code.
//! - [`escape_relaxed`]: like strict, but `~` stays a tie and nothing is
//!   braced. Used for ordinary text.

#[derive(Clone, Copy)]
enum Policy {
    Loose,
    Strict,
    Relaxed,
}

fn escape_with(text: &str, policy: Policy) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        match (c, policy) {
            ('\\', _) => out.push_str(r"{\textbackslash}"),
            ('"', _) => out.push_str("{''}"),
            ('{' | '}' | '_' | '#' | '&' | '$' | '%', _) => {
                out.push('\\');
                out.push(c);
            }
            ('^' | '~', Policy::Loose) => {
                out.push('\\');
                out.push(c);
            }
            ('^', Policy::Strict | Policy::Relaxed) => out.push_str(r"\textasciicircum{}"),
            ('~', Policy::Strict) => out.push_str(r"\textasciitilde{}"),
            ('-' | '<' | '>' | '\'' | '`', Policy::Strict) => {
                out.push('{');
                out.push(c);
                out.push('}');
            }
            _ => out.push(c),
        }
    }
    out
}

/// General-purpose escaping.
pub fn escape(text: &str) -> String {
    escape_with(text, Policy::Loose)
}

/// Escaping for verbatim-looking text such as inline code.
pub fn escape_strict(text: &str) -> String {
    escape_with(text, Policy::Strict)
}

/// Escaping for running prose.
pub fn escape_relaxed(text: &str) -> String {
    escape_with(text, Policy::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_loose() {
        assert_eq!(escape(r"a_b {c} 50% ~x^2 #1 & $"), r"a\_b \{c\} 50\% \~x\^2 \#1 \& \$");
        assert_eq!(escape(r#"\ "q""#), r"{\textbackslash} {''}q{''}");
        assert_eq!(escape("a-b <c> 'd' `e`"), "a-b <c> 'd' `e`");
    }

    #[test]
    fn test_strict() {
        assert_eq!(
            escape_strict("x^2~y"),
            r"x\textasciicircum{}2\textasciitilde{}y"
        );
        assert_eq!(escape_strict("a-b<c>'d'`e`"), "a{-}b{<}c{>}{'}d{'}{`}e{`}");
        assert_eq!(escape_strict(r"a_b\c"), r"a\_b{\textbackslash}c");
    }

    #[test]
    fn test_relaxed() {
        assert_eq!(escape_relaxed("x^2~y"), r"x\textasciicircum{}2~y");
        assert_eq!(escape_relaxed("a-b <c> 'd'"), "a-b <c> 'd'");
        assert_eq!(escape_relaxed(r#"50% "q""#), r"50\% {''}q{''}");
    }

    #[test]
    fn test_strict_and_relaxed_differ_on_tilde() {
        assert_ne!(escape_strict("a~b"), escape_relaxed("a~b"));
        assert_eq!(escape_strict("ab"), escape_relaxed("ab"));
    }

    proptest! {
        #[test]
        fn test_policies_are_total(s in "\\PC{0,64}") {
            let _ = escape(&s);
            let _ = escape_strict(&s);
            let _ = escape_relaxed(&s);
        }

        #[test]
        fn test_no_bare_specials_survive(s in "[a-z{}_#&$%\\\\ ]{0,40}") {
            let out = escape_relaxed(&s);
            let mut prev = None;
            for c in out.chars() {
                if matches!(c, '_' | '#' | '&' | '$' | '%') {
                    prop_assert_eq!(prev, Some('\\'));
                }
                prev = Some(c);
            }
        }
    }
}
