//! MTEXT 格式代码处理
//!
//! 将 MTEXT 内联格式（`\P`、`\f...;`、`{}` 分组、堆叠分数等）转换为纯文本，
//! 并展开 TEXT/MTEXT 共用的 `%%` 控制码。

/// 以 `;` 结尾、需要整体丢弃的格式代码
const VALUE_CODES: &[char] = &['f', 'F', 'H', 'W', 'Q', 'T', 'A', 'C', 'c', 'p'];

/// 无参数的开关代码
const TOGGLE_CODES: &[char] = &['L', 'l', 'O', 'o', 'K', 'k'];

/// 去除 MTEXT 格式代码，`\P` 转换为换行
pub fn plain_mtext(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' | '}' => {}
            '\\' => match chars.next() {
                Some('P') | Some('X') => out.push('\n'),
                Some('~') => out.push(' '),
                Some(escaped @ ('\\' | '{' | '}')) => out.push(escaped),
                Some('S') => {
                    // 堆叠分数：\S1/2; \S1^2; \S1#2;
                    for s in chars.by_ref() {
                        match s {
                            ';' => break,
                            '^' | '#' => out.push('/'),
                            other => out.push(other),
                        }
                    }
                }
                Some(code) if VALUE_CODES.contains(&code) => {
                    for s in chars.by_ref() {
                        if s == ';' {
                            break;
                        }
                    }
                }
                Some(code) if TOGGLE_CODES.contains(&code) => {}
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            other => out.push(other),
        }
    }

    expand_special_codes(&out)
}

/// 展开 `%%c`（直径）、`%%d`（度）、`%%p`（正负）和 `%%%`；
/// `%%u`/`%%o` 下划线与上划线开关直接去掉
pub fn expand_special_codes(text: &str) -> String {
    if !text.contains("%%") {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find("%%") {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 2..];
        let mut code = after.chars();
        match code.next().map(|c| c.to_ascii_lowercase()) {
            Some('c') => out.push('\u{2300}'),
            Some('d') => out.push('\u{00B0}'),
            Some('p') => out.push('\u{00B1}'),
            Some('%') => out.push('%'),
            Some('u') | Some('o') => {}
            Some(other) => {
                out.push_str("%%");
                out.push(other);
            }
            None => {
                out.push_str("%%");
            }
        }
        rest = code.as_str();
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_and_font_codes() {
        let raw = r"{\fMalgun Gothic|b0|i0|c129|p34;도면 제목}\P2층 평면도";
        assert_eq!(plain_mtext(raw), "도면 제목\n2층 평면도");
    }

    #[test]
    fn test_stacking_and_escapes() {
        assert_eq!(plain_mtext(r"\S1^2;"), "1/2");
        assert_eq!(plain_mtext(r"a\\b\{c\}"), r"a\b{c}");
        assert_eq!(plain_mtext(r"\H2.5x;\LUnder\l line"), "Under line");
    }

    #[test]
    fn test_special_codes() {
        assert_eq!(expand_special_codes("%%c50"), "\u{2300}50");
        assert_eq!(expand_special_codes("90%%d %%p0.1"), "90\u{00B0} \u{00B1}0.1");
        assert_eq!(expand_special_codes("%%uTitle%%u"), "Title");
        assert_eq!(expand_special_codes("100%"), "100%");
    }
}
