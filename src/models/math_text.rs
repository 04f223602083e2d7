//! 题干中的公式片段
//!
//! 题干以 `$` 分隔，偶数位是普通文本，奇数位是公式。
//! 分隔符不成对时，最后一段仍按公式处理（没有闭合的 `$`）。

/// 题干片段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathSegment<'a> {
    /// 普通文本，可能为空串
    Plain(&'a str),
    /// 公式标记，交给外部排版引擎渲染
    Math(&'a str),
}

impl<'a> MathSegment<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            MathSegment::Plain(s) | MathSegment::Math(s) => s,
        }
    }

    pub fn is_math(&self) -> bool {
        matches!(self, MathSegment::Math(_))
    }
}

/// 按 `$` 切分题干
pub fn split_math(text: &str) -> Vec<MathSegment<'_>> {
    text.split('$')
        .enumerate()
        .map(|(index, part)| {
            if index % 2 == 1 {
                MathSegment::Math(part)
            } else {
                MathSegment::Plain(part)
            }
        })
        .collect()
}

/// 去掉分隔符后的纯文本，公式原样内联
pub fn to_plain_text(text: &str) -> String {
    split_math(text).iter().map(MathSegment::as_str).collect()
}

/// 分隔符是否成对
pub fn is_balanced(text: &str) -> bool {
    text.matches('$').count() % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use MathSegment::{Math, Plain};

    #[test]
    fn splits_inline_formula() {
        assert_eq!(
            split_math("Find $x^2$ now"),
            vec![Plain("Find "), Math("x^2"), Plain(" now")]
        );
    }

    #[test]
    fn text_without_delimiters_is_single_plain_segment() {
        assert_eq!(split_math("no math here"), vec![Plain("no math here")]);
    }

    #[test]
    fn adjacent_formulas_keep_empty_plain_segments() {
        assert_eq!(
            split_math("$a$$b$"),
            vec![Plain(""), Math("a"), Plain(""), Math("b"), Plain("")]
        );
    }

    #[test]
    fn unbalanced_trailing_segment_is_math() {
        let segments = split_math("cost is $5 total");
        assert_eq!(segments, vec![Plain("cost is "), Math("5 total")]);
        assert!(segments.last().unwrap().is_math());
        assert!(!is_balanced("cost is $5 total"));
    }

    #[test]
    fn empty_text_is_one_empty_plain_segment() {
        assert_eq!(split_math(""), vec![Plain("")]);
    }

    #[test]
    fn plain_text_inlines_formulas() {
        assert_eq!(to_plain_text("Find $x^2$ now"), "Find x^2 now");
        assert!(is_balanced("Find $x^2$ now"));
    }
}
