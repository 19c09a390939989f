//! 문자열 유틸리티.

/// 문자열 자르기 (UTF-8 안전, 문자 수 기준).
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// HTML 태그 제거.
///
/// `<b>반도체</b>` → `반도체`. 닫히지 않은 `<`는 그대로 둡니다.
pub fn strip_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(open) = rest.find('<') {
        match rest[open..].find('>') {
            Some(close) if close > 1 => {
                out.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            _ => {
                out.push_str(&rest[..=open]);
                rest = &rest[open + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}
