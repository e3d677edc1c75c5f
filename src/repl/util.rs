//! REPL 内部ユーティリティ

/// 文中のロード呼び出し。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LoadCall {
    Require(String),
    /// 旧来の `baapan('x')` ヘルパ。
    Legacy(String),
}

/// 文字列中の `require('x')` / `baapan("x")` 呼び出しを出現順に取り出す。
///
/// 引数が文字列リテラル 1 つでない呼び出しは無視する。
/// `foo.require(...)` や `myrequire(...)` のように識別子の一部であるものは対象外。
pub(crate) fn extract_load_calls(src: &str) -> Vec<LoadCall> {
    let chars: Vec<char> = src.chars().collect();
    let mut calls = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            // 文字列リテラル内の `require(` は呼び出しではない
            '"' | '\'' | '`' => i = skip_string(&chars, i),
            c if is_ident_start(c) && (i == 0 || !is_ident_part_or_dot(chars[i - 1])) => {
                let start = i;
                while i < chars.len() && is_ident_part(chars[i]) {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                let ctor: fn(String) -> LoadCall = match ident.as_str() {
                    "require" => LoadCall::Require,
                    "baapan" => LoadCall::Legacy,
                    _ => continue,
                };
                if let Some((arg, end)) = parse_string_argument(&chars, i) {
                    calls.push(ctor(arg));
                    i = end;
                }
            }
            _ => i += 1,
        }
    }
    calls
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_ident_part_or_dot(c: char) -> bool {
    is_ident_part(c) || c == '.'
}

fn skip_whitespace(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    i
}

// 開きクォート位置から閉じクォートの直後を返す。閉じていなければ末尾。
fn skip_string(chars: &[char], open: usize) -> usize {
    let quote = chars[open];
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

// `(` 文字列リテラル `)` を読み取り、(内容, 閉じ括弧の直後) を返す。
fn parse_string_argument(chars: &[char], from: usize) -> Option<(String, usize)> {
    let mut i = skip_whitespace(chars, from);
    if chars.get(i) != Some(&'(') {
        return None;
    }
    i = skip_whitespace(chars, i + 1);
    let quote = *chars.get(i)?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let mut value = String::new();
    i += 1;
    loop {
        match *chars.get(i)? {
            '\\' => {
                value.push(*chars.get(i + 1)?);
                i += 2;
            }
            c if c == quote => break,
            c => {
                value.push(c);
                i += 1;
            }
        }
    }
    i = skip_whitespace(chars, i + 1);
    if chars.get(i) != Some(&')') {
        return None;
    }
    Some((value, i + 1))
}
