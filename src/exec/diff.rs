// src/exec/diff.rs

//! Running the diff command and turning its output into changed paths.

use tracing::info;

use crate::env::EnvSource;
use crate::errors::Result;

use super::backend::CommandRunner;

/// Run the configured diff command through the user's shell and return the
/// changed paths in output order.
pub async fn diff(
    runner: &dyn CommandRunner,
    command: &str,
    env: &dyn EnvSource,
) -> Result<Vec<String>> {
    info!("Running diff command: {command}");

    let shell = env.var_or("SHELL", "bash");
    let args = vec!["-c".to_string(), command.replace('\n', " ")];
    let output = runner.run(&shell, &args).await?;

    Ok(parse_diff_output(&output))
}

/// Split diff output on whitespace, decoding git's C-style quoted paths.
pub fn parse_diff_output(output: &str) -> Vec<String> {
    output
        .split_whitespace()
        .map(|field| {
            if field.len() >= 2 && field.starts_with('"') && field.ends_with('"') {
                unquote(field).unwrap_or_else(|| field.trim_matches('"').to_string())
            } else {
                field.to_string()
            }
        })
        .collect()
}

/// Decode a double-quoted, C-escaped string such as `"\360\237\252\201.txt"`.
///
/// Accepts octal (`\ooo`) and hex (`\xhh`) byte escapes, `\uhhhh` and
/// `\Uhhhhhhhh` code points, and the single-character C escapes. Returns `None` for malformed escapes or bytes that are not valid UTF-8.
pub fn unquote(quoted: &str) -> Option<String> {
    let inner = quoted.strip_prefix('"')?.strip_suffix('"')?;
    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next()?;
                match escaped {
                    'n' => bytes.push(b'\n'),
                    't' => bytes.push(b'\t'),
                    'r' => bytes.push(b'\r'),
                    'a' => bytes.push(0x07),
                    'b' => bytes.push(0x08),
                    'f' => bytes.push(0x0c),
                    'v' => bytes.push(0x0b),
                    '\\' => bytes.push(b'\\'),
                    '"' => bytes.push(b'"'),
                    '0'..='7' => {
                        let mut value = escaped.to_digit(8)?;
                        for _ in 0..2 {
                            value = value * 8 + chars.next()?.to_digit(8)?;
                        }
                        bytes.push(u8::try_from(value).ok()?);
                    }
                    'x' => {
                        let value = hex_digits(&mut chars, 2)?;
                        bytes.push(u8::try_from(value).ok()?);
                    }
                    'u' | 'U' => {
                        let width = if escaped == 'u' { 4 } else { 8 };
                        let ch = char::from_u32(hex_digits(&mut chars, width)?)?;
                        let mut buf = [0u8; 4];
                        bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    }
                    _ => return None,
                }
            }
            '"' => return None,
            other => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }

    String::from_utf8(bytes).ok()
}

fn hex_digits(chars: &mut std::str::Chars<'_>, count: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..count {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}
