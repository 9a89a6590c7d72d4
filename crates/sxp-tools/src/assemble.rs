use num_bigint::BigInt;

use sxp_vm::{Allocator, NodePtr};

use crate::error::{Result, ToolsError};
use crate::keywords::opcode_from_keyword;

#[derive(Debug, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    Dot,
    Quoted(Vec<u8>),
    Symbol(String),
}

struct Tokenizer<'a> {
    source: &'a [u8],
    position: usize,
}

impl Tokenizer<'_> {
    fn syntax(&self, message: impl Into<String>) -> ToolsError {
        ToolsError::Syntax {
            position: self.position,
            message: message.into(),
        }
    }

    fn skip_blank(&mut self) {
        while let Some(&byte) = self.source.get(self.position) {
            if byte.is_ascii_whitespace() {
                self.position += 1;
            } else if byte == b';' {
                // comment to end of line
                while let Some(&byte) = self.source.get(self.position) {
                    self.position += 1;
                    if byte == b'\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn next(&mut self) -> Result<Option<Token>> {
        self.skip_blank();
        let Some(&byte) = self.source.get(self.position) else {
            return Ok(None);
        };
        self.position += 1;
        match byte {
            b'(' => Ok(Some(Token::LParen)),
            b')' => Ok(Some(Token::RParen)),
            b'.' => Ok(Some(Token::Dot)),
            b'"' | b'\'' => {
                let start = self.position;
                while let Some(&c) = self.source.get(self.position) {
                    if c == byte {
                        let text = self.source[start..self.position].to_vec();
                        self.position += 1;
                        return Ok(Some(Token::Quoted(text)));
                    }
                    self.position += 1;
                }
                Err(self.syntax("unterminated string"))
            }
            _ => {
                let start = self.position - 1;
                while let Some(&c) = self.source.get(self.position) {
                    if c.is_ascii_whitespace() || c == b'(' || c == b')' {
                        break;
                    }
                    self.position += 1;
                }
                let text = std::str::from_utf8(&self.source[start..self.position])
                    .map_err(|_| self.syntax("non-ascii symbol"))?;
                Ok(Some(Token::Symbol(text.to_string())))
            }
        }
    }

    fn expect(&mut self) -> Result<Token> {
        self.next()?
            .ok_or_else(|| self.syntax("unexpected end of source"))
    }
}

fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn atom_from_symbol(a: &mut Allocator, tokenizer: &Tokenizer<'_>, text: &str) -> Result<NodePtr> {
    if let Some(hex_digits) = text.strip_prefix("0x") {
        let padded = if hex_digits.len() % 2 == 1 {
            format!("0{hex_digits}")
        } else {
            hex_digits.to_string()
        };
        let bytes = hex::decode(padded)?;
        return Ok(a.new_atom(&bytes)?);
    }
    if is_integer(text) {
        let number: BigInt = text
            .parse()
            .map_err(|_| tokenizer.syntax(format!("bad integer: {text}")))?;
        return Ok(a.new_number(&number)?);
    }
    if let Some(opcode) = opcode_from_keyword(text) {
        return Ok(a.new_small_number(u64::from(opcode))?);
    }
    Err(tokenizer.syntax(format!("unknown symbol: {text}")))
}

/// One open paren's worth of state: the elements read so far, and the
/// dotted tail once a `.` has been seen.
struct Frame {
    items: Vec<NodePtr>,
    tail: Option<NodePtr>,
    after_dot: bool,
}

/// Read the textual form of a value into the allocator. The reader keeps
/// its own frame stack per open paren, so nesting depth is bounded by
/// memory alone.
pub fn assemble(a: &mut Allocator, source: &str) -> Result<NodePtr> {
    let mut tokenizer = Tokenizer {
        source: source.as_bytes(),
        position: 0,
    };
    let mut frames: Vec<Frame> = Vec::new();
    loop {
        let node = match tokenizer.expect()? {
            Token::LParen => {
                frames.push(Frame {
                    items: Vec::new(),
                    tail: None,
                    after_dot: false,
                });
                continue;
            }
            Token::Dot => {
                let Some(frame) = frames.last_mut() else {
                    return Err(tokenizer.syntax("unexpected ."));
                };
                if frame.items.is_empty() || frame.after_dot {
                    return Err(tokenizer.syntax("unexpected ."));
                }
                frame.after_dot = true;
                continue;
            }
            Token::RParen => {
                let Some(frame) = frames.pop() else {
                    return Err(tokenizer.syntax("unexpected )"));
                };
                if frame.after_dot && frame.tail.is_none() {
                    return Err(tokenizer.syntax("expected expression after ."));
                }
                let mut node = frame.tail.unwrap_or_else(|| a.nil());
                for item in frame.items.into_iter().rev() {
                    node = a.new_pair(item, node)?;
                }
                node
            }
            Token::Quoted(bytes) => a.new_atom(&bytes)?,
            Token::Symbol(text) => atom_from_symbol(a, &tokenizer, &text)?,
        };
        let Some(frame) = frames.last_mut() else {
            if tokenizer.next()?.is_some() {
                return Err(tokenizer.syntax("trailing input"));
            }
            return Ok(node);
        };
        if frame.after_dot {
            if frame.tail.is_some() {
                return Err(tokenizer.syntax("expected ) after dotted tail"));
            }
            frame.tail = Some(node);
        } else {
            frame.items.push(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use sxp_vm::serde::node_to_bytes;

    fn assemble_hex(source: &str) -> Result<String> {
        let mut a = Allocator::new();
        let node = assemble(&mut a, source)?;
        Ok(hex::encode(node_to_bytes(&a, node).unwrap()))
    }

    #[rstest]
    #[case("()", "80")]
    #[case("0", "80")]
    #[case("1", "01")]
    #[case("q", "01")]
    #[case("-1", "81ff")]
    #[case("128", "820080")]
    #[case("0xff", "81ff")]
    #[case("0xf", "0f")]
    #[case("\"ab\"", "826162")]
    #[case("(1 . 2)", "ff0102")]
    #[case("(1 2)", "ff01ff0280")]
    #[case("(q . 1)", "ff0101")]
    #[case("(+ (q . 1) (q . 2))", "ff10ffff0101ffff010280")]
    #[case("(sha256 (q . \"x\"))", "ff0bffff017880")]
    #[case("; comment\n(1)", "ff0180")]
    fn test_assemble(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(assemble_hex(source).unwrap(), expected, "source {source}");
    }

    #[test]
    fn test_deeply_nested_source() {
        // must not overflow the host stack
        let depth = 100_000;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let mut a = Allocator::new();
        let mut node = assemble(&mut a, &source).unwrap();
        for _ in 0..depth {
            let sxp_vm::SExp::Pair(first, rest) = a.sexp(node) else {
                panic!("expected pair");
            };
            assert_eq!(a.atom_len(rest), 0);
            node = first;
        }
        assert_eq!(a.atom(node), &[1]);
    }

    #[rstest]
    #[case("")]
    #[case("(")]
    #[case(")")]
    #[case("(1 . 2 3)")]
    #[case("bogus")]
    #[case("\"unterminated")]
    #[case("1 2")]
    fn test_assemble_errors(#[case] source: &str) {
        assert!(
            matches!(assemble_hex(source), Err(ToolsError::Syntax { .. })),
            "source {source}"
        );
    }
}
