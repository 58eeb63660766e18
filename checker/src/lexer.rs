// lexer.rs — Tokens of the .kp pattern notation
//
// A pattern file is a grid of instruction codes, one course per line, codes
// separated by whitespace or commas, `#` comments to the end of the line.
// The logos lexer counts newlines in its extras, so every token and error
// carries its 1-based line without rescanning the source.
//
// Preconditions: none.
// Postconditions: every byte of the source is either a token, skipped or
//   covered by an error.
// Failure modes: stray characters and codes above 255 become `LexError`s;
//   lexing carries on after them.
// Side effects: none.

use std::fmt;
use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+|#[^\n]*")]
#[logos(extras = usize)]
pub enum Token {
    /// Instruction code, 0–255.
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u8>().ok())]
    Code(u8),

    #[token(",")]
    Comma,

    /// End of a course. Blank lines collapse into one token.
    #[regex(r"\n+", count_newlines)]
    Newline,
}

fn count_newlines(lex: &mut logos::Lexer<'_, Token>) {
    lex.extras += lex.slice().len();
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Code(c) => write!(f, "{c}"),
            Token::Comma => f.write_str(","),
            Token::Newline => f.write_str("end of course"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub line: usize,
    /// Byte range of the offending text.
    pub span: Range<usize>,
    pub message: String,
}

/// Tokens with the line they start on, plus everything that failed to lex.
#[derive(Debug, Default)]
pub struct LexResult {
    pub tokens: Vec<(Token, usize)>,
    pub errors: Vec<LexError>,
}

pub fn lex(source: &str) -> LexResult {
    let mut lexer = Token::lexer(source);
    let mut out = LexResult::default();

    while let Some(result) = lexer.next() {
        let line = lexer.extras + 1;
        match result {
            Ok(Token::Newline) => out.tokens.push((Token::Newline, line - lexer.slice().len())),
            Ok(token) => out.tokens.push((token, line)),
            Err(()) => {
                let text = lexer.slice();
                let message = if text.bytes().all(|b| b.is_ascii_digit()) {
                    format!("code {text} is out of range (0-255)")
                } else {
                    format!("unexpected character: {text:?}")
                };
                out.errors.push(LexError {
                    line,
                    span: lexer.span(),
                    message,
                });
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        let result = lex(source);
        assert!(result.errors.is_empty(), "lex errors: {:?}", result.errors);
        result.tokens.into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn codes_and_separators() {
        use Token::*;
        assert_eq!(
            tokens("1 2,3\t255\n"),
            vec![Code(1), Code(2), Comma, Code(3), Code(255), Newline]
        );
    }

    #[test]
    fn comments_are_skipped() {
        use Token::*;
        assert_eq!(
            tokens("# cable motif\n4 5 # crossing\n"),
            vec![Newline, Code(4), Code(5), Newline]
        );
    }

    #[test]
    fn blank_lines_collapse() {
        use Token::*;
        assert_eq!(tokens("1\n\n\n2"), vec![Code(1), Newline, Code(2)]);
    }

    #[test]
    fn crlf_line_endings() {
        use Token::*;
        assert_eq!(
            tokens("1 1\r\n2 2\r\n"),
            vec![Code(1), Code(1), Newline, Code(2), Code(2), Newline]
        );
    }

    #[test]
    fn leading_zeros() {
        assert_eq!(tokens("007"), vec![Token::Code(7)]);
    }

    #[test]
    fn lines_are_tracked() {
        let result = lex("1 1\n\n2 2\n# note\n3");
        let lines: Vec<(Token, usize)> = result.tokens;
        assert_eq!(lines[0], (Token::Code(1), 1));
        assert_eq!(lines[2], (Token::Newline, 1));
        assert_eq!(lines[3], (Token::Code(2), 3));
        assert_eq!(lines.last(), Some(&(Token::Code(3), 5)));
    }

    #[test]
    fn out_of_range_code() {
        let result = lex("1 1\n1 256 2");
        let codes: Vec<Token> = result.tokens.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            codes,
            vec![Token::Code(1), Token::Code(1), Token::Newline, Token::Code(1), Token::Code(2)]
        );
        assert_eq!(result.errors.len(), 1);
        let err = &result.errors[0];
        assert_eq!(err.message, "code 256 is out of range (0-255)");
        assert_eq!(err.line, 2);
        assert_eq!(err.span, 6..9);
    }

    #[test]
    fn unexpected_character() {
        let result = lex("1 x 2");
        assert_eq!(result.tokens.len(), 2);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "unexpected character: \"x\"");
        assert_eq!(result.errors[0].line, 1);
    }

    #[test]
    fn display() {
        assert_eq!(Token::Code(12).to_string(), "12");
        assert_eq!(Token::Newline.to_string(), "end of course");
    }
}
