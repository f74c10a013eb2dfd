//! Tokenizer for derived-field formulas.

use super::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    /// Bare identifier such as `price` or `parentValues`
    Ident(String),
    /// `{any field id}`
    Braced(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Number(value) => format!("number {}", value),
            TokenKind::Ident(name) => format!("name '{}'", name),
            TokenKind::Braced(id) => format!("reference '{{{}}}'", id),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::LBracket => "'['".to_string(),
            TokenKind::RBracket => "']'".to_string(),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::Percent => "'%'".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Character offset into the source
    pub position: usize,
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, FormulaError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        let start = pos;

        let kind = match c {
            c if c.is_whitespace() => {
                pos += 1;
                continue;
            }
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '{' => {
                let close = chars[pos + 1..]
                    .iter()
                    .position(|c| *c == '}')
                    .ok_or(FormulaError::UnclosedReference { position: start })?;
                let id: String = chars[pos + 1..pos + 1 + close].iter().collect();
                let id = id.trim().to_string();
                if id.is_empty() {
                    return Err(FormulaError::EmptyReference { position: start });
                }
                pos += close + 2;
                tokens.push(Token {
                    kind: TokenKind::Braced(id),
                    position: start,
                });
                continue;
            }
            c if c.is_ascii_digit() || c == '.' => {
                while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                    pos += 1;
                }
                let literal: String = chars[start..pos].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| FormulaError::InvalidNumber(literal.clone()))?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    position: start,
                });
                continue;
            }
            c if c.is_alphabetic() || c == '_' => {
                while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                    pos += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(chars[start..pos].iter().collect()),
                    position: start,
                });
                continue;
            }
            other => {
                return Err(FormulaError::UnexpectedCharacter {
                    character: other,
                    position: start,
                })
            }
        };

        tokens.push(Token {
            kind,
            position: start,
        });
        pos += 1;
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_tokenize_arithmetic() {
        assert_eq!(
            kinds("a + 2.5*(b_1)"),
            vec![
                TokenKind::Ident("a".to_string()),
                TokenKind::Plus,
                TokenKind::Number(2.5),
                TokenKind::Star,
                TokenKind::LParen,
                TokenKind::Ident("b_1".to_string()),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_tokenize_references() {
        assert_eq!(
            kinds("{ 4f1c-99 } - parentValues[1]"),
            vec![
                TokenKind::Braced("4f1c-99".to_string()),
                TokenKind::Minus,
                TokenKind::Ident("parentValues".to_string()),
                TokenKind::LBracket,
                TokenKind::Number(1.0),
                TokenKind::RBracket,
            ]
        );
    }

    #[test]
    fn test_tokenize_rejects_code() {
        assert_eq!(
            tokenize("a; alert(1)"),
            Err(FormulaError::UnexpectedCharacter {
                character: ';',
                position: 1
            })
        );
        assert!(matches!(
            tokenize("`${a}`"),
            Err(FormulaError::UnexpectedCharacter { .. })
        ));
    }

    #[test]
    fn test_tokenize_bad_literals() {
        assert_eq!(
            tokenize("1.2.3"),
            Err(FormulaError::InvalidNumber("1.2.3".to_string()))
        );
        assert_eq!(
            tokenize("{abc"),
            Err(FormulaError::UnclosedReference { position: 0 })
        );
        assert_eq!(
            tokenize("1 + { }"),
            Err(FormulaError::EmptyReference { position: 4 })
        );
    }
}
