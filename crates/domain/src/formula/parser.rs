//! Recursive-descent parser producing a formula [`Expr`].
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := ('-' | '+') unary | primary
//! primary := NUMBER | IDENT | '{' ID '}' | 'parentValues' '[' INDEX ']' | '(' expr ')'
//! ```

use super::lexer::{Token, TokenKind};
use super::{BinaryOp, Binding, Expr, FormulaError, UnaryOp, POSITIONAL_BINDING};

/// Deepest formula tree accepted. Parentheses, unary signs and every binary
/// operator in a chain each count as one level.
pub(crate) const MAX_DEPTH: usize = 256;

pub(crate) struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    depth: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            cursor: 0,
            depth: 0,
        }
    }

    /// Parse the whole token stream as one expression.
    pub(crate) fn parse(mut self) -> Result<Expr, FormulaError> {
        if self.tokens.is_empty() {
            return Err(FormulaError::Empty);
        }
        let expr = self.parse_expr()?;
        match self.next() {
            None => Ok(expr),
            Some(token) => Err(FormulaError::UnexpectedToken {
                found: token.kind.describe(),
                position: token.position,
            }),
        }
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.cursor).map(|token| &token.kind)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn expect(&mut self, expected: TokenKind) -> Result<(), FormulaError> {
        match self.next() {
            Some(token) if token.kind == expected => Ok(()),
            Some(token) => Err(FormulaError::UnexpectedToken {
                found: token.kind.describe(),
                position: token.position,
            }),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }

    fn descend(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(FormulaError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn parse_expr(&mut self) -> Result<Expr, FormulaError> {
        let mut expr = self.parse_term()?;
        let mut levels = 0;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Subtract,
                _ => {
                    self.depth -= levels;
                    return Ok(expr);
                }
            };
            self.cursor += 1;
            self.descend()?;
            levels += 1;
            let right = self.parse_term()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
    }

    fn parse_term(&mut self) -> Result<Expr, FormulaError> {
        let mut expr = self.parse_unary()?;
        let mut levels = 0;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => BinaryOp::Multiply,
                Some(TokenKind::Slash) => BinaryOp::Divide,
                Some(TokenKind::Percent) => BinaryOp::Remainder,
                _ => {
                    self.depth -= levels;
                    return Ok(expr);
                }
            };
            self.cursor += 1;
            self.descend()?;
            levels += 1;
            let right = self.parse_unary()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, FormulaError> {
        let op = match self.peek() {
            Some(TokenKind::Minus) => UnaryOp::Negate,
            Some(TokenKind::Plus) => UnaryOp::Plus,
            _ => return self.parse_primary(),
        };
        self.cursor += 1;
        self.descend()?;
        let operand = self.parse_unary()?;
        self.depth -= 1;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, FormulaError> {
        let token = self.next().ok_or(FormulaError::UnexpectedEnd)?;
        match token.kind {
            TokenKind::Number(value) => Ok(Expr::Number(value)),
            TokenKind::Braced(id) => Ok(Expr::Binding(Binding::Name(id))),
            TokenKind::Ident(name) if name == POSITIONAL_BINDING => {
                self.expect(TokenKind::LBracket)?;
                let index = match self.next() {
                    Some(Token {
                        kind: TokenKind::Number(value),
                        ..
                    }) if value.fract() == 0.0 && value >= 0.0 => value as usize,
                    Some(token) => {
                        return Err(FormulaError::UnexpectedToken {
                            found: token.kind.describe(),
                            position: token.position,
                        })
                    }
                    None => return Err(FormulaError::UnexpectedEnd),
                };
                self.expect(TokenKind::RBracket)?;
                Ok(Expr::Binding(Binding::Position(index)))
            }
            TokenKind::Ident(name) => Ok(Expr::Binding(Binding::Name(name))),
            TokenKind::LParen => {
                self.descend()?;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                self.depth -= 1;
                Ok(inner)
            }
            other => Err(FormulaError::UnexpectedToken {
                found: other.describe(),
                position: token.position,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn parse(source: &str) -> Result<Expr, FormulaError> {
        Parser::new(tokenize(source)?).parse()
    }

    fn name(id: &str) -> Box<Expr> {
        Box::new(Expr::Binding(Binding::Name(id.to_string())))
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse("a + b * 2").unwrap(),
            Expr::Binary {
                left: name("a"),
                op: BinaryOp::Add,
                right: Box::new(Expr::Binary {
                    left: name("b"),
                    op: BinaryOp::Multiply,
                    right: Box::new(Expr::Number(2.0)),
                }),
            }
        );
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(
            parse("a - b - c").unwrap(),
            Expr::Binary {
                left: Box::new(Expr::Binary {
                    left: name("a"),
                    op: BinaryOp::Subtract,
                    right: name("b"),
                }),
                op: BinaryOp::Subtract,
                right: name("c"),
            }
        );
    }

    #[test]
    fn test_positional_binding() {
        assert_eq!(
            parse("parentValues[1]").unwrap(),
            Expr::Binding(Binding::Position(1))
        );
        assert!(matches!(
            parse("parentValues[1.5]"),
            Err(FormulaError::UnexpectedToken { .. })
        ));
        assert_eq!(parse("parentValues[0"), Err(FormulaError::UnexpectedEnd));
    }

    #[test]
    fn test_malformed() {
        assert_eq!(parse(""), Err(FormulaError::Empty));
        assert_eq!(parse("   "), Err(FormulaError::Empty));
        assert_eq!(parse("1 +"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(parse("(a + b"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(
            parse("a b"),
            Err(FormulaError::UnexpectedToken {
                found: "name 'b'".to_string(),
                position: 2
            })
        );
        assert!(matches!(
            parse("* 2"),
            Err(FormulaError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(parse(&deep), Err(FormulaError::TooDeep(MAX_DEPTH)));

        let ok = format!("{}1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(parse(&ok).unwrap(), Expr::Number(1.0));

        let negations = format!("{}1", "-".repeat(MAX_DEPTH + 1));
        assert_eq!(parse(&negations), Err(FormulaError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn test_operator_chain_limit() {
        let long = format!("{}a", "a+".repeat(60_000));
        assert_eq!(parse(&long), Err(FormulaError::TooDeep(MAX_DEPTH)));

        let mixed = format!(
            "{}{}a",
            "a-".repeat(MAX_DEPTH / 2),
            "a*".repeat(MAX_DEPTH / 2 + 1)
        );
        assert_eq!(parse(&mixed), Err(FormulaError::TooDeep(MAX_DEPTH)));

        let ok = format!("{}a", "a+".repeat(MAX_DEPTH - 1));
        assert!(parse(&ok).is_ok());
    }
}
