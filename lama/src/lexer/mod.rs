//! Lexer implementation using logos

mod token;

pub use token::Token;

use crate::ast::Span;
use crate::error::{CompileError, Result};
use logos::Logos;

/// Tokenize source code
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(_) => {
                return Err(CompileError::lexer(
                    format!("unexpected character: {:?}", lexer.slice()),
                    span,
                ));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_keywords() {
        assert_eq!(
            kinds("var fun if then elif else fi"),
            vec![Token::Var, Token::Fun, Token::If, Token::Then, Token::Elif, Token::Else, Token::Fi]
        );
        assert_eq!(
            kinds("while do od for case of esac skip"),
            vec![Token::While, Token::Do, Token::Od, Token::For, Token::Case, Token::Of, Token::Esac, Token::Skip]
        );
    }

    #[test]
    fn test_tokenize_keyword_prefix_is_identifier() {
        assert_eq!(kinds("vars odd"), vec![Token::Ident("vars".into()), Token::Ident("odd".into())]);
    }

    #[test]
    fn test_tokenize_identifiers_and_tags() {
        assert_eq!(
            kinds("foo Cons x_1"),
            vec![Token::Ident("foo".into()), Token::Tag("Cons".into()), Token::Ident("x_1".into())]
        );
    }

    #[test]
    fn test_tokenize_string_with_escaped_quote() {
        assert_eq!(kinds(r#""say ""hi""""#), vec![Token::StringLit(b"say \"hi\"".to_vec())]);
    }

    #[test]
    fn test_tokenize_char_literals() {
        assert_eq!(
            kinds(r"'a' '''' '\n'"),
            vec![Token::CharLit(b'a'), Token::CharLit(b'\''), Token::CharLit(b'\n')]
        );
    }

    #[test]
    fn test_tokenize_operators() {
        assert_eq!(
            kinds(":= : !! && == != <= >= < >"),
            vec![
                Token::ColonEq, Token::Colon, Token::OrOr, Token::AndAnd, Token::EqEq,
                Token::NotEq, Token::LtEq, Token::GtEq, Token::Lt, Token::Gt,
            ]
        );
        assert_eq!(kinds("-> - |"), vec![Token::Arrow, Token::Minus, Token::Bar]);
    }

    #[test]
    fn test_tokenize_shapes() {
        assert_eq!(
            kinds("#box #val #str #array #sexp #fun"),
            vec![
                Token::ShapeBox, Token::ShapeVal, Token::ShapeStr,
                Token::ShapeArray, Token::ShapeSexp, Token::ShapeFun,
            ]
        );
    }

    #[test]
    fn test_tokenize_skips_comments() {
        assert_eq!(kinds("1 -- line comment\n2"), vec![Token::IntLit(1), Token::IntLit(2)]);
        assert_eq!(kinds("1 (* block\n comment *) 2"), vec![Token::IntLit(1), Token::IntLit(2)]);
    }

    #[test]
    fn test_tokenize_spans() {
        let tokens = tokenize("var xs").unwrap();
        assert_eq!(tokens[0].1, Span::new(0, 3));
        assert_eq!(tokens[1].1, Span::new(4, 6));
    }

    #[test]
    fn test_tokenize_unexpected_character_error() {
        let err = tokenize("x $ y").unwrap_err();
        assert!(err.message().contains("unexpected character"));
        assert_eq!(err.span(), Span::new(2, 3));
    }
}
