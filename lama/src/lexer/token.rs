//! Token definitions

use logos::Logos;

/// Lama token
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
#[logos(skip r"--[^\n]*")]
#[logos(skip r"\(\*([^*]|\*+[^*)])*\*+\)")]
pub enum Token {
    // Keywords
    #[token("var")]
    Var,
    #[token("fun")]
    Fun,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("fi")]
    Fi,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("od")]
    Od,
    #[token("for")]
    For,
    #[token("case")]
    Case,
    #[token("of")]
    Of,
    #[token("esac")]
    Esac,
    #[token("skip")]
    Skip,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Shape patterns
    #[token("#box")]
    ShapeBox,
    #[token("#val")]
    ShapeVal,
    #[token("#str")]
    ShapeStr,
    #[token("#array")]
    ShapeArray,
    #[token("#sexp")]
    ShapeSexp,
    #[token("#fun")]
    ShapeFun,

    // Literals
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    IntLit(i64),
    #[regex(r#""([^"]|"")*""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].replace("\"\"", "\"").into_bytes()
    })]
    StringLit(Vec<u8>),
    #[regex(r"'([^'\\]|''|\\[nt])'", |lex| decode_char(lex.slice()))]
    CharLit(u8),

    // Identifiers
    #[regex(r"[a-z][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
    #[regex(r"[A-Z][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Tag(String),

    // Operators
    #[token(":=")]
    ColonEq,
    #[token(":")]
    Colon,
    #[token("!!")]
    OrOr,
    #[token("&&")]
    AndAnd,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("->")]
    Arrow,
    #[token("|")]
    Bar,
    #[token("@")]
    At,
    #[token("_")]
    Underscore,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
}

fn decode_char(slice: &str) -> Option<u8> {
    match &slice[1..slice.len() - 1] {
        "''" => Some(b'\''),
        "\\n" => Some(b'\n'),
        "\\t" => Some(b'\t'),
        inner if inner.len() == 1 => Some(inner.as_bytes()[0]),
        _ => None,
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Var => write!(f, "var"),
            Token::Fun => write!(f, "fun"),
            Token::If => write!(f, "if"),
            Token::Then => write!(f, "then"),
            Token::Elif => write!(f, "elif"),
            Token::Else => write!(f, "else"),
            Token::Fi => write!(f, "fi"),
            Token::While => write!(f, "while"),
            Token::Do => write!(f, "do"),
            Token::Od => write!(f, "od"),
            Token::For => write!(f, "for"),
            Token::Case => write!(f, "case"),
            Token::Of => write!(f, "of"),
            Token::Esac => write!(f, "esac"),
            Token::Skip => write!(f, "skip"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::ShapeBox => write!(f, "#box"),
            Token::ShapeVal => write!(f, "#val"),
            Token::ShapeStr => write!(f, "#str"),
            Token::ShapeArray => write!(f, "#array"),
            Token::ShapeSexp => write!(f, "#sexp"),
            Token::ShapeFun => write!(f, "#fun"),
            Token::IntLit(n) => write!(f, "{n}"),
            Token::StringLit(s) => write!(f, "\"{}\"", String::from_utf8_lossy(s)),
            Token::CharLit(c) => write!(f, "'{}'", char::from(*c)),
            Token::Ident(s) | Token::Tag(s) => write!(f, "{s}"),
            Token::ColonEq => write!(f, ":="),
            Token::Colon => write!(f, ":"),
            Token::OrOr => write!(f, "!!"),
            Token::AndAnd => write!(f, "&&"),
            Token::EqEq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::LtEq => write!(f, "<="),
            Token::GtEq => write!(f, ">="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Eq => write!(f, "="),
            Token::Arrow => write!(f, "->"),
            Token::Bar => write!(f, "|"),
            Token::At => write!(f, "@"),
            Token::Underscore => write!(f, "_"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Comma => write!(f, ","),
            Token::Semi => write!(f, ";"),
            Token::Dot => write!(f, "."),
        }
    }
}
