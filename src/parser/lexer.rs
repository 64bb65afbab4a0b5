use std::fmt;

use logos::Logos;

use super::span::Location;

/// Reserved words of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    If,
    Else,
    While,
    Loop,
    Infinite,
    Return,
    Break,
    Continue,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::Loop => "loop",
            Keyword::Infinite => "infinite",
            Keyword::Return => "return",
            Keyword::Break => "break",
            Keyword::Continue => "continue",
        }
    }
}

/// Special symbols: separators and operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punct {
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    AndAnd,
    Pipe,
    PipePipe,
    Caret,
    Tilde,
    Bang,
    Inc,
    Dec,
    Lt,
    Le,
    EqEq,
    Ne,
    Ge,
    Gt,
}

impl Punct {
    pub fn as_str(&self) -> &'static str {
        match self {
            Punct::LBrace => "{",
            Punct::RBrace => "}",
            Punct::LParen => "(",
            Punct::RParen => ")",
            Punct::LBracket => "[",
            Punct::RBracket => "]",
            Punct::Semicolon => ";",
            Punct::Comma => ",",
            Punct::Assign => "=",
            Punct::Plus => "+",
            Punct::Minus => "-",
            Punct::Star => "*",
            Punct::Slash => "/",
            Punct::Percent => "%",
            Punct::Amp => "&",
            Punct::AndAnd => "&&",
            Punct::Pipe => "|",
            Punct::PipePipe => "||",
            Punct::Caret => "^",
            Punct::Tilde => "~",
            Punct::Bang => "!",
            Punct::Inc => "++",
            Punct::Dec => "--",
            Punct::Lt => "<",
            Punct::Le => "<=",
            Punct::EqEq => "==",
            Punct::Ne => "!=",
            Punct::Ge => ">=",
            Punct::Gt => ">",
        }
    }
}

/// Raw logos output; whitespace and comments are filtered by the scanner
#[derive(Logos, Debug, Clone, PartialEq)]
enum RawToken {
    #[token("if", |_| Keyword::If)]
    #[token("else", |_| Keyword::Else)]
    #[token("while", |_| Keyword::While)]
    #[token("loop", |_| Keyword::Loop)]
    #[token("infinite", |_| Keyword::Infinite)]
    #[token("return", |_| Keyword::Return)]
    #[token("break", |_| Keyword::Break)]
    #[token("continue", |_| Keyword::Continue)]
    Keyword(Keyword),

    #[token("{", |_| Punct::LBrace)]
    #[token("}", |_| Punct::RBrace)]
    #[token("(", |_| Punct::LParen)]
    #[token(")", |_| Punct::RParen)]
    #[token("[", |_| Punct::LBracket)]
    #[token("]", |_| Punct::RBracket)]
    #[token(";", |_| Punct::Semicolon)]
    #[token(",", |_| Punct::Comma)]
    #[token("=", |_| Punct::Assign)]
    #[token("+", |_| Punct::Plus)]
    #[token("-", |_| Punct::Minus)]
    #[token("*", |_| Punct::Star)]
    #[token("/", |_| Punct::Slash)]
    #[token("%", |_| Punct::Percent)]
    #[token("&", |_| Punct::Amp)]
    #[token("&&", |_| Punct::AndAnd)]
    #[token("|", |_| Punct::Pipe)]
    #[token("||", |_| Punct::PipePipe)]
    #[token("^", |_| Punct::Caret)]
    #[token("~", |_| Punct::Tilde)]
    #[token("!", |_| Punct::Bang)]
    #[token("++", |_| Punct::Inc)]
    #[token("--", |_| Punct::Dec)]
    #[token("<", |_| Punct::Lt)]
    #[token("<=", |_| Punct::Le)]
    #[token("==", |_| Punct::EqEq)]
    #[token("!=", |_| Punct::Ne)]
    #[token(">=", |_| Punct::Ge)]
    #[token(">", |_| Punct::Gt)]
    Punct(Punct),

    #[token("true", |_| true)]
    #[token("false", |_| false)]
    Bool(bool),

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Double(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i32>().ok())]
    Int(i32),

    #[regex(r"'([^'\\\n]|\\.)'", |lex| unescape_char(lex.slice()))]
    Char(char),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| unescape_str(lex.slice()))]
    Str(String),

    // Dotted names reach the symbol table whole, e.g. `System.Math.Abs`
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"[ \t\r\n\f]+", priority = 2)]
    Whitespace,
    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r"/\*[^*]*\*+([^/*][^*]*\*+)*/", priority = 2)]
    BlockComment,
}

fn unescape(ch: char) -> Option<char> {
    match ch {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '\'' => Some('\''),
        '"' => Some('"'),
        _ => None,
    }
}

fn unescape_str(slice: &str) -> Option<String> {
    let body = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            out.push(unescape(chars.next()?)?);
        } else {
            out.push(ch);
        }
    }
    Some(out)
}

fn unescape_char(slice: &str) -> Option<char> {
    let text = unescape_str(slice)?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

/// A lexical token as seen by the parser
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Keyword(Keyword),
    Punct(Punct),
    Int(i32),
    Double(f64),
    Bool(bool),
    Char(char),
    Str(String),
    /// Source text no rule accepts
    Unknown(String),
    Eof,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof)
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Token::Int(_) | Token::Double(_) | Token::Bool(_) | Token::Char(_) | Token::Str(_)
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "identifier '{}'", name),
            Token::Keyword(kw) => write!(f, "'{}'", kw.as_str()),
            Token::Punct(p) => write!(f, "'{}'", p.as_str()),
            Token::Int(v) => write!(f, "integer {}", v),
            Token::Double(v) => write!(f, "double {}", v),
            Token::Bool(v) => write!(f, "boolean {}", v),
            Token::Char(c) => write!(f, "character {:?}", c),
            Token::Str(s) => write!(f, "string {:?}", s),
            Token::Unknown(text) => write!(f, "unrecognized input '{}'", text),
            Token::Eof => write!(f, "end of file"),
        }
    }
}

impl From<RawToken> for Token {
    fn from(raw: RawToken) -> Self {
        match raw {
            RawToken::Keyword(kw) => Token::Keyword(kw),
            RawToken::Punct(p) => Token::Punct(p),
            RawToken::Bool(v) => Token::Bool(v),
            RawToken::Double(v) => Token::Double(v),
            RawToken::Int(v) => Token::Int(v),
            RawToken::Char(c) => Token::Char(c),
            RawToken::Str(s) => Token::Str(s),
            RawToken::Ident(name) => Token::Ident(name),
            // filtered before conversion
            RawToken::Whitespace | RawToken::LineComment | RawToken::BlockComment => {
                Token::Unknown(String::new())
            }
        }
    }
}

/// Lexical token with location information
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalToken {
    pub token: Token,
    pub location: Location,
}

impl LexicalToken {
    pub fn new(token: Token, location: Location) -> Self {
        Self { token, location }
    }

    /// Get the token type
    pub fn token_type(&self) -> &Token {
        &self.token
    }

    /// Get the location
    pub fn location(&self) -> Location {
        self.location
    }
}

/// Pull-based token source consumed by the parser.
///
/// Once input is exhausted every further call yields [`Token::Eof`].
pub trait TokenStream {
    fn next_token(&mut self) -> LexicalToken;
}

/// Scanner over a source string
pub struct Scanner<'a> {
    lexer: logos::Lexer<'a, RawToken>,
    location: Location,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: RawToken::lexer(source),
            location: Location::start(),
        }
    }

    /// Collect every token up to and including end of file
    pub fn tokenize(mut self) -> Vec<LexicalToken> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.token.is_eof();
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }
}

impl TokenStream for Scanner<'_> {
    fn next_token(&mut self) -> LexicalToken {
        loop {
            let Some(result) = self.lexer.next() else {
                return LexicalToken::new(Token::Eof, self.location);
            };
            let slice = self.lexer.slice();
            let location = self.location;
            self.location.advance_str(slice);

            match result {
                Ok(RawToken::Whitespace | RawToken::LineComment | RawToken::BlockComment) => continue,
                Ok(raw) => return LexicalToken::new(raw.into(), location),
                Err(()) => {
                    log::trace!("unrecognized input {:?} at {}", slice, location);
                    return LexicalToken::new(Token::Unknown(slice.to_string()), location);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        Scanner::new(source)
            .tokenize()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_lexer_keywords_and_identifiers() {
        let tokens = kinds("while loop infinite int x");
        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::While),
                Token::Keyword(Keyword::Loop),
                Token::Keyword(Keyword::Infinite),
                Token::Ident("int".into()),
                Token::Ident("x".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_literals() {
        let tokens = kinds(r#"42 3.5 true 'a' "hi\n""#);
        assert_eq!(tokens[0], Token::Int(42));
        assert_eq!(tokens[1], Token::Double(3.5));
        assert_eq!(tokens[2], Token::Bool(true));
        assert_eq!(tokens[3], Token::Char('a'));
        assert_eq!(tokens[4], Token::Str("hi\n".into()));
    }

    #[test]
    fn test_lexer_escaped_char_literals() {
        let tokens = kinds(r"'\n' '\'' 'ab'");
        assert_eq!(tokens[0], Token::Char('\n'));
        assert_eq!(tokens[1], Token::Char('\''));
        assert!(!matches!(tokens[2], Token::Char(_)));
    }

    #[test]
    fn test_lexer_operators_prefer_longest() {
        let tokens = kinds("++ + <= < && & || |");
        assert_eq!(tokens[0], Token::Punct(Punct::Inc));
        assert_eq!(tokens[1], Token::Punct(Punct::Plus));
        assert_eq!(tokens[2], Token::Punct(Punct::Le));
        assert_eq!(tokens[3], Token::Punct(Punct::Lt));
        assert_eq!(tokens[4], Token::Punct(Punct::AndAnd));
        assert_eq!(tokens[5], Token::Punct(Punct::Amp));
        assert_eq!(tokens[6], Token::Punct(Punct::PipePipe));
        assert_eq!(tokens[7], Token::Punct(Punct::Pipe));
    }

    #[test]
    fn test_lexer_dotted_identifier() {
        let tokens = kinds("System.Math.Abs(1)");
        assert_eq!(tokens[0], Token::Ident("System.Math.Abs".into()));
        assert_eq!(tokens[1], Token::Punct(Punct::LParen));
    }

    #[test]
    fn test_lexer_comments_are_skipped() {
        let tokens = kinds("// line\n/* block */ x");
        assert_eq!(tokens, vec![Token::Ident("x".into()), Token::Eof]);
    }

    #[test]
    fn test_lexer_locations() {
        let tokens = Scanner::new("a\n  b").tokenize();
        assert_eq!((tokens[0].location.line, tokens[0].location.column), (1, 1));
        assert_eq!((tokens[1].location.line, tokens[1].location.column), (2, 3));
    }

    #[test]
    fn test_lexer_unknown_input_and_eof_repeats() {
        let mut scanner = Scanner::new("@");
        assert_eq!(scanner.next_token().token, Token::Unknown("@".into()));
        assert!(scanner.next_token().token.is_eof());
        assert!(scanner.next_token().token.is_eof());
    }
}
