pub mod token;
pub mod lexer;

pub use token::*;
pub use lexer::*;

#[cfg(test)]
mod tests {
    use crate::error::LexWarning;
    use crate::lexer::{lex, lex_warnings, TokenKind};
    use miette::SourceSpan;

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input)
            .iter()
            .map(|t| t.kind)
            .filter(|k| !k.is_trivia())
            .collect()
    }

    #[test]
    fn test_lex_symbols() {
        assert_eq!(
            kinds("[ ] { } :: : * | = ,"),
            vec![
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LCurly,
                TokenKind::RCurly,
                TokenKind::DoubleColon,
                TokenKind::Colon,
                TokenKind::Star,
                TokenKind::Pipe,
                TokenKind::Eq,
                TokenKind::Comma,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_need_a_boundary() {
        assert_eq!(
            kinds("use user def define let letter as ask true trueish null nullable false"),
            vec![
                TokenKind::Use,
                TokenKind::Ident,
                TokenKind::Def,
                TokenKind::Ident,
                TokenKind::Let,
                TokenKind::Ident,
                TokenKind::As,
                TokenKind::Ident,
                TokenKind::True,
                TokenKind::Ident,
                TokenKind::Null,
                TokenKind::Ident,
                TokenKind::False,
                TokenKind::Eof,
            ]
        );
        assert_eq!(kinds("use::x"), vec![TokenKind::Use, TokenKind::DoubleColon, TokenKind::Ident, TokenKind::Eof]);
    }

    #[test]
    fn test_lex_literals() {
        let tokens = lex(r#""out/" 'x' '\n' 42 3.14 _name"#);
        let significant: Vec<_> = tokens.iter().filter(|t| !t.kind.is_trivia()).collect();
        assert_eq!(significant[0].kind, TokenKind::String);
        assert_eq!(significant[0].string_value(), "out/");
        assert_eq!(significant[1].kind, TokenKind::Char);
        assert_eq!(significant[1].char_value(), "x");
        assert_eq!(significant[2].char_value(), "\n");
        assert_eq!(significant[3].lexeme, "42");
        assert_eq!(significant[4].lexeme, "3.14");
        assert_eq!(significant[5].kind, TokenKind::Ident);
        assert!(lex_warnings(&tokens).is_empty());
    }

    #[test]
    fn test_trivia_is_kept() {
        let tokens = lex("a // note\nb");
        let all: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            all,
            vec![
                TokenKind::Ident,
                TokenKind::Whitespace,
                TokenKind::Comment,
                TokenKind::Whitespace,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[2].lexeme, "// note");
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let tokens = lex("\"abc\ndef");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].string_value(), "abc\ndef");
        assert_eq!(
            lex_warnings(&tokens),
            vec![LexWarning::UnterminatedString { span: SourceSpan::new(0.into(), 8) }]
        );
    }

    #[test]
    fn test_unterminated_char_is_flagged_and_lexing_continues() {
        let tokens = lex("'a b");
        assert_eq!(tokens[0].kind, TokenKind::Char);
        assert_eq!(tokens[0].lexeme, "'a");
        assert_eq!(tokens[2].kind, TokenKind::Ident);
        assert_eq!(
            lex_warnings(&tokens),
            vec![LexWarning::UnterminatedChar { span: SourceSpan::new(0.into(), 2) }]
        );
    }

    #[test]
    fn test_missing_decimals() {
        let tokens = lex("1.");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, "1.");
        assert_eq!(
            lex_warnings(&tokens),
            vec![LexWarning::MissingDecimals { span: SourceSpan::new(0.into(), 2) }]
        );
    }

    #[test]
    fn test_unknown_characters_become_tokens() {
        let tokens = lex("a # ü");
        let unknown: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Unknown)
            .map(|t| t.lexeme)
            .collect();
        assert_eq!(unknown, vec!["#", "ü"]);
        assert_eq!(lex_warnings(&tokens).len(), 2);
    }

    #[test]
    fn test_lexemes_cover_input() {
        let input = "def Ä = { x: 'q' } // trailing\n\"open";
        let rebuilt: String = lex(input).iter().map(|t| t.lexeme).collect();
        assert_eq!(rebuilt, input);
    }

    #[test]
    fn test_lex_empty_input() {
        let tokens = lex("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }
}
