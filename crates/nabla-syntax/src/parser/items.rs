use super::{point, sync, Parser};
use crate::ast::*;
use crate::error::SyntaxError;
use crate::lexer::TokenKind;

impl<'t, 'src> Parser<'t, 'src> {
    //--------------------------------------------------------------------------
    // <Global> ::= <Use> | <Def> | <Let> | <Expr>
    //--------------------------------------------------------------------------

    pub(super) fn parse_global(&mut self) -> Option<Global> {
        match self.peek().kind {
            TokenKind::Use => self.parse_use().map(Global::Use),
            TokenKind::Def => {
                let (name, type_expr, expr, span) = self.parse_binding()?;
                Some(Global::Def(Def { name, type_expr, expr, span }))
            }
            TokenKind::Let => {
                let (name, type_expr, expr, span) = self.parse_binding()?;
                Some(Global::Let(Let { name, type_expr, expr, span }))
            }
            _ => self.attempt(|p| p.parse_expr()).map(Global::Init),
        }
    }

    //--------------------------------------------------------------------------
    // <Def> ::= "def" <Ident> (":" <Expr>)? ("=" <Expr>)?
    // <Let> ::= "let" <Ident> (":" <Expr>)? ("=" <Expr>)?
    //--------------------------------------------------------------------------

    #[allow(clippy::type_complexity)]
    fn parse_binding(
        &mut self,
    ) -> Option<(Option<Ident>, Option<Expr>, Option<Expr>, miette::SourceSpan)> {
        let keyword = self.next();
        let start = keyword.span.offset();
        let name = self.expect_ident();
        let type_expr = match self.eat(TokenKind::Colon) {
            Some(_) => Some(self.expect_type(sync::EXPR)?),
            None => None,
        };
        let expr = match self.eat(TokenKind::Eq) {
            Some(_) => Some(self.expect_expr(sync::EXPR)?),
            None => None,
        };
        Some((name, type_expr, expr, self.span_from(start)))
    }

    //--------------------------------------------------------------------------
    // <Use>      ::= "use" <Ident> ("::" <UseBody>)? <Alias>?
    // <UseBody>  ::= "*" | <UseItem> | "{" <UseItem>* "}"
    // <UseItem>  ::= <Ident> ("::" <UseBody>)? <Alias>?
    //--------------------------------------------------------------------------

    fn parse_use(&mut self) -> Option<Use> {
        let keyword = self.next();
        let start = keyword.span.offset();
        let root = self.expect_ident();
        let body = match self.eat(TokenKind::DoubleColon) {
            Some(_) => Some(self.parse_use_body()?),
            None => None,
        };
        let alias = self.parse_alias();
        Some(Use {
            root,
            body,
            alias,
            span: self.span_from(start),
        })
    }

    fn parse_use_body(&mut self) -> Option<UseBody> {
        let token = self.peek();
        match token.kind {
            TokenKind::Star => {
                self.next();
                Some(UseBody::All(token.span))
            }
            TokenKind::Ident => self
                .parse_use_item()
                .map(|item| UseBody::Single(Box::new(item))),
            TokenKind::LCurly => self.parse_use_items().map(UseBody::Multiple),
            _ => {
                self.error(SyntaxError::ExpectedUseItem {
                    found: token.kind.describe().to_string(),
                    span: point(token.span),
                });
                Some(UseBody::Error(self.recover_until(sync::USE_ITEMS)))
            }
        }
    }

    fn parse_use_item(&mut self) -> Option<UseItem> {
        self.nested(|p| {
            let name = p.eat_ident()?;
            let start = name.span.offset();
            let body = match p.eat(TokenKind::DoubleColon) {
                Some(_) => Some(p.parse_use_body()?),
                None => None,
            };
            let alias = p.parse_alias();
            Some(UseItem {
                name,
                body,
                alias,
                span: p.span_from(start),
            })
        })
    }

    fn parse_use_items(&mut self) -> Option<UseItems> {
        let open = self.eat(TokenKind::LCurly)?;
        self.nested(|p| {
            let mut items = Vec::new();
            let mut closed = false;
            loop {
                let token = p.peek();
                match token.kind {
                    TokenKind::RCurly => {
                        p.next();
                        closed = true;
                        break;
                    }
                    TokenKind::Comma => {
                        p.next();
                    }
                    TokenKind::Ident => items.push(UseEntry::Item(p.parse_use_item()?)),
                    TokenKind::Eof | TokenKind::Use | TokenKind::Def | TokenKind::Let => {
                        p.error(SyntaxError::MissingClosingCurly {
                            open: open.span,
                            span: point(token.span),
                        });
                        break;
                    }
                    _ => {
                        let node = p.skip_until(sync::USE_ITEMS);
                        p.error(SyntaxError::UnexpectedTokens {
                            found: token.kind.describe().to_string(),
                            span: node.span,
                        });
                        items.push(UseEntry::Error(node));
                    }
                }
            }
            Some(UseItems {
                items,
                closed,
                span: p.span_from(open.span.offset()),
            })
        })
    }

    //--------------------------------------------------------------------------
    // <Alias> ::= "as" (<String> | <Ident>)
    //--------------------------------------------------------------------------

    pub(super) fn parse_alias(&mut self) -> Option<Alias> {
        let keyword = self.eat(TokenKind::As)?;
        let token = self.peek();
        let name = match token.kind {
            TokenKind::String => {
                self.next();
                Some(AliasName::String {
                    value: token.string_value().to_string(),
                    span: token.span,
                })
            }
            TokenKind::Ident => self.eat_ident().map(AliasName::Ident),
            _ => {
                self.error(SyntaxError::ExpectedAliasName {
                    found: token.kind.describe().to_string(),
                    span: point(token.span),
                });
                None
            }
        };
        Some(Alias {
            name,
            span: self.span_from(keyword.span.offset()),
        })
    }
}
