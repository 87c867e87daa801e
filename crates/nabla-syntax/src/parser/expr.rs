use super::{point, sync, Parser, SyncSet};
use crate::ast::*;
use crate::error::SyntaxError;
use crate::lexer::TokenKind;

impl<'t, 'src> Parser<'t, 'src> {
    //--------------------------------------------------------------------------
    // <Expr>  ::= <Single> ("|" <Single>)*
    //--------------------------------------------------------------------------

    pub(super) fn parse_expr(&mut self) -> Option<Expr> {
        self.nested(|p| {
            let first = p.parse_single()?;
            let start = first.span().offset();
            let mut alternatives = vec![first];
            while let Some(pipe) = p.eat(TokenKind::Pipe) {
                match p.attempt(|p| p.parse_single()) {
                    Some(single) => alternatives.push(single),
                    None if p.fatal.is_some() => return None,
                    None => p.error(SyntaxError::MissingUnionAlternative { span: pipe.span }),
                }
            }
            if alternatives.len() == 1 {
                return alternatives.pop().map(Expr::Single);
            }
            Some(Expr::Union(Union {
                alternatives,
                span: p.span_from(start),
            }))
        })
    }

    /// An expression is required here. On failure reports `ExpectedExpr` and
    /// skips to `sync`, yielding `Expr::Error`. `None` only after a fatal error.
    pub(super) fn expect_expr(&mut self, sync: SyncSet) -> Option<Expr> {
        self.expect_expr_or(sync, |found, span| SyntaxError::ExpectedExpr { found, span })
    }

    /// Same as [`Self::expect_expr`] after a `:`.
    pub(super) fn expect_type(&mut self, sync: SyncSet) -> Option<Expr> {
        self.expect_expr_or(sync, |found, span| SyntaxError::ExpectedType { found, span })
    }

    fn expect_expr_or(
        &mut self,
        sync: SyncSet,
        err: impl FnOnce(String, miette::SourceSpan) -> SyntaxError,
    ) -> Option<Expr> {
        if let Some(expr) = self.attempt(|p| p.parse_expr()) {
            return Some(expr);
        }
        if self.fatal.is_some() {
            return None;
        }
        let token = self.peek();
        self.error(err(token.kind.describe().to_string(), point(token.span)));
        Some(Expr::Error(self.recover_until(sync)))
    }

    //--------------------------------------------------------------------------
    // <Single> ::= <Struct> | <List> | <Named> | <Primitive>
    //--------------------------------------------------------------------------

    fn parse_single(&mut self) -> Option<Single> {
        if let Some(s) = self.attempt(|p| p.parse_struct()) {
            return Some(Single::Struct(s));
        }
        if let Some(list) = self.attempt(|p| p.parse_list()) {
            return Some(Single::List(list));
        }
        if let Some(named) = self.attempt(|p| p.parse_named()) {
            return Some(Single::Named(named));
        }
        self.attempt(|p| p.parse_primitive()).map(Single::Primitive)
    }

    //--------------------------------------------------------------------------
    // <Struct>      ::= "{" (<StructField> ","?)* "}"
    // <StructField> ::= <Ident> (":" <Expr>)? ("=" <Expr>)? <Alias>?
    //--------------------------------------------------------------------------

    fn parse_struct(&mut self) -> Option<Struct> {
        let open = self.eat(TokenKind::LCurly)?;
        self.nested(|p| {
            let mut fields = Vec::new();
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
                    TokenKind::Ident => fields.push(FieldEntry::Field(p.parse_struct_field()?)),
                    TokenKind::Eof
                    | TokenKind::Use
                    | TokenKind::Def
                    | TokenKind::Let
                    | TokenKind::RBracket => {
                        p.error(SyntaxError::MissingClosingCurly {
                            open: open.span,
                            span: point(token.span),
                        });
                        break;
                    }
                    _ => {
                        let node = p.skip_until(sync::STRUCT_FIELDS);
                        p.error(SyntaxError::UnexpectedTokens {
                            found: token.kind.describe().to_string(),
                            span: node.span,
                        });
                        fields.push(FieldEntry::Error(node));
                    }
                }
            }
            Some(Struct {
                fields,
                closed,
                span: p.span_from(open.span.offset()),
            })
        })
    }

    fn parse_struct_field(&mut self) -> Option<StructField> {
        let name = self.eat_ident()?;
        let start = name.span.offset();
        let type_expr = match self.eat(TokenKind::Colon) {
            Some(_) => Some(self.expect_type(sync::STRUCT_FIELDS)?),
            None => None,
        };
        let expr = match self.eat(TokenKind::Eq) {
            Some(_) => Some(self.expect_expr(sync::STRUCT_FIELDS)?),
            None => None,
        };
        let alias = self.parse_alias();
        Some(StructField {
            name,
            type_expr,
            expr,
            alias,
            span: self.span_from(start),
        })
    }

    //--------------------------------------------------------------------------
    // <List> ::= "[" (<Expr> ","?)* "]"
    //--------------------------------------------------------------------------

    fn parse_list(&mut self) -> Option<List> {
        let open = self.eat(TokenKind::LBracket)?;
        self.nested(|p| {
            let mut exprs = Vec::new();
            let mut closed = false;
            loop {
                let token = p.peek();
                match token.kind {
                    TokenKind::RBracket => {
                        p.next();
                        closed = true;
                        break;
                    }
                    TokenKind::Comma => {
                        p.next();
                    }
                    TokenKind::Eof
                    | TokenKind::Use
                    | TokenKind::Def
                    | TokenKind::Let
                    | TokenKind::RCurly => {
                        p.error(SyntaxError::MissingClosingBracket {
                            open: open.span,
                            span: point(token.span),
                        });
                        break;
                    }
                    _ => match p.attempt(|p| p.parse_expr()) {
                        Some(expr) => exprs.push(expr),
                        None if p.fatal.is_some() => return None,
                        None => {
                            let node = p.skip_until(sync::EXPR);
                            p.error(SyntaxError::ExpectedExpr {
                                found: token.kind.describe().to_string(),
                                span: node.span,
                            });
                            exprs.push(Expr::Error(node));
                        }
                    },
                }
            }
            Some(List {
                exprs,
                closed,
                span: p.span_from(open.span.offset()),
            })
        })
    }

    //--------------------------------------------------------------------------
    // <Named> ::= <Ident> ("::" <Ident>)* (<Struct> | <List>)?
    //--------------------------------------------------------------------------

    fn parse_named(&mut self) -> Option<Named> {
        let first = self.eat_ident()?;
        let start = first.span.offset();
        let mut path = vec![first];
        while self.eat(TokenKind::DoubleColon).is_some() {
            match self.expect_ident() {
                Some(segment) => path.push(segment),
                None => break,
            }
        }
        let body = match self.peek().kind {
            TokenKind::LCurly => Some(StructOrList::Struct(self.parse_struct()?)),
            TokenKind::LBracket => Some(StructOrList::List(self.parse_list()?)),
            _ => None,
        };
        Some(Named {
            path,
            body,
            span: self.span_from(start),
        })
    }

    //--------------------------------------------------------------------------
    // <Primitive> ::= <String> | <Char> | <Number> | "true" | "false" | "null"
    //--------------------------------------------------------------------------

    fn parse_primitive(&mut self) -> Option<Primitive> {
        let token = self.peek();
        let span = token.span;
        let primitive = match token.kind {
            TokenKind::String => Primitive::String {
                value: token.string_value().to_string(),
                span,
            },
            TokenKind::Char => Primitive::Char {
                value: token.char_value(),
                span,
            },
            TokenKind::Number => Primitive::Number {
                value: token.lexeme.to_string(),
                span,
            },
            TokenKind::True => Primitive::Bool { value: true, span },
            TokenKind::False => Primitive::Bool { value: false, span },
            TokenKind::Null => Primitive::Null { span },
            _ => return None,
        };
        self.next();
        Some(primitive)
    }
}
