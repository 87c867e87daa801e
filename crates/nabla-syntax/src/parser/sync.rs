//! Synchronization sets used for error recovery.
//!
//! When no production matches, the parser skips tokens until the current
//! one is in the set for the context it is in. Each set is the first tokens
//! of whatever may legally come next at that nesting level.

use crate::lexer::TokenKind::{self, *};

/// A set of token kinds, one bit per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSet(u32);

const _: () = assert!((TokenKind::Eof as u32) < 32);

impl SyncSet {
    pub const fn of(kinds: &[TokenKind]) -> Self {
        let mut bits = 0;
        let mut idx = 0;
        while idx < kinds.len() {
            bits |= 1 << kinds[idx] as u32;
            idx += 1;
        }
        SyncSet(bits)
    }

    pub const fn with(self, kinds: &[TokenKind]) -> Self {
        SyncSet(self.0 | Self::of(kinds).0)
    }

    pub const fn contains(self, kind: TokenKind) -> bool {
        self.0 & (1 << kind as u32) != 0
    }
}

/// Start of the next global.
pub const GLOBAL: SyncSet = SyncSet::of(&[Use, Def, Let, LCurly, LBracket, Ident, Eof]);

/// Inside `use a::{ ... }`.
pub const USE_ITEMS: SyncSet = GLOBAL.with(&[Star, As, RCurly]);

/// After a malformed expression in a def, let or list.
pub const EXPR: SyncSet = GLOBAL.with(&[Eq, RCurly, RBracket, As]);

/// Inside a struct body.
pub const STRUCT_FIELDS: SyncSet = EXPR.with(&[Pipe]);
