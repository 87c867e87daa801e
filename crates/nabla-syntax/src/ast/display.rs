use std::fmt::{self, Display, Formatter};

use super::*;

fn join<T: Display>(f: &mut Formatter<'_>, items: impl IntoIterator<Item = T>, sep: &str) -> fmt::Result {
    for (idx, item) in items.into_iter().enumerate() {
        if idx > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn opt_name(f: &mut Formatter<'_>, name: &Option<Ident>) -> fmt::Result {
    match name {
        Some(ident) => f.write_str(&ident.name),
        None => f.write_str("_"),
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        join(f, &self.globals, "\n")
    }
}

impl Display for Global {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Global::Use(u) => write!(f, "{u}"),
            Global::Def(def) => {
                f.write_str("def ")?;
                binding(f, &def.name, &def.type_expr, &def.expr)
            }
            Global::Let(l) => {
                f.write_str("let ")?;
                binding(f, &l.name, &l.type_expr, &l.expr)
            }
            Global::Init(expr) => write!(f, "{expr}"),
            Global::Error(_) => f.write_str("<error>"),
        }
    }
}

fn binding(f: &mut Formatter<'_>, name: &Option<Ident>, ty: &Option<Expr>, expr: &Option<Expr>) -> fmt::Result {
    opt_name(f, name)?;
    if let Some(ty) = ty {
        write!(f, ": {ty}")?;
    }
    if let Some(expr) = expr {
        write!(f, " = {expr}")?;
    }
    Ok(())
}

impl Display for Alias {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(AliasName::String { value, .. }) => write!(f, " as \"{value}\""),
            Some(AliasName::Ident(ident)) => write!(f, " as {}", ident.name),
            None => f.write_str(" as ?"),
        }
    }
}

impl Display for Use {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("use ")?;
        opt_name(f, &self.root)?;
        if let Some(body) = &self.body {
            write!(f, "::{body}")?;
        }
        if let Some(alias) = &self.alias {
            write!(f, "{alias}")?;
        }
        Ok(())
    }
}

impl Display for UseBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            UseBody::All(_) => f.write_str("*"),
            UseBody::Single(item) => write!(f, "{item}"),
            UseBody::Multiple(items) => {
                f.write_str("{")?;
                join(f, &items.items, " ")?;
                f.write_str("}")
            }
            UseBody::Error(_) => f.write_str("<error>"),
        }
    }
}

impl Display for UseEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            UseEntry::Item(item) => write!(f, "{item}"),
            UseEntry::Error(_) => f.write_str("<error>"),
        }
    }
}

impl Display for UseItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name.name)?;
        if let Some(body) = &self.body {
            write!(f, "::{body}")?;
        }
        if let Some(alias) = &self.alias {
            write!(f, "{alias}")?;
        }
        Ok(())
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Union(union) => join(f, &union.alternatives, " | "),
            Expr::Single(single) => write!(f, "{single}"),
            Expr::Error(_) => f.write_str("<error>"),
        }
    }
}

impl Display for Single {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Single::Struct(s) => write!(f, "{s}"),
            Single::List(list) => write!(f, "{list}"),
            Single::Named(named) => write!(f, "{named}"),
            Single::Primitive(primitive) => write!(f, "{primitive}"),
        }
    }
}

impl Display for Struct {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        join(f, &self.fields, ", ")?;
        f.write_str("}")
    }
}

impl Display for FieldEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FieldEntry::Field(field) => {
                f.write_str(&field.name.name)?;
                if let Some(ty) = &field.type_expr {
                    write!(f, ": {ty}")?;
                }
                if let Some(expr) = &field.expr {
                    write!(f, " = {expr}")?;
                }
                if let Some(alias) = &field.alias {
                    write!(f, "{alias}")?;
                }
                Ok(())
            }
            FieldEntry::Error(_) => f.write_str("<error>"),
        }
    }
}

impl Display for List {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        join(f, &self.exprs, ", ")?;
        f.write_str("]")
    }
}

impl Display for Named {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())?;
        match &self.body {
            Some(StructOrList::Struct(s)) => write!(f, " {s}"),
            Some(StructOrList::List(list)) => write!(f, " {list}"),
            None => Ok(()),
        }
    }
}

impl Display for Primitive {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::String { value, .. } => write!(f, "\"{value}\""),
            Primitive::Char { value, .. } => write!(f, "'{value}'"),
            Primitive::Number { value, .. } => f.write_str(value),
            Primitive::Bool { value, .. } => write!(f, "{value}"),
            Primitive::Null { .. } => f.write_str("null"),
        }
    }
}
