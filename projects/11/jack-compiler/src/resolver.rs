//! Name resolution over the concrete syntax tree.
//!
//! One ordered walk of the class: declarations are entered into the symbol
//! table as they are met, and every identifier leaf gets an [`IdentInfo`].
//! Variables carry a copy of their `(kind, type, index)` triple, so the tree
//! stays valid after the subroutine scope is cleared.

use crate::error::Result;
use crate::symbol_table::SymbolTable;
use jack_analyzer::token::{Keyword, Token};
use jack_analyzer::tree::{IdentCategory, IdentInfo, Node, NodeKind, NonTerminal, VarKind};

/// Annotate every identifier in `class`.
pub fn resolve(class: &mut NonTerminal) -> Result<()> {
    let mut resolver = Resolver {
        symbols: SymbolTable::new(),
    };
    resolver.visit(class, NodeKind::Class)
}

struct Resolver {
    symbols: SymbolTable,
}

/// Attach `info` to the single identifier of a wrapper such as `varName`.
fn annotate(node: &mut NonTerminal, info: IdentInfo) {
    if let Some(Node::Terminal(t)) = node.children.first_mut() {
        t.ident = Some(info);
    }
}

impl Resolver {
    fn visit(&mut self, node: &mut NonTerminal, parent: NodeKind) -> Result<()> {
        match node.kind {
            NodeKind::Class => {
                let name = node
                    .child(NodeKind::ClassName)
                    .map(NonTerminal::text)
                    .unwrap_or_default();
                self.symbols.start_class(&name);
                self.visit_children(node)
            }
            NodeKind::ClassVarDec => {
                let kind = if node.keyword() == Some(Keyword::Static) {
                    VarKind::Static
                } else {
                    VarKind::Field
                };
                self.declare(node, kind)
            }
            NodeKind::VarDec => self.declare(node, VarKind::Var),
            NodeKind::ParameterList => self.declare(node, VarKind::Argument),
            NodeKind::SubroutineDec => {
                self.symbols.start_subroutine();
                if node.keyword() == Some(Keyword::Method) {
                    let class_name = self.symbols.class_name().to_string();
                    self.symbols
                        .define("this", &class_name, VarKind::Argument, node.span())?;
                }
                self.visit_children(node)
            }
            NodeKind::ClassName => {
                annotate(node, Self::info(IdentCategory::Class, parent));
                Ok(())
            }
            NodeKind::SubroutineName => {
                annotate(node, Self::info(IdentCategory::Sub, parent));
                Ok(())
            }
            NodeKind::VarName => {
                let info = self.lookup(&node.text(), parent);
                annotate(node, info);
                Ok(())
            }
            NodeKind::SubroutineCall => {
                // `qualifier.name(...)`: the bare qualifier is a variable or a class
                if let Some(Node::Terminal(t)) = node.children.first_mut()
                    && let Token::Identifier(name) = &t.token
                {
                    t.ident = Some(self.lookup(name, NodeKind::SubroutineCall));
                }
                self.visit_children(node)
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: &mut NonTerminal) -> Result<()> {
        let kind = node.kind;
        for child in &mut node.children {
            if let Node::NonTerminal(inner) = child {
                self.visit(inner, kind)?;
            }
        }
        Ok(())
    }

    /// `type name (',' name)*` or `type name (',' type name)*`: each name
    /// takes the most recent type.
    fn declare(&mut self, node: &mut NonTerminal, kind: VarKind) -> Result<()> {
        let parent = node.kind;
        let mut ty = String::new();
        for child in &mut node.children {
            let Node::NonTerminal(inner) = child else {
                continue;
            };
            match inner.kind {
                NodeKind::Type => {
                    ty = inner.text();
                    self.visit(inner, parent)?;
                }
                NodeKind::VarName => {
                    let var = self
                        .symbols
                        .define(&inner.text(), &ty, kind, inner.span())?;
                    annotate(
                        inner,
                        IdentInfo {
                            category: kind.into(),
                            declaration: true,
                            symbol: Some(var),
                        },
                    );
                }
                _ => self.visit(inner, parent)?,
            }
        }
        Ok(())
    }

    /// Variables resolve through the symbol table; a miss names a class.
    fn lookup(&self, name: &str, parent: NodeKind) -> IdentInfo {
        match self.symbols.lookup(name) {
            Some(symbol) => IdentInfo {
                category: symbol.kind.into(),
                declaration: parent.is_declaration(),
                symbol: Some(symbol.resolved()),
            },
            None => Self::info(IdentCategory::Class, parent),
        }
    }

    /// Metadata for a class or subroutine name. `parent` is the identifier's
    /// grandparent in the tree.
    fn info(category: IdentCategory, parent: NodeKind) -> IdentInfo {
        IdentInfo {
            category,
            declaration: parent.is_declaration(),
            symbol: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use jack_analyzer::tree::{ResolvedVar, Terminal};

    fn resolved(source: &str) -> NonTerminal {
        let mut class = jack_analyzer::parse(source).unwrap();
        resolve(&mut class).unwrap();
        class
    }

    fn idents<'a>(class: &'a NonTerminal, name: &str) -> Vec<&'a Terminal> {
        class
            .terminals()
            .into_iter()
            .filter(|t| t.token.as_identifier() == Some(name))
            .collect()
    }

    const POINT: &str = "\
class Point {
    field int x, y;
    static Point origin;

    constructor Point new(int ax, int ay) {
        let x = ax;
        let y = ay;
        return this;
    }

    method int dist(Point other) {
        var int dx;
        let dx = x - other.getX();
        return Math.abs(dx);
    }
}";

    #[test]
    fn test_field_declaration_and_use() {
        let class = resolved(POINT);
        let xs = idents(&class, "x");
        assert_eq!(xs.len(), 3);

        let decl = xs[0].ident.as_ref().unwrap();
        assert_eq!(decl.category, IdentCategory::Field);
        assert!(decl.declaration);
        assert_eq!(
            decl.symbol,
            Some(ResolvedVar {
                kind: VarKind::Field,
                ty: "int".to_string(),
                index: 0,
            })
        );

        let use_site = xs[1].ident.as_ref().unwrap();
        assert_eq!(use_site.category, IdentCategory::Field);
        assert!(!use_site.declaration);
    }

    #[test]
    fn test_method_arguments_start_at_one() {
        let class = resolved(POINT);
        let other = idents(&class, "other");
        let symbol = other[1].ident.as_ref().unwrap().symbol.as_ref().unwrap();
        assert_eq!(symbol.kind, VarKind::Argument);
        assert_eq!(symbol.ty, "Point");
        assert_eq!(symbol.index, 1);
    }

    #[test]
    fn test_constructor_arguments_start_at_zero() {
        let class = resolved(POINT);
        let ax = idents(&class, "ax");
        assert_eq!(ax[0].ident.as_ref().unwrap().symbol.as_ref().unwrap().index, 0);
        let ay = idents(&class, "ay");
        assert_eq!(ay[1].ident.as_ref().unwrap().category, IdentCategory::Arg);
    }

    #[test]
    fn test_class_and_subroutine_names() {
        let class = resolved(POINT);

        let point = idents(&class, "Point");
        // class declaration, static type, constructor return type, parameter type
        let declarations: Vec<bool> = point
            .iter()
            .map(|t| t.ident.as_ref().unwrap().declaration)
            .collect();
        assert_eq!(declarations, vec![true, false, false, false]);
        assert!(
            point
                .iter()
                .all(|t| t.ident.as_ref().unwrap().category == IdentCategory::Class)
        );

        let dist = idents(&class, "dist")[0].ident.as_ref().unwrap();
        assert_eq!(dist.category, IdentCategory::Sub);
        assert!(dist.declaration);

        let get_x = idents(&class, "getX")[0].ident.as_ref().unwrap();
        assert_eq!(get_x.category, IdentCategory::Sub);
        assert!(!get_x.declaration);
    }

    #[test]
    fn test_call_qualifiers() {
        let class = resolved(POINT);
        let math = idents(&class, "Math")[0].ident.as_ref().unwrap();
        assert_eq!(math.category, IdentCategory::Class);
        assert!(math.symbol.is_none());
    }

    #[test]
    fn test_local_shadows_field() {
        let class = resolved(
            "class A { field int n; method int f() { var boolean n; return n; } }",
        );
        let n = idents(&class, "n");
        let use_site = n[2].ident.as_ref().unwrap();
        assert_eq!(use_site.category, IdentCategory::Var);
        assert_eq!(use_site.symbol.as_ref().unwrap().ty, "boolean");
    }

    #[test]
    fn test_scope_cleared_between_subroutines() {
        let class = resolved(
            "class A { function void f() { var int a; return; } function void g() { let a = 1; return; } }",
        );
        let a = idents(&class, "a");
        assert!(a[1].ident.as_ref().unwrap().symbol.is_none());
    }

    #[test]
    fn test_duplicate_local() {
        let mut class =
            jack_analyzer::parse("class A {\n function void f(int a) {\n var int a;\n return;\n }\n}")
                .unwrap();
        let err = resolve(&mut class).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateDefinition { .. }));
        assert_eq!(err.line(), Some(3));
    }
}
