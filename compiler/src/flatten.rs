//! Flattens a parsed file into its Declaration Table: a mapping from dotted
//! declaration name to syntax node plus export flag. Namespaces are recursed
//! into and their children re-keyed as `Namespace.Child`; re-exports become
//! reference aliases. Statements with no schema meaning are skipped here,
//! never rejected; only compiling a selected declaration can fail.

use std::collections::BTreeMap;

use crate::ast::{EnumDecl, InterfaceDecl, SourceFile, Statement, TypeNode};

pub type DeclTable = BTreeMap<String, FlatDecl>;

#[derive(Debug, Clone, PartialEq)]
pub struct FlatDecl {
    pub node: DeclNode,
    pub is_export: bool,
}

/// What a flattened declaration holds: a type alias contributes its aliased
/// type node rather than the alias wrapper, and synthesized re-export or
/// default entries are bare reference nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclNode {
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    Type(TypeNode),
}

/// Builds the Declaration Table for one file. `is_export` is the ambient
/// export context; a declaration is exported only if every enclosing scope
/// allows it and the declaration itself carries the modifier.
pub fn flatten_source(src: &SourceFile, is_export: bool) -> DeclTable {
    flatten_statements(&src.statements, is_export)
}

fn flatten_statements(statements: &[Statement], is_export: bool) -> DeclTable {
    let mut output = DeclTable::new();

    // Bare `export { A }` names are applied as a post-pass; the export list
    // may appear before the declaration it marks.
    let mut export_names: Vec<String> = Vec::new();

    for statement in statements {
        match statement {
            Statement::Interface(decl) => {
                insert_named(
                    &mut output,
                    &decl.name,
                    DeclNode::Interface(decl.clone()),
                    is_export && decl.export,
                    decl.is_default,
                );
            }
            Statement::TypeAlias(decl) => {
                insert_named(
                    &mut output,
                    &decl.name,
                    DeclNode::Type(decl.type_.clone()),
                    is_export && decl.export,
                    decl.is_default,
                );
            }
            Statement::Enum(decl) => {
                insert_named(
                    &mut output,
                    &decl.name,
                    DeclNode::Enum(decl.clone()),
                    is_export && decl.export,
                    decl.is_default,
                );
            }
            Statement::Namespace(ns) => {
                let ns_export = is_export && ns.export;
                for (child_name, child) in flatten_statements(&ns.statements, ns_export) {
                    output.insert(format!("{}.{}", ns.name, child_name), child);
                }
            }
            Statement::ExportNamed(decl) => {
                for spec in &decl.specifiers {
                    match &spec.property {
                        // export { A as B }: B is a new, always-exported
                        // alias referencing A.
                        Some(property) => {
                            output.insert(
                                spec.name.clone(),
                                FlatDecl {
                                    node: DeclNode::Type(TypeNode::reference(property)),
                                    is_export: true,
                                },
                            );
                        }
                        // export { A }
                        None => export_names.push(spec.name.clone()),
                    }
                }
            }
            Statement::ExportDefault { expression } => {
                output.insert(
                    "default".to_owned(),
                    FlatDecl {
                        node: DeclNode::Type(TypeNode::reference(expression)),
                        is_export: true,
                    },
                );
            }
            // `export = X`, imports, and anything unrecognized contribute no
            // declarations.
            Statement::Import(_)
            | Statement::ExportEquals { .. }
            | Statement::Unsupported { .. } => {}
        }
    }

    for name in export_names {
        if let Some(decl) = output.get_mut(&name) {
            decl.is_export = true;
        }
    }

    output
}

/// A named declaration. With `export default`, the declaration itself stays
/// unexported and a synthetic exported `default` reference takes its place.
fn insert_named(
    output: &mut DeclTable,
    name: &str,
    node: DeclNode,
    is_export: bool,
    is_default: bool,
) {
    let is_export_default = is_export && is_default;
    output.insert(
        name.to_owned(),
        FlatDecl {
            node,
            is_export: is_export && !is_export_default,
        },
    );
    if is_export_default {
        output.insert(
            "default".to_owned(),
            FlatDecl {
                node: DeclNode::Type(TypeNode::reference(name)),
                is_export: true,
            },
        );
    }
}
