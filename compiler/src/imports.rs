//! Builds the Import Table of one file: local binding name → module path and
//! originally exported name. Only top-level imports with a string-literal
//! module specifier are recorded; side-effect-only and namespace imports
//! (`import * as X`) are not.

use std::collections::HashMap;

use crate::ast::{SourceFile, Statement};

pub type ImportTable = HashMap<String, ImportItem>;

#[derive(Debug, Clone, PartialEq)]
pub struct ImportItem {
    pub path: String,
    /// The name under which the target file exports the binding;
    /// `"default"` for default imports.
    pub target_name: String,
}

pub fn script_imports(src: &SourceFile) -> ImportTable {
    let mut output = ImportTable::new();

    for statement in &src.statements {
        let decl = match statement {
            Statement::Import(decl) => decl,
            _ => continue,
        };
        let path = match &decl.module {
            Some(path) => path,
            None => continue,
        };

        // import A from '...'
        if let Some(name) = &decl.default_name {
            output.insert(
                name.clone(),
                ImportItem {
                    path: path.clone(),
                    target_name: "default".to_owned(),
                },
            );
        }

        // import { A } / import { A as B } from '...'
        for spec in &decl.named {
            output.insert(
                spec.name.clone(),
                ImportItem {
                    path: path.clone(),
                    target_name: spec.property.clone().unwrap_or_else(|| spec.name.clone()),
                },
            );
        }
    }

    output
}
