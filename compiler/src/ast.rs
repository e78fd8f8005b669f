//! The parsed syntax-tree model the compiler consumes.
//!
//! Lexing and parsing of the host language are out of scope; a host supplies
//! an [`AstParser`] that turns raw source text into a [`SourceFile`]. The
//! tree is a closed tagged union covering exactly the node shapes the
//! compiler dispatches on. Constructs the compiler does not recognize are
//! represented as `Unsupported` so a host parser never has to drop input on
//! the floor; whether they matter is decided at compile time.
//!
//! The model is serde-(de)serializable; [`JsonAstParser`] reads a tree that
//! was serialized to JSON, which is what the CLI and tests feed in.

use std::fmt;

use serde::{Deserialize, Serialize};

use tybuf_schema::LiteralValue;

use crate::error::TybufError;

/// Turns raw source text into a syntax tree.
pub trait AstParser {
    fn parse(&self, source: &str) -> Result<SourceFile, TybufError>;
}

/// Parses a JSON-encoded [`SourceFile`].
pub struct JsonAstParser;

impl AstParser for JsonAstParser {
    fn parse(&self, source: &str) -> Result<SourceFile, TybufError> {
        serde_json::from_str(source).map_err(|e| TybufError::Parse(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceFile {
    #[serde(default)]
    pub statements: Vec<Statement>,
}

/// A top-level or namespace-level statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Statement {
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    Enum(EnumDecl),
    Namespace(NamespaceDecl),
    Import(ImportDecl),
    /// `export { A, B as C }`. Wildcard re-exports (`export * from`) are
    /// unsupported and arrive as [`Statement::Unsupported`].
    ExportNamed(ExportNamedDecl),
    /// `export default <identifier>` in expression position.
    ExportDefault { expression: String },
    /// `export = X`; recognized but skipped.
    ExportEquals { expression: String },
    Unsupported {
        #[serde(default)]
        description: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDecl {
    pub name: String,
    #[serde(default)]
    pub export: bool,
    /// Carries an `export default` modifier.
    #[serde(rename = "default", default)]
    pub is_default: bool,
    #[serde(default)]
    pub extends: Vec<TypeName>,
    #[serde(default)]
    pub members: Vec<InterfaceMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAliasDecl {
    pub name: String,
    #[serde(default)]
    pub export: bool,
    #[serde(rename = "default", default)]
    pub is_default: bool,
    #[serde(rename = "type")]
    pub type_: TypeNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDecl {
    pub name: String,
    #[serde(default)]
    pub export: bool,
    #[serde(rename = "default", default)]
    pub is_default: bool,
    #[serde(default)]
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumMember {
    pub name: String,
    #[serde(default)]
    pub initializer: Option<EnumInit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumInit {
    Number(f64),
    String(String),
    /// Any non-literal initializer; a hard error at compile time.
    Unsupported { kind: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceDecl {
    pub name: String,
    #[serde(default)]
    pub export: bool,
    #[serde(default)]
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDecl {
    /// The module specifier; `None` when it is not a string literal
    /// (such imports are skipped).
    #[serde(default)]
    pub module: Option<String>,
    /// `import A from '...'`
    #[serde(default)]
    pub default_name: Option<String>,
    /// `import { A, B as C } from '...'`
    #[serde(default)]
    pub named: Vec<ImportSpecifier>,
    /// `import * as X from '...'`; recorded here but never bound.
    #[serde(default)]
    pub namespace: Option<String>,
}

/// `import { A as B }`: `property` is `A`, `name` is the local binding `B`.
/// `import { A }`: `property` is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSpecifier {
    #[serde(default)]
    pub property: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportNamedDecl {
    #[serde(default)]
    pub specifiers: Vec<ExportSpecifier>,
}

/// `export { A as B }`: `property` is `A`, `name` is the exported name `B`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSpecifier {
    #[serde(default)]
    pub property: Option<String>,
    pub name: String,
}

/// A type expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TypeNode {
    Paren {
        #[serde(rename = "type")]
        type_: Box<TypeNode>,
    },
    Any,
    Boolean,
    Number,
    String,
    /// The non-primitive `object` keyword.
    Object,
    Literal {
        #[serde(default, skip_serializing_if = "LiteralValue::is_undefined")]
        literal: LiteralValue,
    },
    /// `T[]`
    Array {
        #[serde(rename = "elementType")]
        element_type: Box<TypeNode>,
    },
    Tuple {
        #[serde(rename = "elementTypes")]
        element_types: Vec<TypeNode>,
    },
    /// An inline object type literal.
    TypeLiteral {
        #[serde(default)]
        members: Vec<InterfaceMember>,
    },
    /// `T[K]`
    IndexedAccess {
        #[serde(rename = "objectType")]
        object_type: Box<TypeNode>,
        #[serde(rename = "indexType")]
        index_type: Box<TypeNode>,
    },
    Union {
        types: Vec<TypeNode>,
    },
    Intersection {
        types: Vec<TypeNode>,
    },
    /// A qualified-name reference, optionally with generic arguments.
    Reference {
        name: TypeName,
        #[serde(rename = "typeArguments", default)]
        type_args: Vec<TypeNode>,
    },
    Unsupported {
        #[serde(default)]
        description: String,
    },
}

impl TypeNode {
    pub fn reference(name: &str) -> TypeNode {
        TypeNode::Reference {
            name: TypeName::from_dotted(name),
            type_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum InterfaceMember {
    Property(PropertyMember),
    IndexSignature(IndexSignatureMember),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMember {
    pub name: PropertyName,
    #[serde(default)]
    pub optional: bool,
    /// Absent annotations are a hard error at compile time.
    #[serde(rename = "type", default)]
    pub type_: Option<TypeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyName {
    Ident(String),
    Computed(ComputedName),
}

/// A computed property name, kept only for the error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedName {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSignatureMember {
    #[serde(rename = "keyType", default)]
    pub key_type: Option<TypeNode>,
    #[serde(rename = "type", default)]
    pub type_: Option<TypeNode>,
}

/// A dotted qualified name, stored as path segments. The dotted string form
/// only appears at serialization boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TypeName {
    segments: Vec<String>,
}

impl TypeName {
    pub fn from_dotted(name: &str) -> Self {
        TypeName {
            segments: name.split('.').map(str::to_owned).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The leftmost segment, which is what import bindings are keyed by.
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    pub fn is_single(&self) -> bool {
        self.segments.len() == 1
    }

    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl From<String> for TypeName {
    fn from(s: String) -> Self {
        TypeName::from_dotted(&s)
    }
}

impl From<TypeName> for String {
    fn from(n: TypeName) -> Self {
        n.dotted()
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}
