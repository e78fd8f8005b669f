//! Turns one declaration's syntax node into its canonical [`Schema`].
//!
//! Compilation is pure and recursive; it never touches the file system. The
//! dispatch order is load-bearing for reference-shaped nodes: the fixed
//! buffer and scalar names, the built-in `Array<T>`, and the structural
//! operators (`Pick`/`Omit`/`Partial`/`Overwrite`) all parse as plain type
//! references and must be recognized before the generic reference fallback.

use std::collections::HashMap;

use lazy_static::lazy_static;

use tybuf_schema::{
    BufferArrayType, EnumMemberSchema, EnumValue, ExtendsEntry, IndexKeyType,
    IndexSignatureSchema, MemberSchema, PropertySchema, ScalarType, Schema, SchemaRef,
};

use crate::ast::{EnumDecl, EnumInit, InterfaceMember, PropertyName, TypeName, TypeNode};
use crate::error::TybufError;
use crate::flatten::DeclNode;
use crate::imports::ImportTable;

lazy_static! {
    /// The ten fixed scalar numeric type names.
    static ref SCALAR_TYPES: HashMap<&'static str, ScalarType> = HashMap::from([
        ("int8", ScalarType::Int8),
        ("int16", ScalarType::Int16),
        ("int32", ScalarType::Int32),
        ("int64", ScalarType::Int64),
        ("uint8", ScalarType::Uint8),
        ("uint16", ScalarType::Uint16),
        ("uint32", ScalarType::Uint32),
        ("uint64", ScalarType::Uint64),
        ("float32", ScalarType::Float32),
        ("float64", ScalarType::Float64),
    ]);

    /// The fixed buffer type names; the generic `ArrayBuffer` carries no
    /// element kind.
    static ref BUFFER_TYPES: HashMap<&'static str, Option<BufferArrayType>> = HashMap::from([
        ("ArrayBuffer", None),
        ("Int8Array", Some(BufferArrayType::Int8Array)),
        ("Int16Array", Some(BufferArrayType::Int16Array)),
        ("Int32Array", Some(BufferArrayType::Int32Array)),
        ("BigInt64Array", Some(BufferArrayType::BigInt64Array)),
        ("Uint8Array", Some(BufferArrayType::Uint8Array)),
        ("Uint16Array", Some(BufferArrayType::Uint16Array)),
        ("Uint32Array", Some(BufferArrayType::Uint32Array)),
        ("BigUint64Array", Some(BufferArrayType::BigUint64Array)),
        ("Float32Array", Some(BufferArrayType::Float32Array)),
        ("Float64Array", Some(BufferArrayType::Float64Array)),
    ]);
}

/// Compiles a flattened declaration.
pub fn compile_decl(node: &DeclNode, imports: &ImportTable) -> Result<Schema, TybufError> {
    match node {
        DeclNode::Interface(decl) => {
            compile_interface(Some(&decl.extends), &decl.members, imports)
        }
        DeclNode::Enum(decl) => compile_enum(decl),
        DeclNode::Type(node) => compile_type(node, imports),
    }
}

/// Compiles a type expression.
pub fn compile_type(node: &TypeNode, imports: &ImportTable) -> Result<Schema, TybufError> {
    match node {
        // Redundant parenthesization carries no meaning.
        TypeNode::Paren { type_ } => compile_type(type_, imports),
        TypeNode::Any => Ok(Schema::Any),
        TypeNode::Boolean => Ok(Schema::Boolean),
        TypeNode::Object => Ok(Schema::NonPrimitive),
        TypeNode::Number => Ok(Schema::Number { scalar_type: None }),
        TypeNode::String => Ok(Schema::String),
        TypeNode::Array { element_type } => Ok(Schema::Array {
            element_type: Box::new(compile_type(element_type, imports)?),
        }),
        TypeNode::Tuple { element_types } => Ok(Schema::Tuple {
            element_types: element_types
                .iter()
                .map(|t| compile_type(t, imports))
                .collect::<Result<_, _>>()?,
        }),
        TypeNode::Literal { literal } => Ok(Schema::Literal {
            literal: literal.clone(),
        }),
        TypeNode::TypeLiteral { members } => compile_interface(None, members, imports),
        TypeNode::IndexedAccess {
            object_type,
            index_type,
        } => compile_indexed_access(object_type, index_type, imports),
        TypeNode::Union { types } => Ok(Schema::Union {
            members: compile_members(types, imports)?,
        }),
        TypeNode::Intersection { types } => Ok(Schema::Intersection {
            members: compile_members(types, imports)?,
        }),
        TypeNode::Reference { name, type_args } => compile_reference(name, type_args, imports),
        TypeNode::Unsupported { description } => {
            Err(TybufError::UnsupportedSyntax(description.clone()))
        }
    }
}

fn compile_members(
    types: &[TypeNode],
    imports: &ImportTable,
) -> Result<Vec<MemberSchema>, TybufError> {
    types
        .iter()
        .enumerate()
        .map(|(i, t)| {
            Ok(MemberSchema {
                id: i as u32,
                type_: compile_type(t, imports)?,
            })
        })
        .collect()
}

fn compile_enum(decl: &EnumDecl) -> Result<Schema, TybufError> {
    // Auto-increment counter; a numeric initializer reseeds it, a string
    // initializer poisons it to NaN for all following value-less members.
    let mut counter: f64 = 0.0;
    let mut members = Vec::with_capacity(decl.members.len());

    for (i, member) in decl.members.iter().enumerate() {
        let value = match &member.initializer {
            None => {
                let value = counter;
                counter += 1.0;
                EnumValue::Number(value)
            }
            Some(EnumInit::String(s)) => {
                counter = f64::NAN;
                EnumValue::String(s.clone())
            }
            Some(EnumInit::Number(n)) => {
                counter = n + 1.0;
                EnumValue::Number(*n)
            }
            Some(EnumInit::Unsupported { kind }) => {
                return Err(TybufError::InvalidDeclaration(format!(
                    "enum member \"{}\" initializer must be a string or number literal, found {}",
                    member.name, kind
                )));
            }
        };
        members.push(EnumMemberSchema {
            id: i as u32,
            value,
        });
    }

    Ok(Schema::Enum { members })
}

fn compile_interface(
    extends: Option<&[TypeName]>,
    members: &[InterfaceMember],
    imports: &ImportTable,
) -> Result<Schema, TybufError> {
    let extends = extends
        .filter(|list| !list.is_empty())
        .map(|list| {
            list.iter()
                .enumerate()
                .map(|(i, name)| ExtendsEntry {
                    id: i as u32,
                    type_: Schema::Reference(reference_schema(name, imports)),
                })
                .collect::<Vec<_>>()
        });

    let mut properties = Vec::new();
    let mut index_signature = None;

    for (i, member) in members.iter().enumerate() {
        match member {
            InterfaceMember::Property(property) => {
                let name = match &property.name {
                    PropertyName::Ident(name) => name.clone(),
                    PropertyName::Computed(computed) => {
                        return Err(TybufError::InvalidDeclaration(format!(
                            "computed property names are not supported: {}",
                            computed.text
                        )));
                    }
                };
                let type_node = property.type_.as_ref().ok_or_else(|| {
                    TybufError::InvalidDeclaration(format!("field must have a type: {}", name))
                })?;
                properties.push(PropertySchema {
                    id: i as u32,
                    name,
                    type_: compile_type(type_node, imports)?,
                    optional: property.optional.then_some(true),
                });
            }
            // At most one index signature; last one wins.
            InterfaceMember::IndexSignature(signature) => {
                let (key_node, type_node) = match (&signature.key_type, &signature.type_) {
                    (Some(key), Some(value)) => (key, value),
                    _ => {
                        return Err(TybufError::InvalidDeclaration(
                            "index signature must declare key and value types".to_owned(),
                        ));
                    }
                };
                let key_type = if matches!(key_node, TypeNode::Number) {
                    IndexKeyType::Number
                } else {
                    IndexKeyType::String
                };
                index_signature = Some(IndexSignatureSchema {
                    key_type,
                    type_: Box::new(compile_type(type_node, imports)?),
                });
            }
        }
    }

    Ok(Schema::Interface {
        extends,
        properties: (!properties.is_empty()).then_some(properties),
        index_signature,
    })
}

fn compile_indexed_access(
    object_type: &TypeNode,
    index_type: &TypeNode,
    imports: &ImportTable,
) -> Result<Schema, TybufError> {
    match index_type {
        TypeNode::Literal { literal } => Ok(Schema::IndexedAccess {
            index: literal.to_key(),
            object_type: Box::new(compile_type(object_type, imports)?),
        }),
        TypeNode::Union { .. } => Err(TybufError::InvalidDeclaration(
            "indexed access with a union key is not supported".to_owned(),
        )),
        other => Err(TybufError::InvalidDeclaration(format!(
            "indexed access key must be a literal, found {}",
            node_kind(other)
        ))),
    }
}

fn compile_reference(
    name: &TypeName,
    type_args: &[TypeNode],
    imports: &ImportTable,
) -> Result<Schema, TybufError> {
    let reference = reference_schema(name, imports);

    // Fixed buffer names shadow plain references, unless imported from
    // somewhere (then the user's type wins).
    if reference.path.is_none() {
        if let Some(&array_type) = BUFFER_TYPES.get(reference.target_name.as_str()) {
            return Ok(Schema::Buffer { array_type });
        }
    }

    // Scalar numeric names are matched on the bare identifier.
    if name.is_single() {
        if let Some(&scalar_type) = SCALAR_TYPES.get(name.root()) {
            return Ok(Schema::Number {
                scalar_type: Some(scalar_type),
            });
        }
    }

    // Array<T>
    if is_local(&reference, "Array") && !type_args.is_empty() {
        return Ok(Schema::Array {
            element_type: Box::new(compile_type(&type_args[0], imports)?),
        });
    }

    // Pick<T, K> / Omit<T, K>
    if is_local(&reference, "Pick") || is_local(&reference, "Omit") {
        let kind = reference.target_name.as_str();
        if type_args.len() != 2 {
            return Err(TybufError::InvalidDeclaration(format!(
                "{} requires exactly 2 type arguments",
                kind
            )));
        }
        let target = compile_operator_target(&type_args[0], imports, kind)?;
        let keys = extract_pick_keys(&compile_type(&type_args[1], imports)?)?;
        return Ok(if kind == "Pick" {
            Schema::Pick { target, keys }
        } else {
            Schema::Omit { target, keys }
        });
    }

    // Partial<T>
    if is_local(&reference, "Partial") {
        if type_args.len() != 1 {
            return Err(TybufError::InvalidDeclaration(
                "Partial requires exactly 1 type argument".to_owned(),
            ));
        }
        let target = compile_operator_target(&type_args[0], imports, "Partial")?;
        return Ok(Schema::Partial { target });
    }

    // Overwrite<T, U>
    if is_local(&reference, "Overwrite") {
        if type_args.len() != 2 {
            return Err(TybufError::InvalidDeclaration(
                "Overwrite requires exactly 2 type arguments".to_owned(),
            ));
        }
        let target = compile_operator_target(&type_args[0], imports, "Overwrite")?;
        let overwrite = compile_operator_target(&type_args[1], imports, "Overwrite")?;
        return Ok(Schema::Overwrite { target, overwrite });
    }

    Ok(Schema::Reference(reference))
}

/// Resolves a qualified name through the import table: an imported root
/// segment is rewritten to its originally exported name and carries the
/// import's module path; everything else is a same-file reference.
pub fn reference_schema(name: &TypeName, imports: &ImportTable) -> SchemaRef {
    match imports.get(name.root()) {
        Some(item) => {
            let mut segments: Vec<String> = name.segments().to_vec();
            segments[0] = item.target_name.clone();
            SchemaRef {
                path: Some(item.path.clone()),
                target_name: segments.join("."),
            }
        }
        None => SchemaRef {
            path: None,
            target_name: name.dotted(),
        },
    }
}

/// A structural operator target must itself be an interface or a reference
/// to one.
fn compile_operator_target(
    node: &TypeNode,
    imports: &ImportTable,
    kind: &str,
) -> Result<Box<Schema>, TybufError> {
    let target = compile_type(node, imports)?;
    if !matches!(target, Schema::Interface { .. } | Schema::Reference(_)) {
        return Err(TybufError::InvalidDeclaration(format!(
            "{} target must be an interface or a reference",
            kind
        )));
    }
    Ok(Box::new(target))
}

/// Extracts the key set of a `Pick`/`Omit` second argument: unions take the
/// deduplicated union of their members' keys, intersections the intersection,
/// and a literal contributes its stringified value.
fn extract_pick_keys(schema: &Schema) -> Result<Vec<String>, TybufError> {
    match schema {
        Schema::Union { members } => {
            let mut keys: Vec<String> = Vec::new();
            for member in members {
                for key in extract_pick_keys(&member.type_)? {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }
            Ok(keys)
        }
        Schema::Intersection { members } => {
            let mut iter = members.iter();
            let mut keys = match iter.next() {
                Some(member) => extract_pick_keys(&member.type_)?,
                None => Vec::new(),
            };
            for member in iter {
                let next = extract_pick_keys(&member.type_)?;
                keys.retain(|k| next.contains(k));
            }
            Ok(keys)
        }
        Schema::Literal { literal } => Ok(vec![literal.to_key()]),
        other => Err(TybufError::InvalidDeclaration(format!(
            "illegal pick keys: {}",
            serde_json::to_string(other)?
        ))),
    }
}

fn is_local(reference: &SchemaRef, name: &str) -> bool {
    reference.path.is_none() && reference.target_name == name
}

fn node_kind(node: &TypeNode) -> &'static str {
    match node {
        TypeNode::Paren { .. } => "Paren",
        TypeNode::Any => "Any",
        TypeNode::Boolean => "Boolean",
        TypeNode::Number => "Number",
        TypeNode::String => "String",
        TypeNode::Object => "Object",
        TypeNode::Literal { .. } => "Literal",
        TypeNode::Array { .. } => "Array",
        TypeNode::Tuple { .. } => "Tuple",
        TypeNode::TypeLiteral { .. } => "TypeLiteral",
        TypeNode::IndexedAccess { .. } => "IndexedAccess",
        TypeNode::Union { .. } => "Union",
        TypeNode::Intersection { .. } => "Intersection",
        TypeNode::Reference { .. } => "Reference",
        TypeNode::Unsupported { .. } => "Unsupported",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstParser, JsonAstParser};
    use tybuf_schema::LiteralValue;

    fn compile_json(json: &str) -> Result<Schema, TybufError> {
        let node: TypeNode = serde_json::from_str(json).unwrap();
        compile_type(&node, &ImportTable::new())
    }

    fn parse_type(json: &str) -> TypeNode {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn keywords_and_parens() {
        assert_eq!(compile_json(r#"{"kind":"Any"}"#).unwrap(), Schema::Any);
        assert_eq!(
            compile_json(r#"{"kind":"Paren","type":{"kind":"Boolean"}}"#).unwrap(),
            Schema::Boolean
        );
        assert_eq!(compile_json(r#"{"kind":"Object"}"#).unwrap(), Schema::NonPrimitive);
        assert_eq!(
            compile_json(r#"{"kind":"Number"}"#).unwrap(),
            Schema::Number { scalar_type: None }
        );
    }

    #[test]
    fn buffer_types_shadow_references() {
        assert_eq!(
            compile_json(r#"{"kind":"Reference","name":"ArrayBuffer"}"#).unwrap(),
            Schema::Buffer { array_type: None }
        );
        assert_eq!(
            compile_json(r#"{"kind":"Reference","name":"Uint8Array"}"#).unwrap(),
            Schema::Buffer {
                array_type: Some(BufferArrayType::Uint8Array)
            }
        );

        // Imported, so it is the user's own type.
        let mut imports = ImportTable::new();
        imports.insert(
            "Uint8Array".to_owned(),
            crate::imports::ImportItem {
                path: "./mine".to_owned(),
                target_name: "Uint8Array".to_owned(),
            },
        );
        let node = parse_type(r#"{"kind":"Reference","name":"Uint8Array"}"#);
        assert_eq!(
            compile_type(&node, &imports).unwrap(),
            Schema::Reference(SchemaRef {
                path: Some("./mine".to_owned()),
                target_name: "Uint8Array".to_owned(),
            })
        );
    }

    #[test]
    fn scalar_names_become_numbers() {
        assert_eq!(
            compile_json(r#"{"kind":"Reference","name":"uint32"}"#).unwrap(),
            Schema::Number {
                scalar_type: Some(ScalarType::Uint32)
            }
        );
        // A qualified name is not a scalar.
        assert_eq!(
            compile_json(r#"{"kind":"Reference","name":"Ns.uint32"}"#).unwrap(),
            Schema::Reference(SchemaRef {
                path: None,
                target_name: "Ns.uint32".to_owned(),
            })
        );
    }

    #[test]
    fn array_syntax_and_generic_array() {
        let expected = Schema::Array {
            element_type: Box::new(Schema::String),
        };
        assert_eq!(
            compile_json(r#"{"kind":"Array","elementType":{"kind":"String"}}"#).unwrap(),
            expected
        );
        assert_eq!(
            compile_json(
                r#"{"kind":"Reference","name":"Array","typeArguments":[{"kind":"String"}]}"#
            )
            .unwrap(),
            expected
        );
    }

    #[test]
    fn enum_counter_behavior() {
        let decl: EnumDecl = serde_json::from_str(
            r#"{ "name": "E", "members": [
                { "name": "A" },
                { "name": "B", "initializer": 5 },
                { "name": "C" }
            ] }"#,
        )
        .unwrap();
        let schema = compile_enum(&decl).unwrap();
        assert_eq!(
            schema,
            Schema::Enum {
                members: vec![
                    EnumMemberSchema { id: 0, value: EnumValue::Number(0.0) },
                    EnumMemberSchema { id: 1, value: EnumValue::Number(5.0) },
                    EnumMemberSchema { id: 2, value: EnumValue::Number(6.0) },
                ]
            }
        );
    }

    #[test]
    fn enum_string_initializer_poisons_counter() {
        let decl: EnumDecl = serde_json::from_str(
            r#"{ "name": "E", "members": [
                { "name": "A", "initializer": "x" },
                { "name": "B" }
            ] }"#,
        )
        .unwrap();
        let schema = compile_enum(&decl).unwrap();
        match schema {
            Schema::Enum { members } => {
                assert_eq!(members[0].value, EnumValue::String("x".to_owned()));
                match members[1].value {
                    EnumValue::Number(n) => assert!(n.is_nan()),
                    ref other => panic!("expected NaN value, got {:?}", other),
                }
            }
            other => panic!("expected enum, got {:?}", other),
        }
    }

    #[test]
    fn enum_non_literal_initializer_is_an_error() {
        let decl: EnumDecl = serde_json::from_str(
            r#"{ "name": "E", "members": [
                { "name": "A", "initializer": { "kind": "BinaryExpression" } }
            ] }"#,
        )
        .unwrap();
        assert!(matches!(
            compile_enum(&decl),
            Err(TybufError::InvalidDeclaration(_))
        ));
    }

    #[test]
    fn interface_properties_and_index_signature() {
        let schema = compile_json(
            r#"{ "kind": "TypeLiteral", "members": [
                { "kind": "Property", "name": "a", "type": { "kind": "String" } },
                { "kind": "Property", "name": "b", "optional": true, "type": { "kind": "Number" } },
                { "kind": "IndexSignature", "keyType": { "kind": "Number" }, "type": { "kind": "Any" } }
            ] }"#,
        )
        .unwrap();

        match schema {
            Schema::Interface {
                extends,
                properties,
                index_signature,
            } => {
                assert!(extends.is_none());
                let properties = properties.unwrap();
                assert_eq!(properties[0].id, 0);
                assert_eq!(properties[0].optional, None);
                assert_eq!(properties[1].optional, Some(true));
                assert_eq!(index_signature.unwrap().key_type, IndexKeyType::Number);
            }
            other => panic!("expected interface, got {:?}", other),
        }
    }

    #[test]
    fn missing_property_type_is_an_error() {
        let result = compile_json(
            r#"{ "kind": "TypeLiteral", "members": [
                { "kind": "Property", "name": "a" }
            ] }"#,
        );
        assert!(matches!(result, Err(TybufError::InvalidDeclaration(_))));
    }

    #[test]
    fn computed_property_name_is_an_error() {
        let result = compile_json(
            r#"{ "kind": "TypeLiteral", "members": [
                { "kind": "Property", "name": { "text": "[K]" }, "type": { "kind": "Any" } }
            ] }"#,
        );
        assert!(matches!(result, Err(TybufError::InvalidDeclaration(_))));
    }

    #[test]
    fn indexed_access_with_literal_key() {
        let schema = compile_json(
            r#"{ "kind": "IndexedAccess",
                 "objectType": { "kind": "Reference", "name": "A" },
                 "indexType": { "kind": "Literal", "literal": "a" } }"#,
        )
        .unwrap();
        assert_eq!(
            schema,
            Schema::IndexedAccess {
                index: "a".to_owned(),
                object_type: Box::new(Schema::Reference(SchemaRef {
                    path: None,
                    target_name: "A".to_owned(),
                })),
            }
        );
    }

    #[test]
    fn indexed_access_with_union_key_is_rejected() {
        let result = compile_json(
            r#"{ "kind": "IndexedAccess",
                 "objectType": { "kind": "Reference", "name": "A" },
                 "indexType": { "kind": "Union", "types": [
                    { "kind": "Literal", "literal": "a" },
                    { "kind": "Literal", "literal": "b" }
                 ] } }"#,
        );
        assert!(matches!(result, Err(TybufError::InvalidDeclaration(_))));
    }

    #[test]
    fn pick_keys_union_dedupes_and_intersection_intersects() {
        let pick = compile_json(
            r#"{ "kind": "Reference", "name": "Pick", "typeArguments": [
                { "kind": "Reference", "name": "X" },
                { "kind": "Union", "types": [
                    { "kind": "Literal", "literal": "a" },
                    { "kind": "Literal", "literal": "b" },
                    { "kind": "Literal", "literal": "a" }
                ] }
            ] }"#,
        )
        .unwrap();
        match pick {
            Schema::Pick { keys, .. } => assert_eq!(keys, vec!["a", "b"]),
            other => panic!("expected pick, got {:?}", other),
        }

        let omit = compile_json(
            r#"{ "kind": "Reference", "name": "Omit", "typeArguments": [
                { "kind": "Reference", "name": "X" },
                { "kind": "Intersection", "types": [
                    { "kind": "Literal", "literal": "a" },
                    { "kind": "Literal", "literal": "a" }
                ] }
            ] }"#,
        )
        .unwrap();
        match omit {
            Schema::Omit { keys, .. } => assert_eq!(keys, vec!["a"]),
            other => panic!("expected omit, got {:?}", other),
        }
    }

    #[test]
    fn pick_target_must_be_interface_or_reference() {
        let result = compile_json(
            r#"{ "kind": "Reference", "name": "Pick", "typeArguments": [
                { "kind": "String" },
                { "kind": "Literal", "literal": "a" }
            ] }"#,
        );
        assert!(matches!(result, Err(TybufError::InvalidDeclaration(_))));
    }

    #[test]
    fn imported_pick_is_a_plain_reference() {
        let mut imports = ImportTable::new();
        imports.insert(
            "Pick".to_owned(),
            crate::imports::ImportItem {
                path: "./helpers".to_owned(),
                target_name: "Pick".to_owned(),
            },
        );
        let node = parse_type(
            r#"{ "kind": "Reference", "name": "Pick", "typeArguments": [
                { "kind": "Reference", "name": "X" },
                { "kind": "Literal", "literal": "a" }
            ] }"#,
        );
        assert_eq!(
            compile_type(&node, &imports).unwrap(),
            Schema::Reference(SchemaRef {
                path: Some("./helpers".to_owned()),
                target_name: "Pick".to_owned(),
            })
        );
    }

    #[test]
    fn import_rewrites_reference_root_segment() {
        let mut imports = ImportTable::new();
        imports.insert(
            "B".to_owned(),
            crate::imports::ImportItem {
                path: "./other".to_owned(),
                target_name: "A".to_owned(),
            },
        );
        let node = parse_type(r#"{"kind":"Reference","name":"B.Inner"}"#);
        assert_eq!(
            compile_type(&node, &imports).unwrap(),
            Schema::Reference(SchemaRef {
                path: Some("./other".to_owned()),
                target_name: "A.Inner".to_owned(),
            })
        );
    }

    #[test]
    fn literal_values() {
        assert_eq!(
            compile_json(r#"{"kind":"Literal","literal":1.5}"#).unwrap(),
            Schema::Literal {
                literal: LiteralValue::Number(1.5)
            }
        );
        assert_eq!(
            compile_json(r#"{"kind":"Literal","literal":null}"#).unwrap(),
            Schema::Literal {
                literal: LiteralValue::Null
            }
        );
        assert_eq!(
            compile_json(r#"{"kind":"Literal"}"#).unwrap(),
            Schema::Literal {
                literal: LiteralValue::Undefined
            }
        );
    }

    #[test]
    fn compiling_twice_is_idempotent() {
        let node = parse_type(
            r#"{ "kind": "Union", "types": [
                { "kind": "Reference", "name": "A" },
                { "kind": "Tuple", "elementTypes": [ { "kind": "Boolean" } ] }
            ] }"#,
        );
        let imports = ImportTable::new();
        assert_eq!(
            compile_type(&node, &imports).unwrap(),
            compile_type(&node, &imports).unwrap()
        );
    }

    #[test]
    fn unsupported_node_is_a_hard_error() {
        let result = compile_json(r#"{"kind":"Unsupported","description":"ConditionalType"}"#);
        assert!(matches!(result, Err(TybufError::UnsupportedSyntax(_))));
    }

    #[test]
    fn union_member_ids_are_positional() {
        let schema = compile_json(
            r#"{ "kind": "Union", "types": [ { "kind": "String" }, { "kind": "Number" } ] }"#,
        )
        .unwrap();
        match schema {
            Schema::Union { members } => {
                assert_eq!(members[0].id, 0);
                assert_eq!(members[1].id, 1);
            }
            other => panic!("expected union, got {:?}", other),
        }
    }

    // Used by JsonAstParser fixtures elsewhere; keeps the dispatch on
    // interface declarations (with extends) covered here too.
    #[test]
    fn interface_declaration_with_extends() {
        let src = JsonAstParser
            .parse(
                r#"{ "statements": [
                    { "kind": "Interface", "name": "Sub", "export": true,
                      "extends": [ "Base", "Ns.Other" ],
                      "members": [
                        { "kind": "Property", "name": "x", "type": { "kind": "Boolean" } }
                      ] }
                ] }"#,
            )
            .unwrap();
        let table = crate::flatten::flatten_source(&src, true);
        let schema = compile_decl(&table["Sub"].node, &ImportTable::new()).unwrap();
        match schema {
            Schema::Interface { extends, .. } => {
                let extends = extends.unwrap();
                assert_eq!(extends.len(), 2);
                assert_eq!(extends[0].id, 0);
                assert_eq!(
                    extends[1].type_,
                    Schema::Reference(SchemaRef {
                        path: None,
                        target_name: "Ns.Other".to_owned(),
                    })
                );
            }
            other => panic!("expected interface, got {:?}", other),
        }
    }
}
