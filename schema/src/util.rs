use crate::schema::{Schema, SchemaRef};

/// Collects every [`Schema::Reference`] reachable by walking `schema`,
/// including nested ones. No deduplication; callers memoize on their side.
pub fn used_references(schema: &Schema) -> Vec<SchemaRef> {
    let mut out = Vec::new();
    walk_references(schema, &mut |r| out.push(r.clone()));
    out
}

/// Applies `f` to every reference node in `schema`, in place. Used by the
/// generator to rewrite references to their canonical (file key, name) once
/// resolution succeeds.
pub fn rewrite_references(schema: &mut Schema, f: &impl Fn(&mut SchemaRef)) {
    match schema {
        Schema::Reference(r) => f(r),
        Schema::Array { element_type } => rewrite_references(element_type, f),
        Schema::Tuple { element_types } => {
            for t in element_types {
                rewrite_references(t, f);
            }
        }
        Schema::Interface {
            extends,
            properties,
            index_signature,
        } => {
            if let Some(extends) = extends {
                for e in extends {
                    rewrite_references(&mut e.type_, f);
                }
            }
            if let Some(properties) = properties {
                for p in properties {
                    rewrite_references(&mut p.type_, f);
                }
            }
            if let Some(idx) = index_signature {
                rewrite_references(&mut idx.type_, f);
            }
        }
        Schema::Union { members } | Schema::Intersection { members } => {
            for m in members {
                rewrite_references(&mut m.type_, f);
            }
        }
        Schema::IndexedAccess { object_type, .. } => rewrite_references(object_type, f),
        Schema::Pick { target, .. } | Schema::Omit { target, .. } | Schema::Partial { target } => {
            rewrite_references(target, f)
        }
        Schema::Overwrite { target, overwrite } => {
            rewrite_references(target, f);
            rewrite_references(overwrite, f);
        }
        _ => {}
    }
}

fn walk_references(schema: &Schema, f: &mut impl FnMut(&SchemaRef)) {
    match schema {
        Schema::Reference(r) => f(r),
        Schema::Array { element_type } => walk_references(element_type, f),
        Schema::Tuple { element_types } => {
            for t in element_types {
                walk_references(t, f);
            }
        }
        Schema::Interface {
            extends,
            properties,
            index_signature,
        } => {
            if let Some(extends) = extends {
                for e in extends {
                    walk_references(&e.type_, f);
                }
            }
            if let Some(properties) = properties {
                for p in properties {
                    walk_references(&p.type_, f);
                }
            }
            if let Some(idx) = index_signature {
                walk_references(&idx.type_, f);
            }
        }
        Schema::Union { members } | Schema::Intersection { members } => {
            for m in members {
                walk_references(&m.type_, f);
            }
        }
        Schema::IndexedAccess { object_type, .. } => walk_references(object_type, f),
        Schema::Pick { target, .. } | Schema::Omit { target, .. } | Schema::Partial { target } => {
            walk_references(target, f)
        }
        Schema::Overwrite { target, overwrite } => {
            walk_references(target, f);
            walk_references(overwrite, f);
        }
        _ => {}
    }
}
