//! Drives compilation across a dependency graph of files.
//!
//! The generator loads entry files, filters their declarations (by default:
//! exported ones), and pulls every filtered declaration plus everything it
//! transitively references into one closed result set. References are
//! rewritten in place to their canonical (file key, declaration name) as
//! they resolve. Once the closure is frozen, a second pass reassigns encode
//! IDs, reusing the IDs of a compatible prior result wherever the
//! identifying key is unchanged.
//!
//! File and module access is pluggable: `read_file` maps a base-relative
//! path to source text, `resolve_module` maps a bare import specifier to a
//! base-relative path, and the parser turns text into a syntax tree.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use regex::Regex;
use tracing::debug;

use tybuf_schema::{
    gen_encode_ids, rewrite_references, schema_encode_ids, used_references, EncodeIdPair, Schema,
    SchemaRef,
};

use crate::ast::{AstParser, JsonAstParser};
use crate::compile::compile_decl;
use crate::error::TybufError;
use crate::flatten::{flatten_source, DeclTable};
use crate::imports::{script_imports, ImportTable};

/// The durable generation artifact: file key → declaration name → schema.
/// File keys are base-relative paths without extension, with directory
/// modules keyed as `dir/index`.
pub type GenerateResult = BTreeMap<String, BTreeMap<String, Schema>>;

pub struct FilterInfo<'a> {
    pub path: &'a str,
    pub name: &'a str,
    pub is_export: bool,
}

pub struct GenerateOptions<'a> {
    /// Decides which declarations seed the closure. Defaults to
    /// "is exported". Everything a seeded declaration references is pulled
    /// in regardless of the filter.
    pub filter: Option<Box<dyn Fn(&FilterInfo) -> bool + 'a>>,
    /// A prior result whose encode IDs are kept wherever the identifying
    /// key is unchanged.
    pub compatible_result: Option<&'a GenerateResult>,
}

impl Default for GenerateOptions<'_> {
    fn default() -> Self {
        GenerateOptions {
            filter: None,
            compatible_result: None,
        }
    }
}

type ReadFileFn = Box<dyn Fn(&str) -> io::Result<String>>;
type ResolveModuleFn = Box<dyn Fn(&str, &Path) -> String>;

pub struct SchemaGenerator<P: AstParser = JsonAstParser> {
    base_dir: PathBuf,
    src_extension: String,
    ext_pattern: Regex,
    parser: P,
    read_file: ReadFileFn,
    resolve_module: Option<ResolveModuleFn>,
}

impl SchemaGenerator<JsonAstParser> {
    /// A generator that reads JSON-encoded syntax trees from disk under
    /// `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_parser(base_dir, JsonAstParser)
    }
}

impl<P: AstParser> SchemaGenerator<P> {
    pub fn with_parser(base_dir: impl Into<PathBuf>, parser: P) -> Self {
        let base_dir = base_dir.into();
        let read_base = base_dir.clone();
        SchemaGenerator {
            base_dir,
            src_extension: "ts".to_owned(),
            ext_pattern: extension_pattern("ts"),
            parser,
            read_file: Box::new(move |rel| fs::read_to_string(read_base.join(rel))),
            // Bare module specifiers resolve under the conventional
            // third-party package directory.
            resolve_module: Some(Box::new(|import_path, _base_dir| {
                format!("node_modules/{}", import_path)
            })),
        }
    }

    /// The source-file extension candidate paths are built from.
    pub fn with_src_extension(mut self, ext: impl Into<String>) -> Self {
        self.src_extension = ext.into();
        self.ext_pattern = extension_pattern(&self.src_extension);
        self
    }

    /// Replaces the file reader, for custom or in-memory file systems.
    /// Paths are relative to `base_dir`; an `Err` means "try the next
    /// candidate path".
    pub fn with_read_file(mut self, f: impl Fn(&str) -> io::Result<String> + 'static) -> Self {
        self.read_file = Box::new(f);
        self
    }

    pub fn with_resolve_module(mut self, f: impl Fn(&str, &Path) -> String + 'static) -> Self {
        self.resolve_module = Some(Box::new(f));
        self
    }

    /// Generates the closed schema set for `paths` (relative to `base_dir`).
    pub fn generate(
        &self,
        paths: &[&str],
        options: GenerateOptions,
    ) -> Result<GenerateResult, TybufError> {
        debug!(files = paths.len(), base_dir = %self.base_dir.display(), "generate");

        let filter = options
            .filter
            .unwrap_or_else(|| Box::new(|info: &FilterInfo| info.is_export));

        let mut run = GenerateRun {
            generator: self,
            cache: HashMap::new(),
            output: GenerateResult::new(),
        };

        for path in paths {
            let rel = self.normalize_entry(path)?;
            let (ast, ast_key) = run.get_ast(&rel)?;
            debug!(key = %ast_key, "entry file loaded");

            for (name, decl) in ast.decls.iter() {
                let passed = filter(&FilterInfo {
                    path: &rel,
                    name,
                    is_export: decl.is_export,
                });
                debug!(%name, file = %rel, passed, "filter");
                if passed {
                    run.add_to_output(&ast_key, name)?;
                }
            }
        }

        let mut output = run.output;
        regen_result_encode_ids(&mut output, options.compatible_result);
        Ok(output)
    }

    /// Entry paths stay relative to the base directory; anything that
    /// normalizes outside it is rejected before any I/O happens.
    fn normalize_entry(&self, path: &str) -> Result<String, TybufError> {
        let normalized = normalize_path(&path.replace('\\', "/"));
        if normalized == ".." || normalized.starts_with("../") {
            return Err(TybufError::PathTraversal(path.to_owned()));
        }
        Ok(normalized)
    }

    /// A path's cache key: separators normalized, source extension stripped.
    fn file_key(&self, path_or_key: &str) -> String {
        let normalized = path_or_key.replace('\\', "/");
        self.ext_pattern.replace(&normalized, "").into_owned()
    }
}

fn extension_pattern(ext: &str) -> Regex {
    Regex::new(&format!(r"\.{}$", regex::escape(ext))).expect("extension pattern is valid")
}

/// One file's cached tables, built once per key and shared for the run.
struct FileAst {
    decls: DeclTable,
    imports: ImportTable,
}

/// The state of one `generate` call: the append-only AST cache and the
/// result map under construction. The cache is never invalidated within a
/// run; re-parsing a file is wasteful but idempotent.
struct GenerateRun<'a, P: AstParser> {
    generator: &'a SchemaGenerator<P>,
    cache: HashMap<String, Rc<FileAst>>,
    output: GenerateResult,
}

impl<P: AstParser> GenerateRun<'_, P> {
    /// Loads (or reuses) a file's tables. Candidates are tried in order:
    /// the literal path, its `.d` variant, then the `/index` variants; the
    /// first readable one wins and fixes the canonical key.
    fn get_ast(&mut self, path_or_key: &str) -> Result<(Rc<FileAst>, String), TybufError> {
        let mut ast_key = self.generator.file_key(path_or_key);
        if let Some(ast) = self.cache.get(&ast_key) {
            return Ok((ast.clone(), ast_key));
        }

        let ext = &self.generator.src_extension;
        let postfixes = [
            format!(".{}", ext),
            format!(".d.{}", ext),
            format!("/index.{}", ext),
            format!("/index.d.{}", ext),
        ];

        let mut content = None;
        for postfix in &postfixes {
            match (self.generator.read_file)(&format!("{}{}", ast_key, postfix)) {
                Ok(text) => {
                    if postfix.starts_with('/') {
                        ast_key = format!("{}/index", ast_key);
                    }
                    content = Some(text);
                    break;
                }
                Err(_) => continue,
            }
        }
        let content = content.ok_or_else(|| {
            TybufError::FileNotFound(self.generator.base_dir.join(&ast_key).display().to_string())
        })?;

        let src = self.generator.parser.parse(&content)?;
        let ast = Rc::new(FileAst {
            decls: flatten_source(&src, true),
            imports: script_imports(&src),
        });
        debug!(key = %ast_key, decls = ast.decls.len(), "file parsed");
        self.cache.insert(ast_key.clone(), ast.clone());
        Ok((ast, ast_key))
    }

    /// Pulls one declaration into the result: compiles it, resolves and
    /// canonicalizes its direct references, then pulls each referenced
    /// declaration. Already-present entries are a no-op, which is what
    /// terminates cyclic reference chains.
    fn add_to_output(&mut self, ast_key: &str, name: &str) -> Result<(), TybufError> {
        if self
            .output
            .get(ast_key)
            .map_or(false, |file| file.contains_key(name))
        {
            return Ok(());
        }
        debug!(key = %ast_key, %name, "add to output");

        let (ast, _) = self.get_ast(ast_key)?;
        let decl = ast.decls.get(name).ok_or_else(|| TybufError::UnresolvedReference {
            target: name.to_owned(),
            at: ast_key.to_owned(),
            from: ast_key.to_owned(),
        })?;
        let mut schema = compile_decl(&decl.node, &ast.imports)?;

        // Resolve each distinct reference once, then rewrite all reference
        // nodes before the schema is frozen into the output.
        let mut resolved: HashMap<SchemaRef, (String, String)> = HashMap::new();
        let mut pull_order: Vec<(String, String)> = Vec::new();
        for reference in used_references(&schema) {
            if resolved.contains_key(&reference) {
                continue;
            }
            let target = self.resolve_reference(ast_key, name, &reference)?;
            pull_order.push(target.clone());
            resolved.insert(reference, target);
        }
        rewrite_references(&mut schema, &|r: &mut SchemaRef| {
            if let Some((path, target_name)) = resolved.get(r) {
                r.path = Some(path.clone());
                r.target_name = target_name.clone();
            }
        });

        self.output
            .entry(ast_key.to_owned())
            .or_default()
            .insert(name.to_owned(), schema);

        for (target_key, target_name) in &pull_order {
            self.add_to_output(target_key, target_name)?;
        }
        Ok(())
    }

    /// Resolves one reference made from declaration `from_name` in file
    /// `from_key` to the canonical (file key, declaration name) it points at.
    fn resolve_reference(
        &mut self,
        from_key: &str,
        from_name: &str,
        reference: &SchemaRef,
    ) -> Result<(String, String), TybufError> {
        let ref_path = match &reference.path {
            // Relative imports resolve against the referencing file's
            // directory.
            Some(path) if path.starts_with('.') => {
                normalize_path(&format!("{}/../{}", from_key, path))
            }
            // Bare specifiers go through the module-resolution policy.
            Some(path) => match &self.generator.resolve_module {
                Some(resolve) => resolve(path, &self.generator.base_dir),
                None => return Err(TybufError::ModuleResolve(path.clone())),
            },
            None => from_key.to_owned(),
        };
        debug!(target = %reference.target_name, path = %ref_path, "resolving reference");

        let (ref_ast, ref_key) = self.get_ast(&ref_path)?;

        // A same-file reference from inside a namespace searches enclosing
        // scopes: from A.B.C, target E probes A.B.E, then A.E, then E. A
        // reference with an explicit module path is probed literally.
        let mut candidates: Vec<String> = Vec::new();
        if reference.path.is_none() && from_name.contains('.') {
            let segments: Vec<&str> = from_name.split('.').collect();
            for i in (1..segments.len()).rev() {
                candidates.push(format!(
                    "{}.{}",
                    segments[..i].join("."),
                    reference.target_name
                ));
            }
        }
        candidates.push(reference.target_name.clone());

        for candidate in &candidates {
            if ref_ast.decls.contains_key(candidate) {
                debug!(target = %candidate, key = %ref_key, "reference resolved");
                return Ok((ref_key, candidate.clone()));
            }
        }

        Err(TybufError::UnresolvedReference {
            target: reference.target_name.clone(),
            at: ref_key,
            from: format!("{} in {}", from_name, from_key),
        })
    }
}

/// Normalizes a slash-separated relative path: drops `.` and empty segments
/// and folds `..` into its parent where one exists.
fn normalize_path(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match stack.last() {
                Some(&last) if last != ".." => {
                    stack.pop();
                }
                _ => stack.push(".."),
            },
            _ => stack.push(segment),
        }
    }
    stack.join("/")
}

/// Reassigns encode IDs across the whole result, reusing IDs from the
/// structurally corresponding schema of a compatible prior result.
pub fn regen_result_encode_ids(output: &mut GenerateResult, compatible: Option<&GenerateResult>) {
    for (path_key, schemas) in output.iter_mut() {
        for (name, schema) in schemas.iter_mut() {
            let prior = compatible
                .and_then(|c| c.get(path_key))
                .and_then(|file| file.get(name));
            regen_schema_encode_ids(schema, prior);
        }
    }
}

fn regen_schema_encode_ids(schema: &mut Schema, compatible: Option<&Schema>) {
    // A prior schema only counts if it is the same variant.
    let compatible = compatible.filter(|c| c.same_kind(schema));

    match schema {
        Schema::Enum { members } => {
            let prior_ids = schema_encode_ids(compatible);
            let keys: Vec<String> = members.iter().map(|m| m.value.to_key()).collect();
            let ids = gen_encode_ids(&keys, Some(&prior_ids));
            for (member, pair) in members.iter_mut().zip(&ids) {
                member.id = pair.id;
            }
        }
        Schema::Interface {
            extends,
            properties,
            index_signature,
        } => {
            let (prior_extends, prior_props, prior_index) = match compatible {
                Some(Schema::Interface {
                    extends,
                    properties,
                    index_signature,
                }) => (extends.as_deref(), properties.as_deref(), index_signature.as_ref()),
                _ => (None, None, None),
            };

            if let Some(extends) = extends {
                let keys: Vec<String> = extends.iter().map(|e| json_key(&e.type_)).collect();
                let prior_ids: Vec<EncodeIdPair> = prior_extends
                    .map(|list| {
                        list.iter()
                            .map(|e| EncodeIdPair {
                                key: json_key(&e.type_),
                                id: e.id,
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                let ids = gen_encode_ids(&keys, Some(&prior_ids));
                for (entry, pair) in extends.iter_mut().zip(&ids) {
                    entry.id = pair.id;
                }
            }

            if let Some(properties) = properties {
                let keys: Vec<String> = properties.iter().map(|p| p.name.clone()).collect();
                let prior_ids: Vec<EncodeIdPair> = prior_props
                    .map(|props| {
                        props
                            .iter()
                            .map(|p| EncodeIdPair {
                                key: p.name.clone(),
                                id: p.id,
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                let ids = gen_encode_ids(&keys, Some(&prior_ids));
                for (property, pair) in properties.iter_mut().zip(&ids) {
                    property.id = pair.id;
                    // Compatibility follows the property name downward.
                    let sub_prior = prior_props
                        .and_then(|props| props.iter().find(|p| p.name == property.name))
                        .map(|p| &p.type_);
                    regen_schema_encode_ids(&mut property.type_, sub_prior);
                }
            }

            if let Some(signature) = index_signature {
                regen_schema_encode_ids(
                    &mut signature.type_,
                    prior_index.map(|i| i.type_.as_ref()),
                );
            }
        }
        Schema::Union { members } | Schema::Intersection { members } => {
            let prior_members = match compatible {
                Some(Schema::Union { members }) | Some(Schema::Intersection { members }) => {
                    Some(members)
                }
                _ => None,
            };
            let prior_ids = schema_encode_ids(compatible);
            let keys: Vec<String> = members.iter().map(|m| json_key(&m.type_)).collect();
            let ids = gen_encode_ids(&keys, Some(&prior_ids));
            for (member, pair) in members.iter_mut().zip(&ids) {
                member.id = pair.id;
                // Compatibility follows the (kept) member ID downward.
                let sub_prior = prior_members
                    .and_then(|list| list.iter().find(|m| m.id == pair.id))
                    .map(|m| &m.type_);
                regen_schema_encode_ids(&mut member.type_, sub_prior);
            }
        }
        Schema::Array { element_type } => {
            let prior = match compatible {
                Some(Schema::Array { element_type }) => Some(element_type.as_ref()),
                _ => None,
            };
            regen_schema_encode_ids(element_type, prior);
        }
        Schema::IndexedAccess { object_type, .. } => {
            let prior = match compatible {
                Some(Schema::IndexedAccess { object_type, .. }) => Some(object_type.as_ref()),
                _ => None,
            };
            regen_schema_encode_ids(object_type, prior);
        }
        Schema::Tuple { element_types } => {
            let prior_elements = match compatible {
                Some(Schema::Tuple { element_types }) => Some(element_types),
                _ => None,
            };
            for (i, element) in element_types.iter_mut().enumerate() {
                regen_schema_encode_ids(element, prior_elements.and_then(|list| list.get(i)));
            }
        }
        _ => {}
    }
}

fn json_key(schema: &Schema) -> String {
    serde_json::to_string(schema).expect("schema serializes to JSON")
}
