//! Method symbols and the `syn` front end that produces them.

use crate::document::{DocumentRef, RustDocument};
use crate::types::Location;
use crate::utils::paths::path_segments;
use quote::ToTokens;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::visit::Visit;
use syn::{
    ImplItemFn, ItemEnum, ItemFn, ItemStruct, ItemTrait, ItemType, ItemUnion, ItemUse, Signature,
    TraitItemFn, Type, TypeParamBound, UseTree,
};

/// Names the standard prelude brings into scope, with their namespace.
const PRELUDE: &[(&str, &str)] = &[
    ("Future", "std::future"),
    ("IntoFuture", "std::future"),
    ("Box", "std::boxed"),
    ("Vec", "std::vec"),
    ("Option", "std::option"),
    ("Result", "std::result"),
    ("String", "std::string"),
];

/// Marker traits skipped when picking the meaningful bound of `impl A + B`.
const MARKER_TRAITS: &[&str] = &["Send", "Sync", "Unpin"];

/// A type identified by simple name and namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    /// Simple name (e.g., `Future`).
    pub name: String,
    /// `::`-separated namespace (e.g., `std::future`), empty for local types.
    pub namespace: String,
}

impl TypeRef {
    /// Creates a type reference.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Parses a qualified path such as `std::future::Future`.
    ///
    /// `core` and `alloc` namespaces are normalized to `std`. Returns `None`
    /// for an empty path.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let mut segments: Vec<String> = path
            .trim()
            .trim_start_matches("::")
            .split("::")
            .map(|s| s.trim().to_string())
            .collect();
        let name = segments.pop().filter(|n| !n.is_empty())?;
        Some(Self::new(name, normalize_namespace(&segments)))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}::{}", self.namespace, self.name)
        }
    }
}

/// Declared return type of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    /// Returns no value.
    Void,
    /// A named type resolved to its namespace.
    Named(TypeRef),
    /// Any other type shape, kept as written.
    Other(String),
}

/// Where a symbol is declared.
#[derive(Debug, Clone)]
pub enum SymbolLocation {
    /// A position in source text.
    Source {
        /// The owning document, when the front end can supply it.
        document: Option<DocumentRef>,
        /// Position of the declaration.
        location: Location,
    },
    /// Not in source text (e.g., a symbol from compiled metadata).
    External {
        /// Description of where the symbol came from.
        origin: String,
    },
}

/// Read-only view of one method.
#[derive(Debug, Clone)]
pub struct MethodSymbol {
    /// Method name.
    pub name: String,
    /// Whether the method carries the `async` modifier.
    pub is_async: bool,
    /// Declared return type.
    pub return_type: ReturnType,
    /// Declaration sites; the first is the primary one.
    pub locations: Vec<SymbolLocation>,
}

impl MethodSymbol {
    /// Creates a synchronous method returning nothing, with no location.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_async: false,
            return_type: ReturnType::Void,
            locations: Vec::new(),
        }
    }

    /// Sets the `async` modifier.
    #[must_use]
    pub fn asynchronous(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    /// Sets the return type.
    #[must_use]
    pub fn returning(mut self, return_type: ReturnType) -> Self {
        self.return_type = return_type;
        self
    }

    /// Appends a declaration site.
    #[must_use]
    pub fn located_at(mut self, location: SymbolLocation) -> Self {
        self.locations.push(location);
        self
    }

    /// Returns the primary declaration site.
    #[must_use]
    pub fn primary_location(&self) -> Option<&SymbolLocation> {
        self.locations.first()
    }
}

/// Collects every function and method declared in `ast`.
///
/// Free functions, inherent and trait impl methods, and trait methods are
/// included, also when nested in inline modules or function bodies. Return
/// types are resolved through the file's `use` declarations; scoping of
/// those declarations is not tracked. A type declared in the file shadows
/// the prelude.
#[must_use]
pub fn collect_methods(document: &Arc<RustDocument>, ast: &syn::File) -> Vec<MethodSymbol> {
    let mut imports = ImportCollector::default();
    imports.visit_file(ast);

    let mut collector = MethodCollector {
        document,
        handle: document.clone(),
        imports: &imports.aliases,
        locals: &imports.locals,
        methods: Vec::new(),
    };
    collector.visit_file(ast);
    collector.methods
}

#[derive(Default)]
struct ImportCollector {
    aliases: HashMap<String, Vec<String>>,
    locals: HashSet<String>,
}

impl ImportCollector {
    fn add_tree(&mut self, prefix: Vec<String>, tree: &UseTree) {
        match tree {
            UseTree::Path(p) => {
                let mut next = prefix;
                next.push(p.ident.to_string());
                self.add_tree(next, &p.tree);
            }
            UseTree::Name(n) => {
                if n.ident == "self" {
                    if let Some(last) = prefix.last() {
                        self.aliases.insert(last.clone(), prefix.clone());
                    }
                } else {
                    let name = n.ident.to_string();
                    let mut full = prefix;
                    full.push(name.clone());
                    self.aliases.insert(name, full);
                }
            }
            UseTree::Rename(r) => {
                if r.rename == "_" {
                    return;
                }
                let mut full = prefix;
                if r.ident != "self" {
                    full.push(r.ident.to_string());
                }
                self.aliases.insert(r.rename.to_string(), full);
            }
            UseTree::Group(g) => {
                for item in &g.items {
                    self.add_tree(prefix.clone(), item);
                }
            }
            UseTree::Glob(_) => {}
        }
    }
}

impl<'ast> Visit<'ast> for ImportCollector {
    fn visit_item_use(&mut self, node: &'ast ItemUse) {
        self.add_tree(Vec::new(), &node.tree);
    }

    fn visit_item_struct(&mut self, node: &'ast ItemStruct) {
        self.locals.insert(node.ident.to_string());
    }

    fn visit_item_enum(&mut self, node: &'ast ItemEnum) {
        self.locals.insert(node.ident.to_string());
    }

    fn visit_item_union(&mut self, node: &'ast ItemUnion) {
        self.locals.insert(node.ident.to_string());
    }

    fn visit_item_trait(&mut self, node: &'ast ItemTrait) {
        self.locals.insert(node.ident.to_string());
        syn::visit::visit_item_trait(self, node);
    }

    fn visit_item_type(&mut self, node: &'ast ItemType) {
        self.locals.insert(node.ident.to_string());
    }
}

struct MethodCollector<'a> {
    document: &'a RustDocument,
    handle: DocumentRef,
    imports: &'a HashMap<String, Vec<String>>,
    locals: &'a HashSet<String>,
    methods: Vec<MethodSymbol>,
}

impl MethodCollector<'_> {
    fn push(&mut self, sig: &Signature) {
        let ident = &sig.ident;
        let location = Location::from_span(
            self.document.relative_path().to_path_buf(),
            ident.span(),
        );
        let offset = self.document.offset_for(location.line, location.column);
        let location = location.with_span(offset, ident.to_string().len());

        self.methods.push(
            MethodSymbol::new(ident.unraw().to_string())
                .asynchronous(sig.asyncness.is_some())
                .returning(self.resolve_return_type(&sig.output))
                .located_at(SymbolLocation::Source {
                    document: Some(self.handle.clone()),
                    location,
                }),
        );
    }

    fn resolve_return_type(&self, output: &syn::ReturnType) -> ReturnType {
        match output {
            syn::ReturnType::Default => ReturnType::Void,
            syn::ReturnType::Type(_, ty) => self.resolve_type(ty),
        }
    }

    fn resolve_type(&self, ty: &Type) -> ReturnType {
        let resolved = match ty {
            Type::Tuple(t) if t.elems.is_empty() => return ReturnType::Void,
            Type::Paren(p) => return self.resolve_type(&p.elem),
            Type::Group(g) => return self.resolve_type(&g.elem),
            Type::Path(p) if p.qself.is_none() => self.resolve_path(&p.path),
            Type::ImplTrait(t) => self.resolve_bounds(&t.bounds),
            Type::TraitObject(t) => self.resolve_bounds(&t.bounds),
            _ => None,
        };

        resolved.map_or_else(
            || ReturnType::Other(ty.to_token_stream().to_string()),
            ReturnType::Named,
        )
    }

    fn resolve_bounds<P>(&self, bounds: &Punctuated<TypeParamBound, P>) -> Option<TypeRef> {
        bounds.iter().find_map(|bound| match bound {
            TypeParamBound::Trait(t) => {
                let last = t.path.segments.last()?;
                if MARKER_TRAITS.iter().any(|m| last.ident == *m) {
                    None
                } else {
                    self.resolve_path(&t.path)
                }
            }
            _ => None,
        })
    }

    fn resolve_path(&self, path: &syn::Path) -> Option<TypeRef> {
        let written = path_segments(path);
        let (first, rest) = written.split_first()?;

        let mut full: Vec<String> = match self.imports.get(first) {
            Some(target) => target.iter().chain(rest).cloned().collect(),
            None if rest.is_empty() && !self.locals.contains(first) => {
                match PRELUDE.iter().find(|(name, _)| *name == first.as_str()) {
                    Some((name, namespace)) => namespace
                        .split("::")
                        .chain(std::iter::once(*name))
                        .map(String::from)
                        .collect(),
                    None => written.clone(),
                }
            }
            None => written.clone(),
        };

        let name = full.pop()?;
        Some(TypeRef::new(name, normalize_namespace(&full)))
    }
}

impl<'ast> Visit<'ast> for MethodCollector<'_> {
    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        self.push(&node.sig);
        syn::visit::visit_item_fn(self, node);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast ImplItemFn) {
        self.push(&node.sig);
        syn::visit::visit_impl_item_fn(self, node);
    }

    fn visit_trait_item_fn(&mut self, node: &'ast TraitItemFn) {
        self.push(&node.sig);
        syn::visit::visit_trait_item_fn(self, node);
    }
}

/// Strips path keywords and maps `core`/`alloc` onto `std`.
fn normalize_namespace(segments: &[String]) -> String {
    let mut segments: Vec<&str> = segments
        .iter()
        .map(String::as_str)
        .skip_while(|s| matches!(*s, "crate" | "self" | "super"))
        .collect();
    if let Some(first) = segments.first_mut() {
        if matches!(*first, "core" | "alloc") {
            *first = "std";
        }
    }
    segments.join("::")
}
