//! Semantic model: symbols, scopes and resolved references for a [`Program`].
//!
//! Built in three passes over every file:
//! 1. declarations (namespaces, types, members, parameters, locals) and their scopes,
//! 2. `using` imports and base lists, so lookup can reach imported and inherited names,
//! 3. every identifier in a referencing position, resolved or not.
//!
//! Namespaces are symbols with a member scope shared by every declaration of
//! the namespace. Partial types merge the same way. Calls carry their argument
//! count, which picks between overloads.
//!
//! The model is tied to the snapshot it was built from; [`SemanticModel::revision`]
//! identifies that snapshot.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::ast::{
    CallExpr, ConstructorDecl, MemberAccessExpr, MethodDecl, Name, NameRef, NamespaceDecl, NewExpr,
    Param, PropertyDecl, TypeDecl, TypeKind, TypeRef, UsingDirective, VarDecl,
};
use crate::line_index::Span;
use crate::program::{FileId, Program, SourceFile};
use crate::syntax_kind::{SyntaxKind, SyntaxKind::*, SyntaxNode};

/// Identity of a declared symbol within one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId(pub u32);

/// Identity of a scope within one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(pub u32);

/// The global namespace: top-level namespaces and types.
pub const GLOBAL_SCOPE: ScopeId = ScopeId(0);

/// What a symbol declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// `namespace`, merged across declarations.
    Namespace,
    /// `class`
    Class,
    /// `struct`
    Struct,
    /// `interface`
    Interface,
    /// `record`
    Record,
    /// `enum`
    Enum,
    /// `delegate`
    Delegate,
    /// Generic parameter of a type or method.
    TypeParameter,
    /// Member of an enum.
    EnumMember,
    /// Field.
    Field,
    /// Property, including positional record parameters.
    Property,
    /// Event.
    Event,
    /// Method.
    Method,
    /// Constructor; never bound by name.
    Constructor,
    /// Parameter of a method, constructor, delegate, lambda or indexer.
    Parameter,
    /// Local variable, pattern variable or range variable.
    Local,
    /// Local function.
    LocalFunction,
}

impl SymbolKind {
    /// Names a type.
    #[must_use]
    pub fn is_type(self) -> bool {
        matches!(
            self,
            SymbolKind::Class
                | SymbolKind::Struct
                | SymbolKind::Interface
                | SymbolKind::Record
                | SymbolKind::Enum
                | SymbolKind::Delegate
                | SymbolKind::TypeParameter
        )
    }

    /// Can be overloaded and called.
    #[must_use]
    pub fn is_invocable(self) -> bool {
        matches!(
            self,
            SymbolKind::Method | SymbolKind::Constructor | SymbolKind::LocalFunction
        )
    }

    /// Lower-case label used in messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SymbolKind::Namespace => "namespace",
            SymbolKind::Class => "class",
            SymbolKind::Struct => "struct",
            SymbolKind::Interface => "interface",
            SymbolKind::Record => "record",
            SymbolKind::Enum => "enum",
            SymbolKind::Delegate => "delegate",
            SymbolKind::TypeParameter => "type parameter",
            SymbolKind::EnumMember => "enum member",
            SymbolKind::Field => "field",
            SymbolKind::Property => "property",
            SymbolKind::Event => "event",
            SymbolKind::Method => "method",
            SymbolKind::Constructor => "constructor",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Local => "local",
            SymbolKind::LocalFunction => "local function",
        }
    }
}

impl From<TypeKind> for SymbolKind {
    fn from(kind: TypeKind) -> Self {
        match kind {
            TypeKind::Class => SymbolKind::Class,
            TypeKind::Struct => SymbolKind::Struct,
            TypeKind::Interface => SymbolKind::Interface,
            TypeKind::Record => SymbolKind::Record,
            TypeKind::Enum => SymbolKind::Enum,
            TypeKind::Delegate => SymbolKind::Delegate,
        }
    }
}

/// A declared entity.
#[derive(Debug, Clone, Serialize)]
pub struct Symbol {
    /// Identity.
    pub id: SymbolId,
    /// Declared name, without a verbatim `@`.
    pub name: String,
    /// What is declared.
    pub kind: SymbolKind,
    /// Declaring file (first declaration for namespaces and partial types).
    pub file: FileId,
    /// Range of the name token.
    pub name_span: Span,
    /// Range of the whole declaration node.
    pub decl_span: Span,
    /// Enclosing namespace, type or member.
    pub container: Option<SymbolId>,
    /// Scope the name is bound in.
    pub scope: ScopeId,
    /// Written type path (return type for methods); `None` for `var`, keyword
    /// types and arrays.
    pub declared_type: Option<String>,
}

/// Scope flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// The global namespace.
    Global,
    /// One source file; holds its `using` imports.
    File,
    /// Members of a namespace, shared by all its declarations.
    Namespace(SymbolId),
    /// One `namespace N { }` body; holds its `using` imports.
    NamespaceBody(SymbolId),
    /// Members and nested types of a type.
    Type(SymbolId),
    /// Parameters of a member, lambda or local function.
    Body,
    /// Locals of a block or statement.
    Block,
}

/// A `using` directive's contribution to lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Import {
    /// `using N;`: the types of `N`.
    Namespace(SymbolId),
    /// `using static T;`: the members of `T`.
    Static(SymbolId),
}

/// A lexical scope.
#[derive(Debug, Clone)]
pub struct Scope {
    /// Flavor.
    pub kind: ScopeKind,
    /// Enclosing scope; `None` only for the global scope.
    pub parent: Option<ScopeId>,
    /// File of the scope-introducing node; `None` for namespace member scopes.
    pub file: Option<FileId>,
    /// Range of the scope-introducing node.
    pub span: Option<Span>,
    names: HashMap<String, Vec<SymbolId>>,
    imports: Vec<Import>,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>, file: Option<FileId>, span: Option<Span>) -> Self {
        Self {
            kind,
            parent,
            file,
            span,
            names: HashMap::new(),
            imports: Vec::new(),
        }
    }

    /// Symbols bound to `name` directly in this scope, in declaration order.
    #[must_use]
    pub fn symbols_named(&self, name: &str) -> &[SymbolId] {
        self.names.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every symbol bound directly in this scope.
    pub fn symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.names.values().flatten().copied()
    }
}

/// How an identifier occurrence refers to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Unqualified name in an expression.
    Name,
    /// Name after a dot, or an object initializer member.
    Member,
    /// First segment of a written type.
    Type,
    /// Later segment of a dotted type path.
    NestedType,
    /// Constructor or destructor name (refers to its type).
    Constructor,
    /// `name:` of a named argument; the receiver is the invoked symbol.
    Argument,
}

impl ReferenceKind {
    /// Only type or namespace symbols can be the target.
    #[must_use]
    pub fn expects_type(self) -> bool {
        matches!(
            self,
            ReferenceKind::Type | ReferenceKind::NestedType | ReferenceKind::Constructor
        )
    }

    /// Resolved against a receiver rather than the scope chain.
    #[must_use]
    pub fn is_qualified(self) -> bool {
        matches!(
            self,
            ReferenceKind::Member | ReferenceKind::NestedType | ReferenceKind::Argument
        )
    }
}

/// An identifier occurrence in a referencing position.
#[derive(Debug, Clone, Serialize)]
pub struct Reference {
    /// File of the occurrence.
    pub file: FileId,
    /// Range of the identifier token.
    pub span: Span,
    /// Identifier text, without a verbatim `@`.
    pub name: String,
    /// How it refers.
    pub kind: ReferenceKind,
    /// Innermost scope at the occurrence.
    pub scope: ScopeId,
    /// Namespace, type or invoked symbol searched for qualified references.
    pub receiver: Option<SymbolId>,
    /// Argument count when the occurrence is called.
    pub arity: Option<u32>,
    /// Resolved symbol; `None` for builtins, external names and ambiguous calls.
    pub target: Option<SymbolId>,
}

/// Outcome of a name lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing binds the name.
    Unresolved,
    /// Exactly one binding wins.
    Unique(SymbolId),
    /// Two bindings compete in the same scope.
    Ambiguous(SymbolId, SymbolId),
}

impl Resolution {
    /// The winning symbol, if unambiguous.
    #[must_use]
    pub fn symbol(self) -> Option<SymbolId> {
        match self {
            Resolution::Unique(id) => Some(id),
            _ => None,
        }
    }
}

/// A symbol considered as if it were already called `name`, for asking what a
/// lookup would return after a rename.
#[derive(Debug, Clone, Copy)]
pub struct Hypothetical<'a> {
    /// Symbol being renamed.
    pub symbol: SymbolId,
    /// Name it would carry.
    pub name: &'a str,
}

/// Lookup filter.
#[derive(Debug, Clone, Copy, Default)]
struct Want {
    /// Types and namespaces only.
    types_only: bool,
    /// Argument count of a call.
    arity: Option<u32>,
}

impl Want {
    fn types() -> Self {
        Self {
            types_only: true,
            arity: None,
        }
    }

    fn called(arity: Option<u32>) -> Self {
        Self {
            types_only: false,
            arity,
        }
    }

    fn accepts(self, kind: SymbolKind) -> bool {
        !self.types_only || kind.is_type() || kind == SymbolKind::Namespace
    }
}

/// Accepted argument counts of an invocable.
#[derive(Debug, Clone, Copy)]
struct Signature {
    required: u32,
    max: Option<u32>,
}

impl Signature {
    fn of(params: &[Param]) -> Self {
        let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        let required = params.iter().filter(|p| !p.is_optional()).count();
        let max = (!params.iter().any(Param::is_params)).then(|| count(params.len()));
        Self {
            required: count(required),
            max,
        }
    }

    fn accepts(self, arity: u32) -> bool {
        self.required <= arity && self.max.is_none_or(|max| arity <= max)
    }
}

type NodeKey = (FileId, SyntaxKind, Span);

fn key(file: FileId, node: &SyntaxNode) -> NodeKey {
    (file, node.kind(), Span::from(node.text_range()))
}

/// A symbol about to be added.
struct NewSymbol {
    name: String,
    name_span: Span,
    kind: SymbolKind,
    file: FileId,
    decl_span: Span,
    container: Option<SymbolId>,
    scope: ScopeId,
    declared_type: Option<String>,
    bind: bool,
}

impl NewSymbol {
    fn named(name: &Name, kind: SymbolKind, file: FileId, decl: &SyntaxNode, scope: ScopeId) -> Self {
        Self {
            name: name.text(),
            name_span: Span::from(name.syntax().text_range()),
            kind,
            file,
            decl_span: Span::from(decl.text_range()),
            container: None,
            scope,
            declared_type: None,
            bind: true,
        }
    }

    fn within(mut self, container: Option<SymbolId>) -> Self {
        self.container = container;
        self
    }

    fn typed(mut self, ty: Option<TypeRef>) -> Self {
        self.declared_type = ty.as_ref().and_then(written_type);
        self
    }

    fn unbound(mut self) -> Self {
        self.bind = false;
        self
    }
}

/// Symbols, scopes and references of one program snapshot.
#[derive(Debug, Clone)]
pub struct SemanticModel {
    program: Program,
    symbols: Vec<Symbol>,
    scopes: Vec<Scope>,
    references: Vec<Reference>,
    refs_by_target: HashMap<SymbolId, Vec<usize>>,
    refs_by_name: HashMap<String, Vec<usize>>,
    refs_by_span: HashMap<(FileId, Span), usize>,
    decls: HashMap<(FileId, Span), SymbolId>,
    names: HashMap<(FileId, Span), SymbolId>,
    node_scopes: HashMap<NodeKey, ScopeId>,
    file_scopes: HashMap<FileId, ScopeId>,
    member_scopes: HashMap<SymbolId, ScopeId>,
    body_scopes: HashMap<SymbolId, ScopeId>,
    signatures: HashMap<SymbolId, Signature>,
    ctors: HashMap<SymbolId, Vec<SymbolId>>,
    partials: HashSet<SymbolId>,
    bases: HashMap<SymbolId, Vec<SymbolId>>,
    inferred: HashMap<SymbolId, SymbolId>,
}

impl SemanticModel {
    /// Build the model for `program`.
    #[must_use]
    pub fn build(program: &Program) -> Self {
        let mut model = Self {
            program: program.clone(),
            symbols: Vec::new(),
            scopes: vec![Scope::new(ScopeKind::Global, None, None, None)],
            references: Vec::new(),
            refs_by_target: HashMap::new(),
            refs_by_name: HashMap::new(),
            refs_by_span: HashMap::new(),
            decls: HashMap::new(),
            names: HashMap::new(),
            node_scopes: HashMap::new(),
            file_scopes: HashMap::new(),
            member_scopes: HashMap::new(),
            body_scopes: HashMap::new(),
            signatures: HashMap::new(),
            ctors: HashMap::new(),
            partials: HashSet::new(),
            bases: HashMap::new(),
            inferred: HashMap::new(),
        };

        for file in program.files() {
            let root = file.syntax();
            let scope = model.add_scope(ScopeKind::File, GLOBAL_SCOPE, file.id(), &root);
            model.file_scopes.insert(file.id(), scope);
            model.declare_items(file.id(), &root, GLOBAL_SCOPE, scope, None);
        }
        for file in program.files() {
            model.link_imports(file);
        }
        for file in program.files() {
            model.link_bases(file);
        }
        for file in program.files() {
            let scope = model.file_scopes.get(&file.id()).copied().unwrap_or(GLOBAL_SCOPE);
            model.resolve_node(file.id(), &file.syntax(), scope);
        }

        tracing::debug!(
            revision = program.revision(),
            symbols = model.symbols.len(),
            scopes = model.scopes.len(),
            references = model.references.len(),
            "built semantic model"
        );
        model
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Revision of the snapshot this model describes.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.program.revision()
    }

    /// The snapshot this model describes.
    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Symbol by id; `None` for ids from another model.
    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    /// All symbols in declaration order.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Scope by id; `None` for ids from another model.
    #[must_use]
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0 as usize)
    }

    /// Every recorded reference.
    #[must_use]
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// References resolved to `id`.
    pub fn references_to(&self, id: SymbolId) -> impl Iterator<Item = &Reference> + '_ {
        self.refs_by_target
            .get(&id)
            .into_iter()
            .flatten()
            .map(|idx| &self.references[*idx])
    }

    /// References spelled `name`, resolved or not.
    pub fn references_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Reference> + 'a {
        self.refs_by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(|idx| &self.references[*idx])
    }

    /// Reference whose identifier token spans exactly `span` in `file`.
    #[must_use]
    pub fn reference_at(&self, file: FileId, span: Span) -> Option<&Reference> {
        self.refs_by_span
            .get(&(file, span))
            .map(|idx| &self.references[*idx])
    }

    /// Symbol declared by the node spanning exactly `decl_span` in `file`.
    #[must_use]
    pub fn declared_symbol(&self, file: FileId, decl_span: Span) -> Option<SymbolId> {
        self.decls.get(&(file, decl_span)).copied()
    }

    /// Symbol whose name token spans exactly `name_span` in `file`.
    #[must_use]
    pub fn symbol_at_name(&self, file: FileId, name_span: Span) -> Option<SymbolId> {
        self.names.get(&(file, name_span)).copied()
    }

    /// Scope holding the members of type or namespace `id`.
    #[must_use]
    pub fn type_scope(&self, id: SymbolId) -> Option<ScopeId> {
        self.member_scopes.get(&id).copied()
    }

    /// Resolved base types of `ty`, in declaration order.
    #[must_use]
    pub fn base_types(&self, ty: SymbolId) -> &[SymbolId] {
        self.bases.get(&ty).map(Vec::as_slice).unwrap_or_default()
    }

    /// Types listing `ty` as a direct base.
    pub fn derived_types(&self, ty: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        self.bases
            .iter()
            .filter(move |(_, bases)| bases.contains(&ty))
            .map(|(derived, _)| *derived)
    }

    /// Members of `ty` called `name`, explicit interface implementations included.
    pub fn members_named<'a>(&'a self, ty: SymbolId, name: &'a str) -> impl Iterator<Item = SymbolId> + 'a {
        self.symbols
            .iter()
            .filter(move |s| s.container == Some(ty) && s.name == name && s.kind != SymbolKind::Constructor)
            .map(|s| s.id)
    }

    /// Whether `inner` is `outer` or nested inside it. Every body of a
    /// namespace or partial type counts as inside its member scope.
    #[must_use]
    pub fn scope_is_within(&self, inner: ScopeId, outer: ScopeId) -> bool {
        let Some(outer_scope) = self.scope(outer) else {
            return false;
        };
        let mut current = Some(inner);
        while let Some(id) = current {
            let Some(scope) = self.scope(id) else {
                return false;
            };
            let same = id == outer
                || match (scope.kind, outer_scope.kind) {
                    (ScopeKind::Type(a), ScopeKind::Type(b))
                    | (ScopeKind::NamespaceBody(a), ScopeKind::Namespace(b)) => a == b,
                    _ => false,
                };
            if same {
                return true;
            }
            current = scope.parent;
        }
        false
    }

    /// All scopes nested inside `outer`, `outer` included.
    pub fn scopes_within(&self, outer: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        (0..self.scopes.len())
            .map(|idx| ScopeId(u32::try_from(idx).unwrap_or(u32::MAX)))
            .filter(move |id| self.scope_is_within(*id, outer))
    }

    /// Innermost-first lookup from `scope`.
    #[must_use]
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.resolve_name(scope, name, false, None).symbol()
    }

    /// Like [`Self::lookup`], types and namespaces only.
    #[must_use]
    pub fn lookup_type(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.resolve_name(scope, name, true, None).symbol()
    }

    /// Member `name` of type or namespace `container`, searching base types.
    #[must_use]
    pub fn lookup_member(&self, container: SymbolId, name: &str) -> Option<SymbolId> {
        self.resolve_member(container, name, false, None).symbol()
    }

    /// Resolve an unqualified name, optionally pretending one symbol carries
    /// a different name.
    #[must_use]
    pub fn resolve_name(
        &self,
        scope: ScopeId,
        name: &str,
        types_only: bool,
        hypothetical: Option<Hypothetical<'_>>,
    ) -> Resolution {
        let want = Want {
            types_only,
            arity: None,
        };
        self.choose(&self.name_candidates(scope, name, want, hypothetical), None)
    }

    /// Resolve `name` among the members of `container` and its bases.
    #[must_use]
    pub fn resolve_member(
        &self,
        container: SymbolId,
        name: &str,
        types_only: bool,
        hypothetical: Option<Hypothetical<'_>>,
    ) -> Resolution {
        let want = Want {
            types_only,
            arity: None,
        };
        let found = self.member_candidates(container, name, want, hypothetical, &mut Vec::new());
        self.choose(&found, None)
    }

    /// Resolve what `reference` would bind to under `hypothetical`.
    #[must_use]
    pub fn re_resolve(&self, reference: &Reference, hypothetical: Option<Hypothetical<'_>>) -> Resolution {
        self.choose(&self.reference_candidates(reference, hypothetical), reference.arity)
    }

    /// Every symbol `reference` could bind to before overloads are weighed.
    #[must_use]
    pub fn candidates(&self, reference: &Reference) -> Vec<SymbolId> {
        self.reference_candidates(reference, None)
    }

    fn reference_candidates(&self, reference: &Reference, hypothetical: Option<Hypothetical<'_>>) -> Vec<SymbolId> {
        let name = hypothetical
            .filter(|h| reference.target == Some(h.symbol))
            .map_or(reference.name.as_str(), |h| h.name);
        let want = Want {
            types_only: reference.kind.expects_type(),
            arity: reference.arity,
        };
        match (reference.kind, reference.receiver) {
            (ReferenceKind::Argument, Some(invoked)) => match self.body_scopes.get(&invoked) {
                Some(params) => self.scope_candidates(*params, name, want, hypothetical),
                None => Vec::new(),
            },
            (kind, Some(receiver)) if kind.is_qualified() => {
                self.member_candidates(receiver, name, want, hypothetical, &mut Vec::new())
            }
            (kind, None) if kind.is_qualified() => Vec::new(),
            _ => self.name_candidates(reference.scope, name, want, hypothetical),
        }
    }

    /// Pick the binding among `candidates`; overloads are told apart by `arity`.
    fn choose(&self, candidates: &[SymbolId], arity: Option<u32>) -> Resolution {
        match candidates {
            [] => Resolution::Unresolved,
            [only] => Resolution::Unique(*only),
            [first, second, ..] => {
                let overloads = candidates
                    .iter()
                    .all(|id| self.symbol(*id).is_some_and(|s| s.kind.is_invocable()));
                if let Some(arity) = arity
                    && overloads
                {
                    let fitting: Vec<SymbolId> = candidates
                        .iter()
                        .copied()
                        .filter(|id| self.signatures.get(id).is_none_or(|sig| sig.accepts(arity)))
                        .collect();
                    if let [only] = fitting.as_slice() {
                        return Resolution::Unique(*only);
                    }
                    if let [a, b, ..] = fitting.as_slice() {
                        return Resolution::Ambiguous(*a, *b);
                    }
                }
                Resolution::Ambiguous(*first, *second)
            }
        }
    }

    /// Candidates from the innermost scope of the chain that binds `name`.
    fn name_candidates(
        &self,
        scope: ScopeId,
        name: &str,
        want: Want,
        hypothetical: Option<Hypothetical<'_>>,
    ) -> Vec<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let Some(scope) = self.scope(id) else {
                break;
            };
            let found = match scope.kind {
                ScopeKind::Type(owner) => self.member_candidates(owner, name, want, hypothetical, &mut Vec::new()),
                ScopeKind::NamespaceBody(ns) => {
                    let own = self.member_candidates(ns, name, want, hypothetical, &mut Vec::new());
                    if own.is_empty() {
                        self.imported(&scope.imports, name, want, hypothetical)
                    } else {
                        own
                    }
                }
                ScopeKind::File => {
                    let own = self.scope_candidates(GLOBAL_SCOPE, name, want, hypothetical);
                    if own.is_empty() {
                        let global = self.scopes.first().map(|g| g.imports.as_slice()).unwrap_or_default();
                        let imports: Vec<Import> = scope.imports.iter().chain(global).copied().collect();
                        self.imported(&imports, name, want, hypothetical)
                    } else {
                        own
                    }
                }
                _ => self.scope_candidates(id, name, want, hypothetical),
            };
            if !found.is_empty() {
                return found;
            }
            current = scope.parent;
        }
        Vec::new()
    }

    /// Symbols bound to `name` directly in `scope`, with the renamed symbol
    /// moved to its hypothetical name.
    fn scope_candidates(
        &self,
        scope: ScopeId,
        name: &str,
        want: Want,
        hypothetical: Option<Hypothetical<'_>>,
    ) -> Vec<SymbolId> {
        let Some(bound) = self.scope(scope) else {
            return Vec::new();
        };
        let renamed = hypothetical.map(|h| h.symbol);
        let mut found: Vec<SymbolId> = bound
            .symbols_named(name)
            .iter()
            .copied()
            .filter(|id| Some(*id) != renamed)
            .filter(|id| self.symbol(*id).is_some_and(|s| want.accepts(s.kind)))
            .collect();
        if let Some(h) = hypothetical
            && h.name == name
            && let Some(symbol) = self.symbol(h.symbol)
            && want.accepts(symbol.kind)
            && bound.symbols_named(&symbol.name).contains(&h.symbol)
        {
            found.push(h.symbol);
        }
        found
    }

    /// Members of a namespace or type; types fall back to their bases.
    fn member_candidates(
        &self,
        container: SymbolId,
        name: &str,
        want: Want,
        hypothetical: Option<Hypothetical<'_>>,
        visited: &mut Vec<SymbolId>,
    ) -> Vec<SymbolId> {
        if visited.contains(&container) {
            return Vec::new();
        }
        visited.push(container);
        let Some(scope) = self.type_scope(container) else {
            return Vec::new();
        };
        let own = self.scope_candidates(scope, name, want, hypothetical);
        if !own.is_empty() {
            return own;
        }
        for base in self.base_types(container) {
            let inherited = self.member_candidates(*base, name, want, hypothetical, visited);
            if !inherited.is_empty() {
                return inherited;
            }
        }
        Vec::new()
    }

    fn imported(
        &self,
        imports: &[Import],
        name: &str,
        want: Want,
        hypothetical: Option<Hypothetical<'_>>,
    ) -> Vec<SymbolId> {
        let mut found = Vec::new();
        for import in imports {
            let hits = match *import {
                Import::Namespace(ns) => self.type_scope(ns).map_or_else(Vec::new, |scope| {
                    self.scope_candidates(scope, name, want, hypothetical)
                        .into_iter()
                        .filter(|id| self.symbol(*id).is_some_and(|s| s.kind.is_type()))
                        .collect()
                }),
                Import::Static(ty) => self.member_candidates(ty, name, want, hypothetical, &mut Vec::new()),
            };
            for hit in hits {
                if !found.contains(&hit) {
                    found.push(hit);
                }
            }
        }
        found
    }

    /// Nearest enclosing type of `scope`.
    #[must_use]
    pub fn enclosing_type(&self, scope: ScopeId) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id)?;
            if let ScopeKind::Type(owner) = scope.kind {
                return Some(owner);
            }
            current = scope.parent;
        }
        None
    }

    /// Static type of values named by `id`, as a type symbol. Types and
    /// namespaces are their own receivers.
    #[must_use]
    pub fn type_of(&self, id: SymbolId) -> Option<SymbolId> {
        let symbol = self.symbol(id)?;
        if symbol.kind.is_type() || symbol.kind == SymbolKind::Namespace {
            return Some(id);
        }
        if matches!(symbol.kind, SymbolKind::EnumMember | SymbolKind::Constructor) {
            return symbol.container;
        }
        if let Some(inferred) = self.inferred.get(&id) {
            return Some(*inferred);
        }
        let path = symbol.declared_type.as_deref()?;
        self.resolve_type_path(symbol.scope, path)
    }

    fn resolve_type_path(&self, scope: ScopeId, path: &str) -> Option<SymbolId> {
        let mut segments = path.split('.');
        let mut current = self.lookup_type(scope, segments.next()?)?;
        for segment in segments {
            current = self.resolve_member(current, segment, true, None).symbol()?;
        }
        Some(current)
    }

    fn sym(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    // ------------------------------------------------------------------
    // Pass 1: declarations
    // ------------------------------------------------------------------

    fn new_scope(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(u32::try_from(self.scopes.len()).unwrap_or(u32::MAX));
        self.scopes.push(scope);
        id
    }

    fn add_scope(&mut self, kind: ScopeKind, parent: ScopeId, file: FileId, node: &SyntaxNode) -> ScopeId {
        let span = Span::from(node.text_range());
        let id = self.new_scope(Scope::new(kind, Some(parent), Some(file), Some(span)));
        self.node_scopes.insert(key(file, node), id);
        id
    }

    fn add_symbol(&mut self, new: NewSymbol) -> SymbolId {
        let id = SymbolId(u32::try_from(self.symbols.len()).unwrap_or(u32::MAX));
        if new.bind {
            self.scopes[new.scope.0 as usize]
                .names
                .entry(new.name.clone())
                .or_default()
                .push(id);
        }
        if new.kind != SymbolKind::Constructor {
            self.names.insert((new.file, new.name_span), id);
        }
        if new.kind != SymbolKind::Namespace {
            self.decls.insert((new.file, new.decl_span), id);
        }
        self.symbols.push(Symbol {
            id,
            name: new.name,
            kind: new.kind,
            file: new.file,
            name_span: new.name_span,
            decl_span: new.decl_span,
            container: new.container,
            scope: new.scope,
            declared_type: new.declared_type,
        });
        id
    }

    /// Declarations directly inside a file or namespace body. `bind` receives
    /// the names; `lexical` is where lookups from inside continue.
    fn declare_items(
        &mut self,
        file: FileId,
        node: &SyntaxNode,
        bind: ScopeId,
        lexical: ScopeId,
        container: Option<SymbolId>,
    ) {
        for child in node.children() {
            if let Some(namespace) = NamespaceDecl::cast(child.clone()) {
                self.declare_namespace(file, &namespace, bind, lexical, container);
            } else if let Some(decl) = TypeDecl::cast(child.clone()) {
                self.declare_type(file, &decl, bind, lexical, container);
            } else if child.kind() == MEMBER_LIST {
                self.declare_items(file, &child, bind, lexical, container);
            } else if !matches!(child.kind(), USING_DIRECTIVE | ATTRIBUTE_LIST | ERROR) {
                // Top-level statements.
                self.declare_body(file, &child, lexical, None);
            }
        }
    }

    fn declare_namespace(
        &mut self,
        file: FileId,
        decl: &NamespaceDecl,
        mut bind: ScopeId,
        mut lexical: ScopeId,
        mut container: Option<SymbolId>,
    ) {
        for segment in decl.segments() {
            let name = segment.text();
            let existing = self.scopes[bind.0 as usize]
                .symbols_named(&name)
                .iter()
                .copied()
                .find(|id| self.sym(*id).kind == SymbolKind::Namespace);
            let id = match existing {
                Some(id) => id,
                None => {
                    let id = self.add_symbol(NewSymbol {
                        name,
                        name_span: Span::from(segment.syntax().text_range()),
                        kind: SymbolKind::Namespace,
                        file,
                        decl_span: Span::from(decl.syntax().text_range()),
                        container,
                        scope: bind,
                        declared_type: None,
                        bind: true,
                    });
                    let members = self.new_scope(Scope::new(ScopeKind::Namespace(id), Some(bind), None, None));
                    self.member_scopes.insert(id, members);
                    id
                }
            };
            bind = self.member_scopes.get(&id).copied().unwrap_or(bind);
            lexical = self.add_scope(ScopeKind::NamespaceBody(id), lexical, file, decl.syntax());
            container = Some(id);
        }
        self.declare_items(file, decl.syntax(), bind, lexical, container);
    }

    fn declare_type(
        &mut self,
        file: FileId,
        decl: &TypeDecl,
        bind: ScopeId,
        lexical: ScopeId,
        container: Option<SymbolId>,
    ) {
        let Some(name) = decl.name() else {
            return;
        };
        let kind = SymbolKind::from(decl.kind());
        let merged = decl
            .is_partial()
            .then(|| {
                self.scopes[bind.0 as usize]
                    .symbols_named(&name.text())
                    .iter()
                    .copied()
                    .find(|id| self.partials.contains(id) && self.sym(*id).kind == kind)
            })
            .flatten();

        let (id, lexical) = match merged {
            Some(id) => {
                self.decls.insert((file, Span::from(decl.syntax().text_range())), id);
                (id, lexical)
            }
            None => {
                let id = self.add_symbol(
                    NewSymbol::named(&name, kind, file, decl.syntax(), bind)
                        .within(container)
                        .typed(decl.return_type().filter(|_| kind == SymbolKind::Delegate)),
                );
                if decl.is_partial() {
                    self.partials.insert(id);
                }
                // Class and struct primary constructor parameters sit between
                // the type and its surroundings.
                let primary = (matches!(kind, SymbolKind::Class | SymbolKind::Struct) && decl.params().next().is_some())
                    .then(|| self.add_scope(ScopeKind::Body, lexical, file, &primary_list(decl)));
                (id, primary.unwrap_or(lexical))
            }
        };

        let part = self.add_scope(ScopeKind::Type(id), lexical, file, decl.syntax());
        let members = match self.member_scopes.get(&id) {
            Some(scope) => *scope,
            None => {
                self.member_scopes.insert(id, part);
                part
            }
        };

        if merged.is_none() {
            for param in decl.type_params() {
                self.add_symbol(
                    NewSymbol::named(&param, SymbolKind::TypeParameter, file, param.syntax(), members).within(Some(id)),
                );
            }
            self.declare_primary_params(file, decl, members, id, lexical);
        }

        for member in decl.enum_members() {
            if let Some(member_name) = member.name() {
                let mut symbol = NewSymbol::named(&member_name, SymbolKind::EnumMember, file, member.syntax(), members)
                    .within(Some(id));
                symbol.declared_type = Some(name.text());
                self.add_symbol(symbol);
            }
            let body = self.add_scope(ScopeKind::Body, part, file, member.syntax());
            self.declare_member_body(file, member.syntax(), body, Some(id));
        }
        for member in decl.members() {
            self.declare_member(file, &member, members, part, id);
        }
    }

    /// Primary constructor and delegate parameters.
    fn declare_primary_params(&mut self, file: FileId, decl: &TypeDecl, members: ScopeId, id: SymbolId, lexical: ScopeId) {
        let params: Vec<Param> = decl.params().collect();
        if params.is_empty() && decl.kind() != TypeKind::Delegate {
            return;
        }
        let list = primary_list(decl);
        match decl.kind() {
            TypeKind::Delegate => {
                let body = self.add_scope(ScopeKind::Body, members, file, &list);
                self.declare_params(file, &params, body, Some(id));
                self.body_scopes.insert(id, body);
                self.signatures.insert(id, Signature::of(&params));
            }
            TypeKind::Record => {
                // Positional parameters are properties.
                for param in &params {
                    if let Some(name) = param.name() {
                        self.add_symbol(
                            NewSymbol::named(&name, SymbolKind::Property, file, param.syntax(), members)
                                .within(Some(id))
                                .typed(param.ty()),
                        );
                    }
                }
                self.add_primary_ctor(file, decl, &list, &params, members);
            }
            _ => {
                self.declare_params(file, &params, lexical, Some(id));
                self.add_primary_ctor(file, decl, &list, &params, lexical);
            }
        }
    }

    fn add_primary_ctor(&mut self, file: FileId, decl: &TypeDecl, list: &SyntaxNode, params: &[Param], scope: ScopeId) {
        let Some(name) = decl.name() else {
            return;
        };
        let Some(owner) = self.declared_symbol(file, Span::from(decl.syntax().text_range())) else {
            return;
        };
        let ctor = self.add_symbol(
            NewSymbol::named(&name, SymbolKind::Constructor, file, list, scope)
                .within(Some(owner))
                .unbound(),
        );
        self.body_scopes.insert(ctor, scope);
        self.signatures.insert(ctor, Signature::of(params));
        self.ctors.entry(owner).or_default().push(ctor);
    }

    fn declare_member(&mut self, file: FileId, node: &SyntaxNode, bind: ScopeId, lexical: ScopeId, owner: SymbolId) {
        match node.kind() {
            kind if kind.is_type_decl() => {
                if let Some(decl) = TypeDecl::cast(node.clone()) {
                    self.declare_type(file, &decl, bind, lexical, Some(owner));
                }
            }
            METHOD_DECL => {
                let Some(method) = MethodDecl::cast(node.clone()) else {
                    return;
                };
                let symbol = method.name().map(|name| {
                    let new = NewSymbol::named(&name, SymbolKind::Method, file, node, bind)
                        .within(Some(owner))
                        .typed(method.return_type());
                    // `void IFoo.Run()` is not reachable by its simple name.
                    self.add_symbol(if method.is_explicit() { new.unbound() } else { new })
                });
                let body = self.add_scope(ScopeKind::Body, lexical, file, node);
                self.declare_generic_params(file, node, body, symbol);
                let params: Vec<Param> = method.params().collect();
                self.declare_params(file, &params, body, symbol);
                if let Some(symbol) = symbol {
                    self.body_scopes.insert(symbol, body);
                    self.signatures.insert(symbol, Signature::of(&params));
                }
                self.declare_member_body(file, node, body, symbol);
            }
            CONSTRUCTOR_DECL => {
                let Some(ctor) = ConstructorDecl::cast(node.clone()) else {
                    return;
                };
                let body = self.add_scope(ScopeKind::Body, lexical, file, node);
                let params: Vec<Param> = ctor.params().collect();
                let symbol = ctor.name_ref().map(|name| {
                    self.add_symbol(NewSymbol {
                        name: name.text(),
                        name_span: Span::from(name.syntax().text_range()),
                        kind: SymbolKind::Constructor,
                        file,
                        decl_span: Span::from(node.text_range()),
                        container: Some(owner),
                        scope: bind,
                        declared_type: None,
                        bind: false,
                    })
                });
                self.declare_params(file, &params, body, symbol.or(Some(owner)));
                if let Some(symbol) = symbol {
                    self.body_scopes.insert(symbol, body);
                    self.signatures.insert(symbol, Signature::of(&params));
                    self.ctors.entry(owner).or_default().push(symbol);
                }
                self.declare_member_body(file, node, body, symbol.or(Some(owner)));
            }
            PROPERTY_DECL | EVENT_DECL => {
                let kind = if node.kind() == EVENT_DECL {
                    SymbolKind::Event
                } else {
                    SymbolKind::Property
                };
                let explicit = node.children().any(|n| n.kind() == EXPLICIT_IFACE);
                let ty = node.children().find_map(TypeRef::cast);
                let symbol = PropertyDecl::cast(node.clone())
                    .and_then(|p| p.name())
                    .or_else(|| node.children().find_map(Name::cast))
                    .map(|name| {
                        let new = NewSymbol::named(&name, kind, file, node, bind)
                            .within(Some(owner))
                            .typed(ty);
                        self.add_symbol(if explicit { new.unbound() } else { new })
                    });
                let body = self.add_scope(ScopeKind::Body, lexical, file, node);
                self.declare_member_body(file, node, body, symbol.or(Some(owner)));
            }
            INDEXER_DECL | OPERATOR_DECL | DESTRUCTOR_DECL => {
                let body = self.add_scope(ScopeKind::Body, lexical, file, node);
                let params: Vec<Param> = node
                    .children()
                    .filter(|n| n.kind() == PARAM_LIST)
                    .flat_map(|list| list.children())
                    .filter_map(Param::cast)
                    .collect();
                self.declare_params(file, &params, body, Some(owner));
                self.declare_member_body(file, node, body, Some(owner));
            }
            FIELD_DECL => {
                let Some(var) = node.children().find_map(VarDecl::cast) else {
                    return;
                };
                let kind = if node
                    .children_with_tokens()
                    .any(|e| e.as_token().is_some_and(|t| t.kind() == KEYWORD && t.text() == "event"))
                {
                    SymbolKind::Event
                } else {
                    SymbolKind::Field
                };
                let body = self.add_scope(ScopeKind::Body, lexical, file, node);
                for declarator in var.declarators() {
                    if let Some(name) = declarator.name() {
                        self.add_symbol(
                            NewSymbol::named(&name, kind, file, declarator.syntax(), bind)
                                .within(Some(owner))
                                .typed(var.ty()),
                        );
                    }
                    if let Some(init) = declarator.initializer() {
                        self.declare_body(file, &init, body, Some(owner));
                    }
                }
            }
            _ => {}
        }
    }

    /// Method and local function generic parameters.
    fn declare_generic_params(&mut self, file: FileId, node: &SyntaxNode, scope: ScopeId, owner: Option<SymbolId>) {
        let params: Vec<Name> = node
            .children()
            .filter(|n| n.kind() == TYPE_PARAM_LIST)
            .flat_map(|list| list.children())
            .filter_map(|p| p.children().find_map(Name::cast))
            .collect();
        for name in params {
            let decl = name.syntax().parent().unwrap_or_else(|| name.syntax().clone());
            self.add_symbol(NewSymbol::named(&name, SymbolKind::TypeParameter, file, &decl, scope).within(owner));
        }
    }

    fn declare_params(&mut self, file: FileId, params: &[Param], scope: ScopeId, owner: Option<SymbolId>) {
        for param in params {
            if let Some(name) = param.name() {
                self.add_symbol(
                    NewSymbol::named(&name, SymbolKind::Parameter, file, param.syntax(), scope)
                        .within(owner)
                        .typed(param.ty()),
                );
            }
        }
    }

    /// Bodies, accessors, initializers and default values of a member.
    fn declare_member_body(&mut self, file: FileId, node: &SyntaxNode, scope: ScopeId, owner: Option<SymbolId>) {
        for child in node.children() {
            match child.kind() {
                BLOCK | EXPR_BODY | ACCESSOR_LIST | CTOR_INITIALIZER => self.declare_body(file, &child, scope, owner),
                kind if kind.is_expr() => self.declare_body(file, &child, scope, owner),
                _ => {}
            }
        }
    }

    fn declare_body(&mut self, file: FileId, node: &SyntaxNode, scope: ScopeId, owner: Option<SymbolId>) {
        match node.kind() {
            BLOCK | FOR_STMT | FOREACH_STMT | USING_STMT | CATCH_CLAUSE => {
                let inner = self.add_scope(ScopeKind::Block, scope, file, node);
                self.declare_children(file, node, inner, owner);
            }
            LAMBDA_EXPR => {
                let body = self.add_scope(ScopeKind::Body, scope, file, node);
                let params: Vec<Param> = node
                    .children()
                    .flat_map(|n| if n.kind() == PARAM_LIST { n.children().collect::<Vec<_>>() } else { vec![n] })
                    .filter_map(Param::cast)
                    .collect();
                self.declare_params(file, &params, body, owner);
                self.declare_children(file, node, body, owner);
            }
            LOCAL_FUNCTION => {
                let symbol = node.children().find_map(Name::cast).map(|name| {
                    self.add_symbol(
                        NewSymbol::named(&name, SymbolKind::LocalFunction, file, node, scope)
                            .within(owner)
                            .typed(node.children().find_map(TypeRef::cast)),
                    )
                });
                let body = self.add_scope(ScopeKind::Body, scope, file, node);
                self.declare_generic_params(file, node, body, symbol);
                let params: Vec<Param> = node
                    .children()
                    .filter(|n| n.kind() == PARAM_LIST)
                    .flat_map(|list| list.children())
                    .filter_map(Param::cast)
                    .collect();
                self.declare_params(file, &params, body, symbol);
                if let Some(symbol) = symbol {
                    self.body_scopes.insert(symbol, body);
                    self.signatures.insert(symbol, Signature::of(&params));
                }
                self.declare_member_body(file, node, body, symbol);
            }
            NAME => {
                if let Some(name) = Name::cast(node.clone()) {
                    let decl = node.parent().unwrap_or_else(|| node.clone());
                    let ty = local_type(&decl);
                    self.add_symbol(
                        NewSymbol::named(&name, SymbolKind::Local, file, &decl, scope)
                            .within(owner)
                            .typed(ty),
                    );
                }
            }
            PARAM_LIST | PARAM | TYPE_PARAM_LIST | ATTRIBUTE_LIST => {}
            _ => self.declare_children(file, node, scope, owner),
        }
    }

    fn declare_children(&mut self, file: FileId, node: &SyntaxNode, scope: ScopeId, owner: Option<SymbolId>) {
        for child in node.children() {
            self.declare_body(file, &child, scope, owner);
        }
    }

    // ------------------------------------------------------------------
    // Pass 2: imports and inheritance
    // ------------------------------------------------------------------

    /// Scope a `using` directive contributes to: its file or namespace body.
    fn using_holder(&self, file: FileId, using: &SyntaxNode) -> ScopeId {
        using
            .ancestors()
            .skip(1)
            .find(|n| matches!(n.kind(), NAMESPACE_DECL | SOURCE_FILE))
            .and_then(|n| self.node_scopes.get(&key(file, &n)).copied())
            .unwrap_or(GLOBAL_SCOPE)
    }

    fn link_imports(&mut self, file: &SourceFile) {
        let usings: Vec<UsingDirective> = file
            .syntax()
            .descendants()
            .filter_map(UsingDirective::cast)
            .collect();
        for using in usings {
            if using.alias().is_some() {
                continue;
            }
            let Some(target) = using.target() else {
                continue;
            };
            let holder = if using.is_global() {
                GLOBAL_SCOPE
            } else {
                self.using_holder(file.id(), using.syntax())
            };
            let Some(resolved) = self.resolve_type_path(holder, &target.path()) else {
                continue;
            };
            let import = match self.sym(resolved).kind {
                SymbolKind::Namespace if !using.is_static() => Import::Namespace(resolved),
                kind if kind.is_type() && using.is_static() => Import::Static(resolved),
                _ => continue,
            };
            self.scopes[holder.0 as usize].imports.push(import);
        }
    }

    fn link_bases(&mut self, file: &SourceFile) {
        let decls: Vec<TypeDecl> = file.syntax().descendants().filter_map(TypeDecl::cast).collect();
        for decl in decls {
            let Some(id) = self.declared_symbol(file.id(), Span::from(decl.syntax().text_range())) else {
                continue;
            };
            let Some(scope) = self.node_scopes.get(&key(file.id(), decl.syntax())).copied() else {
                continue;
            };
            let from = self.scopes[scope.0 as usize].parent.unwrap_or(GLOBAL_SCOPE);
            let bases: Vec<SymbolId> = decl
                .base_types()
                .filter_map(|base| self.resolve_type_path(from, &base.path()))
                .filter(|base| *base != id && self.sym(*base).kind.is_type())
                .collect();
            let entry = self.bases.entry(id).or_default();
            for base in bases {
                if !entry.contains(&base) {
                    entry.push(base);
                }
            }
        }
        self.bases.retain(|_, bases| !bases.is_empty());
    }

    // ------------------------------------------------------------------
    // Pass 3: references
    // ------------------------------------------------------------------

    fn resolve_node(&mut self, file: FileId, node: &SyntaxNode, outer: ScopeId) {
        let scope = self.node_scopes.get(&key(file, node)).copied().unwrap_or(outer);
        match node.kind() {
            TYPE_REF => {
                if let Some(type_ref) = TypeRef::cast(node.clone()) {
                    self.resolve_type_ref(file, &type_ref, scope);
                }
                self.resolve_children(file, node, scope);
                return;
            }
            PATH_EXPR => {
                if let Some(name_ref) = node.children().find_map(NameRef::cast) {
                    let arity = call_arity(node);
                    let found = self.name_candidates(scope, &name_ref.text(), Want::called(arity), None);
                    let target = self.choose(&found, arity).symbol();
                    self.record(file, &name_ref, ReferenceKind::Name, scope, None, arity, target);
                }
                self.resolve_children(file, node, scope);
                return;
            }
            MEMBER_ACCESS_EXPR => {
                if let Some(access) = MemberAccessExpr::cast(node.clone()) {
                    let receiver_node = access.receiver();
                    if let Some(receiver) = &receiver_node {
                        self.resolve_node(file, receiver, scope);
                    }
                    if let Some(name_ref) = access.name_ref() {
                        let receiver = receiver_node.and_then(|r| self.infer_type(&r, scope));
                        self.record_member(file, &name_ref, scope, receiver, call_arity(node));
                    }
                }
                for child in node.children().filter(|c| c.kind() == TYPE_ARG_LIST) {
                    self.resolve_node(file, &child, scope);
                }
                return;
            }
            MEMBER_BINDING_EXPR => {
                if let Some(name_ref) = node.children().find_map(NameRef::cast) {
                    let receiver = node
                        .ancestors()
                        .find(|n| n.kind() == CONDITIONAL_ACCESS_EXPR)
                        .and_then(|cond| cond.children().find(|n| n.kind().is_expr()))
                        .and_then(|cond| self.infer_type(&cond, scope));
                    self.record_member(file, &name_ref, scope, receiver, call_arity(node));
                }
                self.resolve_children(file, node, scope);
                return;
            }
            NAMESPACE_DECL => {
                for child in node.children().filter(|c| c.kind() != TYPE_REF) {
                    self.resolve_node(file, &child, scope);
                }
                return;
            }
            NEW_EXPR => {
                self.resolve_new(file, node, scope);
                return;
            }
            WITH_EXPR => {
                self.resolve_with(file, node, scope);
                return;
            }
            CALL_EXPR => {
                self.resolve_children(file, node, scope);
                if let Some(call) = CallExpr::cast(node.clone())
                    && let Some(callee) = call.callee()
                {
                    let invoked = self
                        .expr_symbol(&callee, scope, call_arity(&callee))
                        .and_then(|id| self.invoked(id));
                    self.resolve_named_args(file, node, scope, invoked);
                }
                return;
            }
            CTOR_INITIALIZER => {
                let ty = self.enclosing_type(scope);
                let ty = if node.children_with_tokens().any(|e| e.kind() == BASE_KW) {
                    ty.and_then(|t| self.base_types(t).first().copied())
                } else {
                    ty
                };
                let ctor = ty.and_then(|t| self.pick_ctor(t, node));
                self.resolve_children(file, node, scope);
                self.resolve_named_args(file, node, scope, ctor);
                return;
            }
            CONSTRUCTOR_DECL | DESTRUCTOR_DECL => {
                if let Some(name_ref) = node.children().find_map(NameRef::cast) {
                    let target = self
                        .enclosing_type(scope)
                        .filter(|ty| self.sym(*ty).name == name_ref.text());
                    self.record(file, &name_ref, ReferenceKind::Constructor, scope, None, None, target);
                }
            }
            kind if kind.is_type_decl() => {
                // Later parts of a partial type refer to the first.
                if let Some(decl) = TypeDecl::cast(node.clone())
                    && let Some(name) = decl.name()
                    && let Some(id) = self.declared_symbol(file, Span::from(node.text_range()))
                    && self.sym(id).name_span != Span::from(name.syntax().text_range())
                {
                    self.record_name(file, &name, ReferenceKind::Type, outer, id);
                }
            }
            _ => {}
        }

        self.resolve_children(file, node, scope);

        if let Some(var) = VarDecl::cast(node.clone())
            && var.ty().is_none()
        {
            self.infer_locals(file, &var, scope);
        }
    }

    fn resolve_children(&mut self, file: FileId, node: &SyntaxNode, scope: ScopeId) {
        for child in node.children() {
            if child.kind() != NAME_REF {
                self.resolve_node(file, &child, scope);
            }
        }
    }

    fn resolve_type_ref(&mut self, file: FileId, type_ref: &TypeRef, scope: ScopeId) {
        let mut previous: Option<SymbolId> = None;
        for (idx, segment) in type_ref.segments().enumerate() {
            let name = segment.text();
            let (kind, receiver, target) = if idx == 0 {
                (ReferenceKind::Type, None, self.lookup_type(scope, &name))
            } else {
                let target = previous.and_then(|ty| self.resolve_member(ty, &name, true, None).symbol());
                (ReferenceKind::NestedType, previous, target)
            };
            self.record(file, &segment, kind, scope, receiver, None, target);
            previous = target;
        }
    }

    fn record_member(
        &mut self,
        file: FileId,
        name_ref: &NameRef,
        scope: ScopeId,
        receiver: Option<SymbolId>,
        arity: Option<u32>,
    ) {
        let target = receiver.and_then(|ty| {
            let found = self.member_candidates(ty, &name_ref.text(), Want::called(arity), None, &mut Vec::new());
            self.choose(&found, arity).symbol()
        });
        self.record(file, name_ref, ReferenceKind::Member, scope, receiver, arity, target);
    }

    fn resolve_new(&mut self, file: FileId, node: &SyntaxNode, scope: ScopeId) {
        let Some(new) = NewExpr::cast(node.clone()) else {
            return;
        };
        let ty = new
            .type_ref()
            .filter(|t| !t.is_wrapped())
            .and_then(|t| self.resolve_type_path(scope, &t.path()));
        let ctor = ty.and_then(|t| self.pick_ctor(t, node));
        for child in node.children() {
            if child.kind() == INITIALIZER_EXPR {
                self.resolve_initializer(file, &child, scope, ty);
            } else {
                self.resolve_node(file, &child, scope);
            }
        }
        self.resolve_named_args(file, node, scope, ctor);
    }

    fn resolve_with(&mut self, file: FileId, node: &SyntaxNode, scope: ScopeId) {
        let mut receiver = None;
        for child in node.children() {
            if child.kind() == ASSIGN_EXPR {
                self.resolve_assignment(file, &child, scope, receiver);
            } else {
                if receiver.is_none() && child.kind().is_expr() {
                    receiver = self.infer_type(&child, scope);
                }
                self.resolve_node(file, &child, scope);
            }
        }
    }

    /// `{ A = 1, B = { C = 2 } }` assigns members of `ty`.
    fn resolve_initializer(&mut self, file: FileId, node: &SyntaxNode, scope: ScopeId, ty: Option<SymbolId>) {
        for child in node.children() {
            if child.kind() == ASSIGN_EXPR {
                self.resolve_assignment(file, &child, scope, ty);
            } else {
                self.resolve_node(file, &child, scope);
            }
        }
    }

    fn resolve_assignment(&mut self, file: FileId, node: &SyntaxNode, scope: ScopeId, ty: Option<SymbolId>) {
        let mut children = node.children();
        let Some(lhs) = children.next() else {
            return;
        };
        let member = lhs.children().find_map(NameRef::cast).filter(|_| lhs.kind() == PATH_EXPR);
        let Some(name_ref) = member else {
            self.resolve_node(file, node, scope);
            return;
        };
        self.record_member(file, &name_ref, scope, ty, None);
        let member_ty = self
            .references
            .last()
            .and_then(|r| r.target)
            .and_then(|id| self.type_of(id));
        for rhs in children {
            if rhs.kind() == INITIALIZER_EXPR {
                self.resolve_initializer(file, &rhs, scope, member_ty);
            } else {
                self.resolve_node(file, &rhs, scope);
            }
        }
    }

    /// Constructor of `ty` matching the argument count of `node`'s list.
    fn pick_ctor(&self, ty: SymbolId, node: &SyntaxNode) -> Option<SymbolId> {
        let ctors = self.ctors.get(&ty)?;
        let arity = u32::try_from(arg_count(node)).unwrap_or(u32::MAX);
        self.choose(ctors, Some(arity)).symbol()
    }

    /// Method, local function or constructor behind a called symbol;
    /// delegate-typed values lead to the delegate.
    fn invoked(&self, id: SymbolId) -> Option<SymbolId> {
        let symbol = self.symbol(id)?;
        if symbol.kind.is_invocable() {
            return Some(id);
        }
        self.type_of(id)
            .filter(|ty| self.sym(*ty).kind == SymbolKind::Delegate)
    }

    /// `name:` of each argument in `node`'s list, bound to `invoked`'s parameters.
    fn resolve_named_args(&mut self, file: FileId, node: &SyntaxNode, scope: ScopeId, invoked: Option<SymbolId>) {
        let names: Vec<NameRef> = node
            .children()
            .filter(|n| n.kind() == ARG_LIST)
            .flat_map(|list| list.children())
            .filter(|n| n.kind() == ARG)
            .filter_map(|arg| arg.children().find_map(NameRef::cast))
            .collect();
        for name_ref in names {
            let target = invoked
                .and_then(|id| self.body_scopes.get(&id).copied())
                .and_then(|params| {
                    let found = self.scope_candidates(params, &name_ref.text(), Want::default(), None);
                    self.choose(&found, None).symbol()
                });
            self.record(file, &name_ref, ReferenceKind::Argument, scope, invoked, None, target);
        }
    }

    fn infer_locals(&mut self, file: FileId, var: &VarDecl, scope: ScopeId) {
        for declarator in var.declarators() {
            let Some(id) = self.declared_symbol(file, Span::from(declarator.syntax().text_range())) else {
                continue;
            };
            if let Some(ty) = declarator.initializer().and_then(|init| self.infer_type(&init, scope)) {
                self.inferred.insert(id, ty);
            }
        }
    }

    /// Static type of an expression, when it names a declared type or namespace.
    fn infer_type(&self, expr: &SyntaxNode, scope: ScopeId) -> Option<SymbolId> {
        match expr.kind() {
            THIS_EXPR => self.enclosing_type(scope),
            BASE_EXPR => self
                .enclosing_type(scope)
                .and_then(|ty| self.base_types(ty).first().copied()),
            PAREN_EXPR => expr
                .children()
                .find(|n| n.kind().is_expr())
                .and_then(|inner| self.infer_type(&inner, scope)),
            NEW_EXPR | CAST_EXPR => {
                let type_ref = expr.children().find_map(TypeRef::cast)?;
                if type_ref.is_wrapped() {
                    return None;
                }
                self.resolve_type_path(scope, &type_ref.path())
            }
            TYPE_REF => {
                let type_ref = TypeRef::cast(expr.clone())?;
                self.resolve_type_path(scope, &type_ref.path())
            }
            CALL_EXPR => {
                let callee = CallExpr::cast(expr.clone())?.callee()?;
                let called = self.expr_symbol(&callee, scope, call_arity(&callee))?;
                let invoked = self.invoked(called)?;
                if self.sym(invoked).kind == SymbolKind::Delegate {
                    let path = self.sym(invoked).declared_type.as_deref()?;
                    return self.resolve_type_path(self.sym(invoked).scope, path);
                }
                self.type_of(invoked)
            }
            PATH_EXPR | MEMBER_ACCESS_EXPR => {
                let symbol = self.expr_symbol(expr, scope, None)?;
                self.type_of(symbol)
            }
            _ => None,
        }
    }

    /// Symbol named by a name or member-access expression.
    fn expr_symbol(&self, expr: &SyntaxNode, scope: ScopeId, arity: Option<u32>) -> Option<SymbolId> {
        match expr.kind() {
            PATH_EXPR => {
                let name_ref = expr.children().find_map(NameRef::cast)?;
                let found = self.name_candidates(scope, &name_ref.text(), Want::called(arity), None);
                self.choose(&found, arity).symbol()
            }
            MEMBER_ACCESS_EXPR => {
                let access = MemberAccessExpr::cast(expr.clone())?;
                let receiver = self.infer_type(&access.receiver()?, scope)?;
                let name = access.name_ref()?.text();
                let found = self.member_candidates(receiver, &name, Want::called(arity), None, &mut Vec::new());
                self.choose(&found, arity).symbol()
            }
            PAREN_EXPR => {
                let inner = expr.children().find(|n| n.kind().is_expr())?;
                self.expr_symbol(&inner, scope, arity)
            }
            _ => None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &mut self,
        file: FileId,
        name_ref: &NameRef,
        kind: ReferenceKind,
        scope: ScopeId,
        receiver: Option<SymbolId>,
        arity: Option<u32>,
        target: Option<SymbolId>,
    ) {
        let name = name_ref.text();
        if name.is_empty() {
            return;
        }
        self.push_reference(Reference {
            file,
            span: Span::from(name_ref.syntax().text_range()),
            name,
            kind,
            scope,
            receiver,
            arity,
            target,
        });
    }

    fn record_name(&mut self, file: FileId, name: &Name, kind: ReferenceKind, scope: ScopeId, target: SymbolId) {
        self.push_reference(Reference {
            file,
            span: Span::from(name.syntax().text_range()),
            name: name.text(),
            kind,
            scope,
            receiver: None,
            arity: None,
            target: Some(target),
        });
    }

    fn push_reference(&mut self, reference: Reference) {
        let idx = self.references.len();
        if let Some(target) = reference.target {
            self.refs_by_target.entry(target).or_default().push(idx);
        }
        self.refs_by_name
            .entry(reference.name.clone())
            .or_default()
            .push(idx);
        self.refs_by_span.insert((reference.file, reference.span), idx);
        self.references.push(reference);
    }
}

/// Type path usable for member lookup; keyword types, arrays, nullables and
/// tuples have no declared members.
fn written_type(type_ref: &TypeRef) -> Option<String> {
    if type_ref.is_wrapped() || type_ref.predefined().is_some() {
        return None;
    }
    let path = type_ref.path();
    (!path.is_empty()).then_some(path)
}

/// Written type of a local declared by `decl`.
fn local_type(decl: &SyntaxNode) -> Option<TypeRef> {
    if decl.kind() == DECLARATOR {
        return decl
            .parent()
            .and_then(VarDecl::cast)
            .and_then(|var| var.ty());
    }
    decl.children().find_map(TypeRef::cast)
}

/// The parameter list of a type declaration, or the declaration itself.
fn primary_list(decl: &TypeDecl) -> SyntaxNode {
    decl.syntax()
        .children()
        .find(|n| n.kind() == PARAM_LIST)
        .unwrap_or_else(|| decl.syntax().clone())
}

fn arg_count(node: &SyntaxNode) -> usize {
    node.children()
        .find(|n| n.kind() == ARG_LIST)
        .map_or(0, |list| list.children().filter(|n| n.kind() == ARG).count())
}

/// Argument count when `node` is the callee of a call.
fn call_arity(node: &SyntaxNode) -> Option<u32> {
    let call = CallExpr::cast(node.parent()?)?;
    if call.callee().as_ref() != Some(node) {
        return None;
    }
    u32::try_from(arg_count(call.syntax())).ok()
}
