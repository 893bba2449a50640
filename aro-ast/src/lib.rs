//! The input the execution core consumes.
//!
//! These types are produced by the (external) tokenizer, parser and
//! semantic analyzer; the execution core only ever reads them. They are
//! deliberately plain data — no behavior, no validation — mirroring how
//! the teacher project's `expr` module represents already-parsed `Expr`
//! trees for its compiler to walk.

mod condition;
mod span;

pub use condition::Condition;
pub use span::Span;

use arcstr::ArcStr;

/// `spec.md` §3: the role a statement's result plays in its feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Request,
    Own,
    Response,
    Export,
}

/// `spec.md` §3: the preposition introducing a statement's object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preposition {
    From,
    To,
    For,
    With,
    Against,
    Via,
    On,
    Into,
    At,
}

impl Preposition {
    pub const ALL: [Preposition; 9] = [
        Preposition::From,
        Preposition::To,
        Preposition::For,
        Preposition::With,
        Preposition::Against,
        Preposition::Via,
        Preposition::On,
        Preposition::Into,
        Preposition::At,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preposition::From => "from",
            Preposition::To => "to",
            Preposition::For => "for",
            Preposition::With => "with",
            Preposition::Against => "against",
            Preposition::Via => "via",
            Preposition::On => "on",
            Preposition::Into => "into",
            Preposition::At => "at",
        }
    }
}

impl std::fmt::Display for Preposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `<Result: specifier1, specifier2>`. `full_name` is `"base"` when there
/// are no specifiers, else `"base: spec1, spec2"`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultDescriptor {
    pub base: ArcStr,
    pub specifiers: Vec<ArcStr>,
    pub span: Span,
}

impl ResultDescriptor {
    pub fn new(base: impl Into<ArcStr>, specifiers: Vec<ArcStr>, span: Span) -> Self {
        ResultDescriptor { base: base.into(), specifiers, span }
    }

    pub fn full_name(&self) -> String {
        if self.specifiers.is_empty() {
            self.base.to_string()
        } else {
            format!("{}: {}", self.base, self.specifiers.join(", "))
        }
    }

    pub fn first_specifier(&self) -> Option<&str> {
        self.specifiers.first().map(|s| s.as_str())
    }
}

/// `<preposition the Object: spec1, spec2>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDescriptor {
    pub preposition: Preposition,
    pub base: ArcStr,
    pub specifiers: Vec<ArcStr>,
    pub span: Span,
}

impl ObjectDescriptor {
    pub fn new(
        preposition: Preposition,
        base: impl Into<ArcStr>,
        specifiers: Vec<ArcStr>,
        span: Span,
    ) -> Self {
        ObjectDescriptor { preposition, base: base.into(), specifiers, span }
    }

    /// `base.spec1.spec2`, used for nested access.
    pub fn key_path(&self) -> String {
        let mut path = self.base.to_string();
        for spec in &self.specifiers {
            path.push('.');
            path.push_str(spec);
        }
        path
    }

    pub fn is_external_reference(&self) -> bool {
        self.preposition == Preposition::From
    }
}

/// The atomic execution unit (`spec.md` §3).
#[derive(Debug, Clone, PartialEq)]
pub struct StatementDescriptor {
    pub verb: ArcStr,
    pub role: Role,
    pub result: ResultDescriptor,
    pub object: ObjectDescriptor,
    /// The statement's `when`-guard, evaluated against *context bindings*
    /// by [`FeatureSetExecutor::run_action`] (`spec.md` §4.3) to decide
    /// whether to dispatch the statement at all.
    pub condition: Option<Condition>,
    /// A repository `where`-clause, evaluated against *record fields* by
    /// `Retrieve`/`Delete` (`spec.md` §4.7) to select which records an
    /// operation applies to. Distinct from `condition` on purpose: a guard
    /// names a context variable, a filter names a field inside the records
    /// a repository statement reads or removes — the same statement can
    /// carry both (`Retrieve the <x> from the <repo> where status=placed`
    /// guarded by an outer `when`), and conflating them made every
    /// filtered repository statement silently skip whenever the filtered
    /// field name wasn't also bound as a context variable.
    pub filter: Option<Condition>,
    pub span: Span,
    /// The statement's original source text, preserved verbatim for the
    /// `Statement:` line of the human error template (`spec.md` §6).
    pub source_text: ArcStr,
}

/// One iteration-body binding of a `for-each` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ForEachBlock {
    pub binding: ArcStr,
    pub source: ObjectDescriptor,
    pub body: Vec<Statement>,
    pub span: Span,
}

/// One `when`-guarded arm of a `match` block; at most one arm's body runs.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub guard: Condition,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchBlock {
    pub arms: Vec<MatchArm>,
    pub span: Span,
}

/// A single entry in a feature set's statement sequence. `spec.md` §4.3
/// describes two looping forms over the same abstract machine; both are
/// modeled here as statement variants rather than a separate AST.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Action(StatementDescriptor),
    ForEach(ForEachBlock),
    Match(MatchBlock),
}

/// Event-handler subscription metadata parsed from a feature set's
/// business-activity string (`TypeName Handler<guard1;guard2;...>`),
/// `spec.md` §4.4.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerMetadata {
    pub event_type: ArcStr,
    pub guard_source: ArcStr,
}

/// An opaque, analyzer-produced feature set (`spec.md` §3).
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedFeatureSet {
    pub name: ArcStr,
    pub business_activity: ArcStr,
    pub statements: Vec<Statement>,
    pub handler: Option<HandlerMetadata>,
    pub imports: Vec<ArcStr>,
    pub exports: Vec<ArcStr>,
}

impl AnalyzedFeatureSet {
    pub fn new(name: impl Into<ArcStr>, business_activity: impl Into<ArcStr>) -> Self {
        AnalyzedFeatureSet {
            name: name.into(),
            business_activity: business_activity.into(),
            statements: Vec::new(),
            handler: None,
            imports: Vec::new(),
            exports: Vec::new(),
        }
    }

    /// Case-insensitive prefix test against the special feature-set names
    /// in `spec.md` §6.
    pub fn name_starts_with(&self, prefix: &str) -> bool {
        self.name.to_ascii_lowercase().starts_with(&prefix.to_ascii_lowercase())
    }

    pub fn is_application_start(&self) -> bool {
        self.name_starts_with("application-start")
    }

    pub fn is_application_end_success(&self) -> bool {
        self.name_starts_with("application-end: success")
    }

    pub fn is_application_end_error(&self) -> bool {
        self.name_starts_with("application-end: error")
    }
}
