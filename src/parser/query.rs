//! Read-only tree queries over an HTML document.
//!
//! A [`Selector`] is a small path expression: a chain of [`Step`]s (axis, tag,
//! text predicates, optional position), an optional position over the whole
//! result set, and a choice of which text to read from the matched elements.
//! Backends only implement the navigation primitives of [`DocumentQuery`];
//! selection and text reading are provided on top of them, so the field
//! extractors never see the parser's own types.

use std::collections::HashSet;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    FollowingSibling,
}

/// Which text of a node a predicate looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextScope {
    /// Direct text children only.
    Own,
    /// Every text node below the element, concatenated.
    Full,
}

/// Which fragments a selector yields for each matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    /// One fragment per direct text child.
    Own,
    /// One fragment per descendant text node.
    Descendants,
    /// One fragment per element: its full concatenated text.
    Value,
}

#[derive(Debug, Clone)]
pub struct Predicate {
    scope: TextScope,
    needle: String,
    ignore_case: bool,
}

impl Predicate {
    pub fn matches<Q: DocumentQuery>(&self, node: &Q) -> bool {
        let haystack = match self.scope {
            TextScope::Own => node.own_text().concat(),
            TextScope::Full => node.string_value(),
        };
        if self.ignore_case {
            // Uppercase both sides; there is no case-folding contains on &str.
            haystack.to_uppercase().contains(&self.needle.to_uppercase())
        } else {
            haystack.contains(&self.needle)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Step {
    axis: Axis,
    tag: String,
    predicates: Vec<Predicate>,
    /// 1-based, counted among the candidates sharing one context node.
    position: Option<usize>,
}

impl Step {
    fn new(axis: Axis, tag: &str) -> Self {
        Step {
            axis,
            tag: tag.to_ascii_lowercase(),
            predicates: Vec::new(),
            position: None,
        }
    }

    fn accepts<Q: DocumentQuery>(&self, node: &Q) -> bool {
        node.tag().eq_ignore_ascii_case(&self.tag) && self.predicates.iter().all(|p| p.matches(node))
    }

    fn pick<Q: DocumentQuery>(&self, candidates: Vec<Q>) -> Vec<Q> {
        let mut matched = candidates.into_iter().filter(|n| self.accepts(n));
        match self.position {
            Some(k) => k
                .checked_sub(1)
                .and_then(|i| matched.nth(i))
                .into_iter()
                .collect(),
            None => matched.collect(),
        }
    }

    fn apply<Q: DocumentQuery>(&self, node: &Q) -> Vec<Q> {
        match self.axis {
            Axis::Child => self.pick(node.children()),
            Axis::FollowingSibling => self.pick(node.following_siblings()),
            Axis::Descendant if self.position.is_none() => self.pick(node.descendants()),
            // `.//tr[2]`: the position applies per parent, not over all descendants.
            Axis::Descendant => std::iter::once(node.clone())
                .chain(node.descendants())
                .flat_map(|parent| self.pick(parent.children()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Selector {
    steps: Vec<Step>,
    nth: Option<usize>,
    text: TextMode,
}

impl Selector {
    /// Start with every `tag` element below the context node.
    pub fn descendants(tag: &str) -> Self {
        Selector {
            steps: vec![Step::new(Axis::Descendant, tag)],
            nth: None,
            text: TextMode::Value,
        }
    }

    /// Start with the `tag` children of the context node.
    pub fn children(tag: &str) -> Self {
        Selector {
            steps: vec![Step::new(Axis::Child, tag)],
            nth: None,
            text: TextMode::Value,
        }
    }

    pub fn then_child(mut self, tag: &str) -> Self {
        self.steps.push(Step::new(Axis::Child, tag));
        self
    }

    pub fn then_descendant(mut self, tag: &str) -> Self {
        self.steps.push(Step::new(Axis::Descendant, tag));
        self
    }

    pub fn then_following_sibling(mut self, tag: &str) -> Self {
        self.steps.push(Step::new(Axis::FollowingSibling, tag));
        self
    }

    /// Keep elements of the last step whose text contains `needle`.
    pub fn containing(self, scope: TextScope, needle: &str) -> Self {
        self.with_predicate(scope, needle, false)
    }

    /// Case-insensitive [`Selector::containing`].
    pub fn containing_ignore_case(self, scope: TextScope, needle: &str) -> Self {
        self.with_predicate(scope, needle, true)
    }

    /// 1-based position for the last step, counted per context node.
    pub fn at(mut self, position: usize) -> Self {
        if let Some(step) = self.steps.last_mut() {
            step.position = Some(position);
        }
        self
    }

    /// 1-based position over the whole result set, like `(//table)[3]`.
    pub fn nth(mut self, position: usize) -> Self {
        self.nth = Some(position);
        self
    }

    pub fn own_text(mut self) -> Self {
        self.text = TextMode::Own;
        self
    }

    pub fn descendant_text(mut self) -> Self {
        self.text = TextMode::Descendants;
        self
    }

    fn with_predicate(mut self, scope: TextScope, needle: &str, ignore_case: bool) -> Self {
        if let Some(step) = self.steps.last_mut() {
            step.predicates.push(Predicate {
                scope,
                needle: needle.to_string(),
                ignore_case,
            });
        }
        self
    }
}

/// A queryable element: the document root or any sub-tree of it.
pub trait DocumentQuery: Clone + PartialEq {
    /// Identity of the underlying node; two handles to one element share it.
    type Id: Eq + Hash;

    fn id(&self) -> Self::Id;
    fn tag(&self) -> &str;
    fn children(&self) -> Vec<Self>;
    fn following_siblings(&self) -> Vec<Self>;
    /// Every element below this one, in document order, excluding itself.
    fn descendants(&self) -> Vec<Self>;
    fn own_text(&self) -> Vec<String>;
    fn descendant_text(&self) -> Vec<String>;

    fn string_value(&self) -> String {
        self.descendant_text().concat()
    }

    /// Elements matched by `selector`, in document order, without duplicates.
    fn select(&self, selector: &Selector) -> Vec<Self> {
        let mut context = vec![self.clone()];
        for step in &selector.steps {
            let mut next: Vec<Self> = Vec::new();
            let mut seen = HashSet::new();
            for node in &context {
                for found in step.apply(node) {
                    if seen.insert(found.id()) {
                        next.push(found);
                    }
                }
            }
            context = next;
        }
        match selector.nth {
            Some(k) => k
                .checked_sub(1)
                .and_then(|i| context.into_iter().nth(i))
                .into_iter()
                .collect(),
            None => context,
        }
    }

    /// Every matching text fragment, trimmed, empty ones dropped.
    fn query_all(&self, selector: &Selector) -> Vec<String> {
        self.select(selector)
            .iter()
            .flat_map(|node| match selector.text {
                TextMode::Own => node.own_text(),
                TextMode::Descendants => node.descendant_text(),
                TextMode::Value => vec![node.string_value()],
            })
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// First matching text fragment, or an empty string.
    fn query_one(&self, selector: &Selector) -> String {
        self.query_all(selector).into_iter().next().unwrap_or_default()
    }

    /// All matching fragments joined by a single space.
    fn query_joined(&self, selector: &Selector) -> String {
        self.query_all(selector).join(" ")
    }
}
