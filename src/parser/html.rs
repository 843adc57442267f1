use ego_tree::NodeId;
use scraper::{ElementRef, Html};

use super::query::DocumentQuery;

/// A parsed page. Owns the tree; hand out [`HtmlNode`]s with [`HtmlDocument::root`].
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(source: &str) -> Self {
        HtmlDocument {
            html: Html::parse_document(source),
        }
    }

    pub fn root(&self) -> HtmlNode<'_> {
        HtmlNode(self.html.root_element())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HtmlNode<'a>(ElementRef<'a>);

impl<'a> DocumentQuery for HtmlNode<'a> {
    type Id = NodeId;

    fn id(&self) -> NodeId {
        self.0.id()
    }

    fn tag(&self) -> &str {
        self.0.value().name()
    }

    fn children(&self) -> Vec<Self> {
        self.0.children().filter_map(ElementRef::wrap).map(HtmlNode).collect()
    }

    fn following_siblings(&self) -> Vec<Self> {
        self.0
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .map(HtmlNode)
            .collect()
    }

    fn descendants(&self) -> Vec<Self> {
        self.0
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .map(HtmlNode)
            .collect()
    }

    fn own_text(&self) -> Vec<String> {
        self.0
            .children()
            .filter_map(|n| n.value().as_text())
            .map(|t| (**t).to_string())
            .collect()
    }

    fn descendant_text(&self) -> Vec<String> {
        self.0.text().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::query::{Selector, TextScope};

    const PAGE: &str = r#"<html><body>
        <p>primeiro</p>
        <p>Processo <b>nº</b> 123</p>
        <p>  </p>
        <p>(seguinte)</p>
        <table><tr><td>a1</td><td>a2</td></tr><tr><td>b1</td><td>b2 <i>x</i></td></tr></table>
        <table><tr><td>c1</td></tr></table>
        <table><tr><td>d1</td></tr></table>
    </body></html>"#;

    #[test]
    fn query_one_missing_is_empty() {
        let doc = HtmlDocument::parse(PAGE);
        assert_eq!(doc.root().query_one(&Selector::descendants("article")), "");
        assert!(doc.root().query_all(&Selector::descendants("article")).is_empty());
    }

    #[test]
    fn query_all_trims_and_drops_blank_fragments() {
        let doc = HtmlDocument::parse(PAGE);
        let texts = doc.root().query_all(&Selector::descendants("p"));
        assert_eq!(texts, vec!["primeiro", "Processo nº 123", "(seguinte)"]);
    }

    #[test]
    fn case_insensitive_predicate() {
        let doc = HtmlDocument::parse(PAGE);
        let sel = Selector::descendants("p")
            .containing_ignore_case(TextScope::Full, "PROCESSO")
            .own_text();
        assert_eq!(doc.root().query_all(&sel), vec!["Processo", "123"]);
        assert_eq!(doc.root().query_joined(&sel), "Processo 123");

        let strict = Selector::descendants("p").containing(TextScope::Full, "PROCESSO");
        assert!(doc.root().select(&strict).is_empty());
    }

    #[test]
    fn following_sibling_position() {
        let doc = HtmlDocument::parse(PAGE);
        let sel = Selector::descendants("p")
            .containing(TextScope::Full, "Processo")
            .then_following_sibling("p")
            .at(1);
        assert_eq!(doc.root().query_one(&sel), "");
        let second = Selector::descendants("p")
            .containing(TextScope::Full, "Processo")
            .then_following_sibling("p")
            .at(2);
        assert_eq!(doc.root().query_one(&second), "(seguinte)");
    }

    #[test]
    fn global_nth_over_result_set() {
        let doc = HtmlDocument::parse(PAGE);
        let third = Selector::descendants("table").nth(3);
        assert_eq!(doc.root().query_one(&third), "d1");
        assert!(doc.root().select(&Selector::descendants("table").nth(4)).is_empty());
        assert!(doc.root().select(&Selector::descendants("table").nth(0)).is_empty());
    }

    #[test]
    fn nested_matches_are_reported_once() {
        let doc = HtmlDocument::parse(
            "<div><div><div><span>a</span></div></div></div><div><span>b</span></div>",
        );
        let spans = doc.root().select(&Selector::descendants("div").then_descendant("span"));
        assert_eq!(spans.len(), 2);
        assert_eq!(doc.root().query_all(&Selector::descendants("div").then_descendant("span")), vec!["a", "b"]);
    }

    #[test]
    fn positional_rows_and_cells() {
        let doc = HtmlDocument::parse(PAGE);
        let first = doc.root().select(&Selector::descendants("table").nth(1));
        let cell = Selector::descendants("tr")
            .at(2)
            .then_child("td")
            .at(2)
            .descendant_text();
        assert_eq!(first[0].query_all(&cell), vec!["b2", "x"]);
        assert_eq!(first[0].query_joined(&cell), "b2 x");
    }
}
