/// Unicode handling in answers and source metadata.
///
/// Ensures that:
/// - Multibyte text around markers is copied byte-exact
/// - Titles are truncated on character boundaries, never mid-codepoint
/// - Non-ASCII digits never count as a source number

#[cfg(test)]
mod unicode_edge_cases {
    use kic_ai::citation::{resolve, resolve_with, CitationView, ResolveOptions};
    use kic_core::domain::SourceDocument;
    use pretty_assertions::assert_eq;

    fn display_only(c: &CitationView<'_>) -> String {
        format!("«{}»", c.display)
    }

    #[test]
    fn emoji_and_cjk_text_survive_resolution() {
        let sources = vec![SourceDocument::new("u1", "Kurs 🤖")];
        let out = resolve_with(
            "🚀 Lernen [doc1] 学习 [doc2] ✅",
            &sources,
            &display_only,
            &ResolveOptions::default(),
        );
        assert_eq!(out, "🚀 Lernen «Kurs 🤖» 学习  ✅");
    }

    #[test]
    fn long_emoji_title_is_cut_on_char_boundary() {
        let title = "🔥".repeat(80);
        let sources = vec![SourceDocument::new("u1", title.clone())];
        let out = resolve_with("[doc1]", &sources, &display_only, &ResolveOptions::default());
        assert_eq!(out, format!("«{}...»", "🔥".repeat(50)));
    }

    #[test]
    fn arabic_and_hebrew_titles() {
        let sources = vec![
            SourceDocument::new("u1", "الذكاء الاصطناعي"),
            SourceDocument::new("u2", "בינה מלאכותית"),
        ];
        let out = resolve_with(
            "[doc2] و [doc1]",
            &sources,
            &display_only,
            &ResolveOptions::default(),
        );
        assert_eq!(out, "«בינה מלאכותית» و «الذكاء الاصطناعي»");
    }

    #[test]
    fn non_ascii_digits_are_invalid() {
        let sources = vec![SourceDocument::new("u1", "T")];
        // Fullwidth and Arabic-Indic "1".
        assert_eq!(resolve("a[doc１]b[doc١]c", &sources), "abc");
    }

    #[test]
    fn umlauts_in_marker_tokens_are_invalid() {
        let sources = vec![SourceDocument::new("u1", "T")];
        assert_eq!(resolve("Größe [docü] ok", &sources), "Größe  ok");
    }
}
