pub mod preprocess {
    /// One surviving source line. `number` is the 1-based line in the
    /// original text and follows the line through every later stage.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct SourceLine {
        pub number: usize,
        pub text: String,
    }

    impl SourceLine {
        pub fn new(number: usize, text: impl Into<String>) -> SourceLine {
            SourceLine {
                number,
                text: text.into(),
            }
        }
    }

    pub fn preprocess(source: &str) -> Vec<SourceLine> {
        let lines: Vec<SourceLine> = source
            .lines()
            .enumerate()
            .filter_map(|(idx, raw)| {
                let text = strip_comment(raw).trim();
                (!text.is_empty()).then(|| SourceLine::new(idx + 1, text))
            })
            .collect();
        log::debug!("preprocess: {} line(s) kept", lines.len());
        lines
    }

    /// Cuts the line at the first `;` that is neither escaped with a
    /// backslash nor inside a double-quoted string.
    pub fn strip_comment(line: &str) -> &str {
        let mut in_string = false;
        let mut escaped = false;

        for (idx, ch) in line.char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' => escaped = true,
                '"' => in_string = !in_string,
                ';' if !in_string => return &line[..idx],
                _ => {}
            }
        }
        line
    }
}
