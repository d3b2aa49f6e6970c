pub mod text {
    /// Characters that make up a symbol, register, parameter or number.
    pub fn is_word_char(ch: char) -> bool {
        ch.is_ascii_alphanumeric() || ch == '_'
    }

    pub fn first_token(line: &str) -> &str {
        line.split_whitespace().next().unwrap_or("")
    }

    /// True when the first whitespace-separated token is exactly `directive`.
    pub fn is_directive(line: &str, directive: &str) -> bool {
        first_token(line) == directive
    }

    /// Splits the text after a directive or mnemonic into its first token
    /// and the remainder.
    pub fn split_head(line: &str) -> (&str, &str) {
        let line = line.trim_start();
        match line.find(char::is_whitespace) {
            Some(idx) => (&line[..idx], line[idx..].trim_start()),
            None => (line, ""),
        }
    }

    /// Operand and argument lists: tokens separated by commas and/or whitespace.
    pub fn split_operands(text: &str) -> Vec<&str> {
        text.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .collect()
    }

    /// Rewrites every whole word for which `lookup` yields a replacement.
    /// Partial matches never happen: `a` is not found inside `addr`.
    pub fn replace_words<'a, F>(line: &str, lookup: F) -> String
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let mut out = String::with_capacity(line.len());
        let mut word_start: Option<usize> = None;

        for (idx, ch) in line.char_indices() {
            match (is_word_char(ch), word_start) {
                (true, None) => word_start = Some(idx),
                (true, Some(_)) => {}
                (false, Some(start)) => {
                    push_word(&mut out, &line[start..idx], &lookup);
                    word_start = None;
                    out.push(ch);
                }
                (false, None) => out.push(ch),
            }
        }
        if let Some(start) = word_start {
            push_word(&mut out, &line[start..], &lookup);
        }
        out
    }

    fn push_word<'a, F>(out: &mut String, word: &str, lookup: &F)
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        match lookup(word) {
            Some(replacement) => out.push_str(replacement),
            None => out.push_str(word),
        }
    }
}
