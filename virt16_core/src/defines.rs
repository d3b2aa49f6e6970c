pub mod defines {
    use crate::context::context::AssemblyContext;
    use crate::diagnostics::diagnostics::DiagnosticKind;
    use crate::preprocess::preprocess::SourceLine;
    use crate::text::text::{is_directive, is_word_char, split_head};

    pub const DEFINE_DIRECTIVE: &str = "@define";

    /// Moves `@define name value` lines into the definition table. The value
    /// is kept as written and only interpreted where it is substituted.
    pub fn build_definition_table(
        lines: &[SourceLine],
        ctx: &mut AssemblyContext,
    ) -> Vec<SourceLine> {
        let mut out = Vec::with_capacity(lines.len());

        for line in lines {
            if !is_directive(&line.text, DEFINE_DIRECTIVE) {
                out.push(line.clone());
                continue;
            }

            let (_, rest) = split_head(&line.text);
            let tokens: Vec<&str> = rest.split_whitespace().collect();
            match tokens.as_slice() {
                [name, value] => {
                    let name = name.trim_end_matches(',');
                    if name.is_empty() {
                        ctx.diagnostics.report(
                            line.number,
                            DiagnosticKind::MalformedDefine { text: line.text.clone() },
                        );
                        continue;
                    }
                    log::debug!("define {name} = {value}");
                    ctx.definitions.insert(name.to_string(), value.to_string());
                }
                _ => ctx.diagnostics.report(
                    line.number,
                    DiagnosticKind::MalformedDefine { text: line.text.clone() },
                ),
            }
        }

        out
    }

    /// Replaces every `%name` with its bound value. Unbound names are
    /// reported and stay in the line.
    pub fn expand_definitions(lines: &[SourceLine], ctx: &mut AssemblyContext) -> Vec<SourceLine> {
        lines
            .iter()
            .map(|line| SourceLine::new(line.number, substitute(&line.text, line.number, ctx)))
            .collect()
    }

    fn substitute(text: &str, line: usize, ctx: &mut AssemblyContext) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let len = after.find(|c: char| !is_word_char(c)).unwrap_or(after.len());
            let name = &after[..len];

            match ctx.definitions.get(name) {
                Some(value) if !name.is_empty() => out.push_str(value),
                _ => {
                    if !name.is_empty() {
                        ctx.diagnostics.report(
                            line,
                            DiagnosticKind::UndefinedDefinition { name: name.to_string() },
                        );
                    }
                    out.push('%');
                    out.push_str(name);
                }
            }
            rest = &after[len..];
        }

        out.push_str(rest);
        out
    }
}
