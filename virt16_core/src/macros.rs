pub mod macros {
    use crate::context::context::AssemblyContext;
    use crate::defines::defines::DEFINE_DIRECTIVE;
    use crate::diagnostics::diagnostics::DiagnosticKind;
    use crate::placement::placement::PLACE_DIRECTIVE;
    use crate::preprocess::preprocess::SourceLine;
    use crate::routines::routines::parse_header as parse_routine_header;
    use crate::text::text::{first_token, is_directive, replace_words, split_head, split_operands};

    pub const MACRO_DIRECTIVE: &str = "@macro";
    pub const END_MACRO_DIRECTIVE: &str = "@endmacro";

    const BODY_DIRECTIVES: [&str; 3] = [MACRO_DIRECTIVE, DEFINE_DIRECTIVE, PLACE_DIRECTIVE];

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Macro {
        pub name: String,
        pub params: Vec<String>,
        /// unexpanded body lines
        pub body: Vec<String>,
    }

    impl Macro {
        /// Instantiates the body with `args` bound positionally to the
        /// parameters. Callers check the argument count first.
        pub fn expand(&self, args: &[&str]) -> Vec<String> {
            self.body
                .iter()
                .map(|line| {
                    replace_words(line, |word| {
                        self.params
                            .iter()
                            .position(|param| param == word)
                            .and_then(|idx| args.get(idx).copied())
                    })
                })
                .collect()
        }
    }

    /// Pulls every `@macro ... @endmacro` block out of `lines` into the
    /// macro table and returns the lines that remain.
    pub fn build_macro_table(lines: &[SourceLine], ctx: &mut AssemblyContext) -> Vec<SourceLine> {
        let mut out = Vec::with_capacity(lines.len());
        let mut iter = lines.iter();

        while let Some(line) = iter.next() {
            if is_directive(&line.text, END_MACRO_DIRECTIVE) {
                ctx.diagnostics.report(line.number, DiagnosticKind::StrayEndMacro);
                continue;
            }
            if !is_directive(&line.text, MACRO_DIRECTIVE) {
                out.push(line.clone());
                continue;
            }

            let mut body = Vec::new();
            let mut terminated = false;
            for body_line in iter.by_ref() {
                if is_directive(&body_line.text, END_MACRO_DIRECTIVE) {
                    terminated = true;
                    break;
                }
                // table directives are collected before expansion and cannot
                // come out of a macro body
                let head = first_token(&body_line.text);
                if BODY_DIRECTIVES.contains(&head) {
                    ctx.diagnostics.report(
                        body_line.number,
                        DiagnosticKind::DirectiveInMacro { directive: head.to_string() },
                    );
                    continue;
                }
                body.push(body_line.text.clone());
            }

            let (name, params) = match parse_header(&line.text) {
                Ok(header) => header,
                Err(kind) => {
                    ctx.diagnostics.report(line.number, kind);
                    continue;
                }
            };

            if !terminated {
                ctx.diagnostics
                    .report(line.number, DiagnosticKind::UnterminatedMacro { name });
                continue;
            }

            log::debug!("macro '{name}' {params:?}: {} body line(s)", body.len());
            ctx.macros.insert(name.clone(), Macro { name, params, body });
        }

        out
    }

    fn parse_header(text: &str) -> Result<(String, Vec<String>), DiagnosticKind> {
        let (_, rest) = split_head(text);
        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '[')
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        if name.is_empty() {
            return Err(DiagnosticKind::MissingMacroName);
        }

        let list = rest[name_end..].trim();
        let list = list.strip_prefix('[').unwrap_or(list);
        let list = list.strip_suffix(']').unwrap_or(list);

        let mut params: Vec<String> = Vec::new();
        for param in split_operands(list) {
            if params.iter().any(|p| p == param) {
                return Err(DiagnosticKind::DuplicateMacroParam {
                    name: name.to_string(),
                    param: param.to_string(),
                });
            }
            params.push(param.to_string());
        }

        Ok((name.to_string(), params))
    }

    /// Replaces each `@name arg, ...` invocation with the macro body. An
    /// invocation may also follow a routine header on the same line.
    /// Single pass: invocations inside a body are left as written.
    pub fn expand_macros(lines: &[SourceLine], ctx: &mut AssemblyContext) -> Vec<SourceLine> {
        let mut out = Vec::with_capacity(lines.len());

        for line in lines {
            match parse_routine_header(&line.text) {
                Some((name, inline)) if inline.starts_with('@') => {
                    out.push(SourceLine::new(line.number, format!(".{name}:")));
                    expand_line(inline, line.number, ctx, &mut out);
                }
                _ => expand_line(&line.text, line.number, ctx, &mut out),
            }
        }

        log::debug!("macro expansion: {} line(s)", out.len());
        out
    }

    fn expand_line(text: &str, number: usize, ctx: &mut AssemblyContext, out: &mut Vec<SourceLine>) {
        let (head, rest) = split_head(text);
        let Some(name) = head.strip_prefix('@').filter(|name| !name.is_empty()) else {
            out.push(SourceLine::new(number, text));
            return;
        };

        let Some(found) = ctx.macros.get(name) else {
            ctx.diagnostics.report(number, DiagnosticKind::UndefinedMacro { name: name.to_string() });
            return;
        };

        let args = split_operands(rest);
        if args.len() != found.params.len() {
            ctx.diagnostics.report(
                number,
                DiagnosticKind::MacroArity {
                    name: name.to_string(),
                    expected: found.params.len(),
                    found: args.len(),
                },
            );
            return;
        }

        out.extend(
            found
                .expand(&args)
                .into_iter()
                .map(|text| SourceLine::new(number, text)),
        );
    }
}
