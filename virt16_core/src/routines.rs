pub mod routines {
    use crate::context::context::AssemblyContext;
    use crate::diagnostics::diagnostics::DiagnosticKind;
    use crate::preprocess::preprocess::SourceLine;

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Routine {
        /// without the leading `.` and trailing `:`
        pub name: String,
        pub body: Vec<SourceLine>,
        /// line of the header
        pub line: usize,
    }

    impl Routine {
        pub fn new(name: impl Into<String>, line: usize) -> Routine {
            Routine {
                name: name.into(),
                body: Vec::new(),
                line,
            }
        }

        pub fn instruction_count(&self) -> usize {
            self.body.len()
        }
    }

    /// A header is `.name:`, optionally followed by the routine's first
    /// instruction on the same line.
    pub fn parse_header(text: &str) -> Option<(&str, &str)> {
        let rest = text.strip_prefix('.')?;
        Some(match rest.split_once(':') {
            Some((name, inline)) => (name.trim(), inline.trim()),
            None => (rest.trim(), ""),
        })
    }

    /// Groups the expanded lines into routines, each running from its header
    /// to the next header or the end of input.
    pub fn collect_routines(lines: &[SourceLine], ctx: &mut AssemblyContext) {
        let mut current: Option<Routine> = None;

        for line in lines {
            if let Some((name, inline)) = parse_header(&line.text) {
                if let Some(done) = current.take() {
                    insert_routine(ctx, done);
                }
                if name.is_empty() {
                    ctx.diagnostics.report(line.number, DiagnosticKind::EmptyRoutineName);
                    continue;
                }
                let mut routine = Routine::new(name, line.number);
                if !inline.is_empty() {
                    routine.body.push(SourceLine::new(line.number, inline));
                }
                current = Some(routine);
                continue;
            }

            match current.as_mut() {
                Some(routine) => routine.body.push(line.clone()),
                None => ctx.diagnostics.report(
                    line.number,
                    DiagnosticKind::OrphanLine { text: line.text.clone() },
                ),
            }
        }

        if let Some(done) = current {
            insert_routine(ctx, done);
        }
        log::debug!("collected {} routine(s)", ctx.routines.len());
    }

    fn insert_routine(ctx: &mut AssemblyContext, routine: Routine) {
        match ctx.routines.iter_mut().find(|r| r.name == routine.name) {
            Some(existing) => {
                ctx.diagnostics.report(
                    routine.line,
                    DiagnosticKind::DuplicateRoutine { name: routine.name.clone() },
                );
                existing.body = routine.body;
                existing.line = routine.line;
            }
            None => ctx.routines.push(routine),
        }
    }
}
