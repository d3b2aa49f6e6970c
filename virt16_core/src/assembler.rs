pub mod assembler {
    use crate::allocator::allocator::allocate;
    use crate::context::context::AssemblyContext;
    use crate::defines::defines::{build_definition_table, expand_definitions};
    use crate::diagnostics::diagnostics::{AssembleError, Diagnostics};
    use crate::encoder::encoder::encode_program;
    use crate::image::image::Image;
    use crate::macros::macros::{build_macro_table, expand_macros};
    use crate::placement::placement::build_placement_table;
    use crate::preprocess::preprocess::preprocess;
    use crate::routines::routines::collect_routines;

    pub const DEFAULT_ENTRY: &str = "main";

    #[derive(Clone, Debug)]
    pub struct AssemblerOptions {
        /// Routine placed at address 0.
        pub entry: String,
        /// Reject placements that overlap code or each other.
        pub check_placements: bool,
    }

    impl Default for AssemblerOptions {
        fn default() -> AssemblerOptions {
            AssemblerOptions {
                entry: DEFAULT_ENTRY.to_string(),
                check_placements: true,
            }
        }
    }

    /// Output of a run that got past allocation. Words that failed to encode
    /// are present in inert form and described in the diagnostics.
    #[derive(Clone, Debug)]
    pub struct Assembly {
        pub program: Vec<u32>,
        pub image: Image,
        pub context: AssemblyContext,
    }

    impl Assembly {
        pub fn diagnostics(&self) -> &Diagnostics {
            &self.context.diagnostics
        }

        pub fn has_errors(&self) -> bool {
            self.context.diagnostics.has_errors()
        }
    }

    #[derive(Clone, Debug, Default)]
    pub struct Assembler {
        options: AssemblerOptions,
    }

    impl Assembler {
        pub fn new() -> Assembler {
            Assembler::default()
        }

        pub fn with_options(options: AssemblerOptions) -> Assembler {
            Assembler { options }
        }

        pub fn assemble(&self, source: &str) -> Result<Assembly, AssembleError> {
            let mut ctx = AssemblyContext::new();

            let lines = preprocess(source);
            let lines = build_macro_table(&lines, &mut ctx);
            let lines = build_definition_table(&lines, &mut ctx);
            let lines = build_placement_table(&lines, &mut ctx);
            let lines = expand_macros(&lines, &mut ctx);
            let lines = expand_definitions(&lines, &mut ctx);
            collect_routines(&lines, &mut ctx);

            allocate(&mut ctx, &self.options.entry)?;
            let program = encode_program(&mut ctx);
            let image = Image::build(
                &program,
                &ctx.placements,
                self.options.check_placements,
                &mut ctx.diagnostics,
            );

            log::info!(
                "assembled {} routine(s) into {} word(s) with {} diagnostic(s)",
                ctx.routines.len(),
                program.len(),
                ctx.diagnostics.len()
            );
            Ok(Assembly {
                program,
                image,
                context: ctx,
            })
        }
    }

    /// Assembles `source` with default options.
    pub fn assemble(source: &str) -> Result<Assembly, AssembleError> {
        Assembler::new().assemble(source)
    }
}
