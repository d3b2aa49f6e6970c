pub mod context {
    use std::collections::HashMap;

    use crate::allocator::allocator::AllocationTable;
    use crate::diagnostics::diagnostics::Diagnostics;
    use crate::macros::macros::Macro;
    use crate::placement::placement::Placement;
    use crate::routines::routines::Routine;

    /// All tables of a single assembly. Every stage takes this explicitly so
    /// separate assemblies never see each other's macros or routines.
    #[derive(Clone, Debug, Default)]
    pub struct AssemblyContext {
        pub macros: HashMap<String, Macro>,
        pub definitions: HashMap<String, String>,
        /// source order; a repeated address replaces the earlier entry.
        pub placements: Vec<Placement>,
        /// insertion order, which the allocator preserves.
        pub routines: Vec<Routine>,
        pub allocation: AllocationTable,
        pub diagnostics: Diagnostics,
    }

    impl AssemblyContext {
        pub fn new() -> AssemblyContext {
            AssemblyContext::default()
        }

        pub fn routine(&self, name: &str) -> Option<&Routine> {
            self.routines.iter().find(|routine| routine.name == name)
        }

        pub fn placement_at(&self, address: u16) -> Option<&Placement> {
            self.placements.iter().find(|place| place.address == address)
        }
    }
}
