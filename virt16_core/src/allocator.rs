pub mod allocator {
    use crate::context::context::AssemblyContext;
    use crate::diagnostics::diagnostics::AssembleError;

    /// Each 32-bit instruction occupies two 16-bit words in the image.
    pub const WORDS_PER_INSTRUCTION: u32 = 2;

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Allocation {
        pub name: String,
        /// first instruction slot
        pub slot: u32,
        /// instruction count
        pub size: u32,
        /// base in 16-bit words: `slot * 2`. This is what jump and call
        /// words embed.
        pub address: u32,
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct AllocationTable {
        entries: Vec<Allocation>,
    }

    impl AllocationTable {
        pub fn address_of(&self, name: &str) -> Option<u32> {
            self.get(name).map(|entry| entry.address)
        }

        pub fn get(&self, name: &str) -> Option<&Allocation> {
            self.entries.iter().find(|entry| entry.name == name)
        }

        /// Entries in allocation order: the entry routine first, then the
        /// remaining routines in the order they were defined.
        pub fn iter(&self) -> impl Iterator<Item = &Allocation> {
            self.entries.iter()
        }

        pub fn total_slots(&self) -> u32 {
            self.entries.iter().map(|entry| entry.size).sum()
        }
    }

    /// Assigns every routine its base address. `entry` is forced to slot 0.
    pub fn allocate(ctx: &mut AssemblyContext, entry: &str) -> Result<(), AssembleError> {
        let entry_idx = ctx
            .routines
            .iter()
            .position(|routine| routine.name == entry)
            .ok_or_else(|| AssembleError::MissingEntry(entry.to_string()))?;

        // pass 1: sizes
        let sizes: Vec<u32> = ctx
            .routines
            .iter()
            .map(|routine| routine.instruction_count() as u32)
            .collect();

        // pass 2: slot bases, entry first and the rest in table order
        let order = std::iter::once(entry_idx)
            .chain((0..ctx.routines.len()).filter(|&idx| idx != entry_idx));
        let mut running_total = 0u32;
        let mut entries = Vec::with_capacity(sizes.len());
        for idx in order {
            entries.push(Allocation {
                name: ctx.routines[idx].name.clone(),
                slot: running_total,
                size: sizes[idx],
                address: 0,
            });
            running_total += sizes[idx];
        }

        for allocation in &mut entries {
            allocation.address = allocation.slot * WORDS_PER_INSTRUCTION;
            log::debug!(
                "allocate .{} at {:#06x} ({} instruction(s))",
                allocation.name,
                allocation.address,
                allocation.size
            );
        }

        ctx.allocation = AllocationTable { entries };
        Ok(())
    }
}
