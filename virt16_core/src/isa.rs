pub mod isa {
    use std::fmt;

    /// Word layout shared by the encoder and decoder. Bit 31 is the most
    /// significant bit of the 32-bit instruction word.
    pub const OPCODE_SHIFT: u32 = 27;
    pub const FIRST_REGISTER_SHIFT: u32 = 22;
    pub const SECOND_REGISTER_SHIFT: u32 = 17;
    pub const THIRD_REGISTER_SHIFT: u32 = 12;
    pub const FIELD_MASK: u32 = 0x1F;
    pub const IMMEDIATE_MASK: u32 = 0xFFFF;

    /// Operand layout an opcode expects.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum OperandShape {
        /// `X, Y`. LOAD also takes `X, #imm`.
        Pair,
        /// `X, Y, Z`
        Triple,
        /// `X`
        Single,
        /// routine name
        Transfer,
        None,
    }

    macro_rules! opcode_table {
        ($( $variant:ident => $mnemonic:literal, $bits:literal, $shape:ident; )*) => {
            #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
            pub enum Opcode {
                $($variant),*
            }

            impl Opcode {
                pub const ALL: &'static [Opcode] = &[$(Opcode::$variant),*];

                pub fn bits(self) -> u8 {
                    match self {
                        $(Opcode::$variant => $bits),*
                    }
                }

                pub fn mnemonic(self) -> &'static str {
                    match self {
                        $(Opcode::$variant => $mnemonic),*
                    }
                }

                pub fn shape(self) -> OperandShape {
                    match self {
                        $(Opcode::$variant => OperandShape::$shape),*
                    }
                }
            }
        };
    }

    // 0x01 (load from address) is not part of the instruction set.
    opcode_table! {
        Load => "LOAD", 0x00, Pair;
        Store => "STORE", 0x02, Pair;
        Mov => "MOV", 0x03, Pair;
        Inc => "INC", 0x04, Single;
        Dec => "DEC", 0x05, Single;
        Add => "ADD", 0x06, Triple;
        Sub => "SUB", 0x07, Triple;
        And => "AND", 0x08, Triple;
        Or => "OR", 0x09, Triple;
        Xor => "XOR", 0x0A, Triple;
        Not => "NOT", 0x0B, Pair;
        Shl => "SHL", 0x0C, Triple;
        Shr => "SHR", 0x0D, Triple;
        Cmp => "CMP", 0x0E, Pair;
        Jmp => "JMP", 0x0F, Transfer;
        Jz => "JZ", 0x10, Transfer;
        Je => "JE", 0x11, Transfer;
        Jne => "JNE", 0x12, Transfer;
        Jg => "JG", 0x13, Transfer;
        Jl => "JL", 0x14, Transfer;
        Call => "CALL", 0x15, Transfer;
        Ret => "RET", 0x16, None;
        Push => "PUSH", 0x17, Single;
        Pop => "POP", 0x18, Single;
        Hlt => "HLT", 0x19, None;
        Nop => "NOP", 0x1A, None;
    }

    impl Opcode {
        pub fn from_mnemonic(text: &str) -> Option<Opcode> {
            Opcode::ALL
                .iter()
                .copied()
                .find(|op| op.mnemonic().eq_ignore_ascii_case(text))
        }

        pub fn from_bits(bits: u8) -> Option<Opcode> {
            Opcode::ALL.iter().copied().find(|op| op.bits() == bits)
        }

        /// Number of operands the source form takes.
        pub fn arity(self) -> usize {
            match self.shape() {
                OperandShape::Pair => 2,
                OperandShape::Triple => 3,
                OperandShape::Single | OperandShape::Transfer => 1,
                OperandShape::None => 0,
            }
        }

        /// The instruction word with every operand field cleared.
        pub fn bare_word(self) -> u32 {
            (self.bits() as u32) << OPCODE_SHIFT
        }
    }

    impl fmt::Display for Opcode {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.mnemonic())
        }
    }

    // indexed by register id.
    const REGISTER_NAMES: [&str; 24] = [
        "R0", "R1", "R2", "R3", "R4", "R5", "R6", "R7",
        "R8", "R9", "R10", "R11", "R12", "R13", "R14", "R15",
        "SP", "DISP", "TIME", "A", "P1", "P2", "P3", "P4",
    ];

    /// A 5-bit register id: R0-R15 general purpose, 0x10-0x17 special.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct Register(u8);

    impl Register {
        pub const COUNT: u8 = REGISTER_NAMES.len() as u8;

        pub fn parse(name: &str) -> Option<Register> {
            REGISTER_NAMES
                .iter()
                .position(|reg| reg.eq_ignore_ascii_case(name))
                .map(|id| Register(id as u8))
        }

        pub fn from_id(id: u8) -> Option<Register> {
            (id < Self::COUNT).then_some(Register(id))
        }

        pub fn id(self) -> u8 {
            self.0
        }

        pub fn name(self) -> &'static str {
            REGISTER_NAMES[self.0 as usize]
        }
    }

    impl fmt::Display for Register {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.name())
        }
    }

    /// Parses a `0x` hex, `0b` binary or decimal literal.
    pub fn parse_number(text: &str) -> Option<u64> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            u64::from_str_radix(hex, 16).ok()
        } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
            u64::from_str_radix(bin, 2).ok()
        } else {
            text.parse::<u64>().ok()
        }
    }
}
