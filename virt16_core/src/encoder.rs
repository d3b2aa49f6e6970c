pub mod encoder {
    use std::fmt;

    use crate::allocator::allocator::AllocationTable;
    use crate::context::context::AssemblyContext;
    use crate::diagnostics::diagnostics::{DiagnosticKind, Diagnostics};
    use crate::isa::isa::*;
    use crate::text::text::{split_head, split_operands};

    // field extraction mirrors the shifts used when packing a word.
    macro_rules! extract_opcode {
        ($word:expr) => {
            (($word >> OPCODE_SHIFT) & FIELD_MASK) as u8
        };
    }

    macro_rules! extract_register {
        ($word:expr, $shift:expr) => {
            (($word >> $shift) & FIELD_MASK) as u8
        };
    }

    macro_rules! extract_immediate {
        ($word:expr) => {
            ($word & IMMEDIATE_MASK) as u16
        };
    }

    /// A fully resolved instruction, one per 32-bit word.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum Instruction {
        /// `LOAD X, #imm`
        LoadImmediate { dest: Register, value: u16 },
        /// LOAD, STORE, MOV, NOT and CMP with two registers.
        Pair { opcode: Opcode, first: Register, second: Register },
        Triple { opcode: Opcode, dest: Register, lhs: Register, rhs: Register },
        Single { opcode: Opcode, reg: Register },
        /// Control transfer to a routine's doubled base address.
        Transfer { opcode: Opcode, target: u16 },
        Bare(Opcode),
    }

    impl Instruction {
        pub fn opcode(&self) -> Opcode {
            match *self {
                Instruction::LoadImmediate { .. } => Opcode::Load,
                Instruction::Pair { opcode, .. }
                | Instruction::Triple { opcode, .. }
                | Instruction::Single { opcode, .. }
                | Instruction::Transfer { opcode, .. } => opcode,
                Instruction::Bare(opcode) => opcode,
            }
        }

        pub fn encode(&self) -> u32 {
            let reg = |r: Register, shift: u32| (r.id() as u32) << shift;
            let word = self.opcode().bare_word();
            match *self {
                Instruction::LoadImmediate { dest, value } => {
                    word | reg(dest, FIRST_REGISTER_SHIFT) | value as u32
                }
                Instruction::Pair { first, second, .. } => {
                    word | reg(first, FIRST_REGISTER_SHIFT) | reg(second, SECOND_REGISTER_SHIFT)
                }
                Instruction::Triple { dest, lhs, rhs, .. } => {
                    word | reg(dest, FIRST_REGISTER_SHIFT)
                        | reg(lhs, SECOND_REGISTER_SHIFT)
                        | reg(rhs, THIRD_REGISTER_SHIFT)
                }
                Instruction::Single { reg: r, .. } => word | reg(r, FIRST_REGISTER_SHIFT),
                Instruction::Transfer { target, .. } => word | target as u32,
                Instruction::Bare(_) => word,
            }
        }

        /// Recovers an instruction from its word. `LOAD X, R0` and
        /// `LOAD X, #0` share a bit pattern and decode as the immediate form.
        pub fn decode(word: u32) -> Option<Instruction> {
            let opcode = Opcode::from_bits(extract_opcode!(word))?;
            let register = |shift: u32| Register::from_id(extract_register!(word, shift));

            Some(match opcode.shape() {
                OperandShape::Pair if opcode == Opcode::Load => {
                    let source = extract_register!(word, SECOND_REGISTER_SHIFT);
                    let value = extract_immediate!(word);
                    if value == 0 && source != 0 {
                        Instruction::Pair {
                            opcode,
                            first: register(FIRST_REGISTER_SHIFT)?,
                            second: register(SECOND_REGISTER_SHIFT)?,
                        }
                    } else {
                        Instruction::LoadImmediate {
                            dest: register(FIRST_REGISTER_SHIFT)?,
                            value,
                        }
                    }
                }
                OperandShape::Pair => Instruction::Pair {
                    opcode,
                    first: register(FIRST_REGISTER_SHIFT)?,
                    second: register(SECOND_REGISTER_SHIFT)?,
                },
                OperandShape::Triple => Instruction::Triple {
                    opcode,
                    dest: register(FIRST_REGISTER_SHIFT)?,
                    lhs: register(SECOND_REGISTER_SHIFT)?,
                    rhs: register(THIRD_REGISTER_SHIFT)?,
                },
                OperandShape::Single => Instruction::Single {
                    opcode,
                    reg: register(FIRST_REGISTER_SHIFT)?,
                },
                OperandShape::Transfer => Instruction::Transfer {
                    opcode,
                    target: extract_immediate!(word),
                },
                OperandShape::None => Instruction::Bare(opcode),
            })
        }
    }

    impl fmt::Display for Instruction {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match *self {
                Instruction::LoadImmediate { dest, value } => write!(f, "LOAD {dest}, #{value:#06x}"),
                Instruction::Pair { opcode, first, second } => write!(f, "{opcode} {first}, {second}"),
                Instruction::Triple { opcode, dest, lhs, rhs } => {
                    write!(f, "{opcode} {dest}, {lhs}, {rhs}")
                }
                Instruction::Single { opcode, reg } => write!(f, "{opcode} {reg}"),
                Instruction::Transfer { opcode, target } => write!(f, "{opcode} {target:#06x}"),
                Instruction::Bare(opcode) => write!(f, "{opcode}"),
            }
        }
    }

    /// Why a line could not be encoded. `opcode` is kept when the mnemonic
    /// was recognised so the slot still carries it.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Rejected {
        pub opcode: Option<Opcode>,
        pub kind: DiagnosticKind,
    }

    impl Rejected {
        /// Opcode-only word, or 0 for an unknown mnemonic.
        pub fn fallback_word(&self) -> u32 {
            self.opcode.map(Opcode::bare_word).unwrap_or(0)
        }
    }

    /// Parses one expanded instruction line against the allocation table.
    pub fn parse_instruction(text: &str, allocation: &AllocationTable) -> Result<Instruction, Rejected> {
        let (mnemonic, rest) = split_head(text);
        let Some(opcode) = Opcode::from_mnemonic(mnemonic) else {
            return Err(Rejected {
                opcode: None,
                kind: DiagnosticKind::UnknownMnemonic { mnemonic: mnemonic.to_string() },
            });
        };
        let reject = |kind: DiagnosticKind| Rejected { opcode: Some(opcode), kind };

        let operands = split_operands(rest);
        if operands.len() != opcode.arity() {
            return Err(reject(DiagnosticKind::OperandCount {
                mnemonic: opcode.mnemonic(),
                expected: opcode.arity(),
                found: operands.len(),
            }));
        }

        let register = |operand: &str| {
            Register::parse(operand).ok_or_else(|| {
                reject(DiagnosticKind::UnknownRegister {
                    mnemonic: opcode.mnemonic(),
                    operand: operand.to_string(),
                })
            })
        };

        match opcode.shape() {
            OperandShape::Pair => {
                let first = register(operands[0])?;
                match operands[1].strip_prefix('#') {
                    Some(literal) if opcode == Opcode::Load => {
                        let value = parse_immediate(opcode, literal).map_err(reject)?;
                        Ok(Instruction::LoadImmediate { dest: first, value })
                    }
                    _ => Ok(Instruction::Pair {
                        opcode,
                        first,
                        second: register(operands[1])?,
                    }),
                }
            }
            OperandShape::Triple => Ok(Instruction::Triple {
                opcode,
                dest: register(operands[0])?,
                lhs: register(operands[1])?,
                rhs: register(operands[2])?,
            }),
            OperandShape::Single => Ok(Instruction::Single {
                opcode,
                reg: register(operands[0])?,
            }),
            OperandShape::Transfer => {
                let name = operands[0].strip_prefix('.').unwrap_or(operands[0]);
                let address = allocation.address_of(name).ok_or_else(|| {
                    reject(DiagnosticKind::UnknownRoutine {
                        mnemonic: opcode.mnemonic(),
                        operand: operands[0].to_string(),
                    })
                })?;
                let target = u16::try_from(address).map_err(|_| {
                    reject(DiagnosticKind::AddressOutOfRange {
                        mnemonic: opcode.mnemonic(),
                        routine: name.to_string(),
                        address,
                    })
                })?;
                Ok(Instruction::Transfer { opcode, target })
            }
            OperandShape::None => Ok(Instruction::Bare(opcode)),
        }
    }

    fn parse_immediate(opcode: Opcode, literal: &str) -> Result<u16, DiagnosticKind> {
        let value = parse_number(literal).ok_or_else(|| DiagnosticKind::InvalidImmediate {
            mnemonic: opcode.mnemonic(),
            operand: format!("#{literal}"),
        })?;
        u16::try_from(value).map_err(|_| DiagnosticKind::ImmediateOutOfRange {
            mnemonic: opcode.mnemonic(),
            value,
        })
    }

    /// Encodes one line. Failures are reported and yield the opcode with
    /// zero operand bits so later slots keep their addresses.
    pub fn encode_line(
        text: &str,
        line: usize,
        allocation: &AllocationTable,
        diagnostics: &mut Diagnostics,
    ) -> u32 {
        match parse_instruction(text, allocation) {
            Ok(instruction) => instruction.encode(),
            Err(rejected) => {
                let word = rejected.fallback_word();
                diagnostics.report(line, rejected.kind);
                word
            }
        }
    }

    /// Encodes every routine in allocation order.
    pub fn encode_program(ctx: &mut AssemblyContext) -> Vec<u32> {
        let AssemblyContext {
            routines,
            allocation,
            diagnostics,
            ..
        } = ctx;

        let mut program = Vec::with_capacity(allocation.total_slots() as usize);
        for entry in allocation.iter() {
            let Some(routine) = routines.iter().find(|r| r.name == entry.name) else {
                continue;
            };
            for line in &routine.body {
                program.push(encode_line(&line.text, line.number, allocation, diagnostics));
            }
        }

        log::debug!("encoded {} instruction word(s)", program.len());
        program
    }
}
