use rand::Rng;

use virt16_core::allocator::allocator::AllocationTable;
use virt16_core::diagnostics::diagnostics::{DiagnosticKind, Diagnostics};
use virt16_core::encoder::encoder::{Instruction, encode_line};
use virt16_core::isa::isa::{Opcode, Register};

fn encode(text: &str) -> (u32, Vec<DiagnosticKind>) {
    let mut diagnostics = Diagnostics::new();
    let word = encode_line(text, 1, &AllocationTable::default(), &mut diagnostics);
    (word, diagnostics.kinds().cloned().collect())
}

fn encode_clean(text: &str) -> u32 {
    let (word, kinds) = encode(text);
    assert!(kinds.is_empty(), "{text}: {kinds:?}");
    word
}

fn field(word: u32, shift: u32) -> u8 {
    ((word >> shift) & 0x1F) as u8
}

fn reg(name: &str) -> Register {
    Register::parse(name).unwrap()
}

fn random_register(rng: &mut impl Rng) -> Register {
    Register::from_id(rng.random_range(0..Register::COUNT)).unwrap()
}

#[test]
fn opcode_table_matches_instruction_set() {
    let expected = [
        ("LOAD", 0x00), ("STORE", 0x02), ("MOV", 0x03), ("INC", 0x04),
        ("DEC", 0x05), ("ADD", 0x06), ("SUB", 0x07), ("AND", 0x08),
        ("OR", 0x09), ("XOR", 0x0A), ("NOT", 0x0B), ("SHL", 0x0C),
        ("SHR", 0x0D), ("CMP", 0x0E), ("JMP", 0x0F), ("JZ", 0x10),
        ("JE", 0x11), ("JNE", 0x12), ("JG", 0x13), ("JL", 0x14),
        ("CALL", 0x15), ("RET", 0x16), ("PUSH", 0x17), ("POP", 0x18),
        ("HLT", 0x19), ("NOP", 0x1A),
    ];
    assert_eq!(Opcode::ALL.len(), expected.len());
    for (mnemonic, bits) in expected {
        let opcode = Opcode::from_mnemonic(mnemonic).unwrap();
        assert_eq!(opcode.bits(), bits, "{mnemonic}");
        assert_eq!(Opcode::from_bits(bits), Some(opcode));
    }
    assert_eq!(Opcode::from_bits(0x01), None);
    assert_eq!(Opcode::from_bits(0x1F), None);
}

#[test]
fn register_table_covers_general_and_special_registers() {
    assert_eq!(reg("R0").id(), 0x00);
    assert_eq!(reg("R15").id(), 0x0F);
    assert_eq!(reg("SP").id(), 0x10);
    assert_eq!(reg("DISP").id(), 0x11);
    assert_eq!(reg("TIME").id(), 0x12);
    assert_eq!(reg("A").id(), 0x13);
    assert_eq!(reg("P1").id(), 0x14);
    assert_eq!(reg("P4").id(), 0x17);
    assert_eq!(Register::parse("R16"), None);
    assert_eq!(Register::from_id(0x18), None);
}

#[test]
fn mov_places_registers_at_documented_offsets() {
    let word = encode_clean("MOV R1, R2");
    assert_eq!(word >> 27, 0x03);
    assert_eq!(field(word, 22), 1);
    assert_eq!(field(word, 17), 2);
    assert_eq!(word & 0x1FFFF, 0);
    assert_eq!(word, (0x03 << 27) | (1 << 22) | (2 << 17));
}

#[test]
fn three_register_form_uses_third_field() {
    let word = encode_clean("SUB R3, SP, P4");
    assert_eq!(word, (0x07 << 27) | (0x03 << 22) | (0x10 << 17) | (0x17 << 12));
}

#[test]
fn operands_without_spaces_and_lowercase_encode_the_same() {
    assert_eq!(encode_clean("ADD R1,R2,R3"), encode_clean("ADD R1, R2, R3"));
    assert_eq!(encode_clean("mov r1, disp"), encode_clean("MOV R1, DISP"));
}

#[test]
fn random_register_pairs_round_trip() {
    let mut rng = rand::rng();
    let ops = ["STORE", "MOV", "NOT", "CMP"];
    for _ in 0..500 {
        let op = ops[rng.random_range(0..ops.len())];
        let first = random_register(&mut rng);
        let second = random_register(&mut rng);
        let text = format!("{op} {first}, {second}");

        let decoded = Instruction::decode(encode_clean(&text)).unwrap();
        assert_eq!(
            decoded,
            Instruction::Pair { opcode: Opcode::from_mnemonic(op).unwrap(), first, second }
        );
        assert_eq!(decoded.to_string(), text);
    }
}

#[test]
fn random_register_triples_round_trip() {
    let mut rng = rand::rng();
    let ops = ["ADD", "SUB", "AND", "OR", "XOR", "SHL", "SHR"];
    for _ in 0..500 {
        let op = ops[rng.random_range(0..ops.len())];
        let (dest, lhs, rhs) = (
            random_register(&mut rng),
            random_register(&mut rng),
            random_register(&mut rng),
        );
        let text = format!("{op} {dest}, {lhs}, {rhs}");

        let decoded = Instruction::decode(encode_clean(&text)).unwrap();
        assert_eq!(decoded.to_string(), text);
    }
}

#[test]
fn single_register_forms_round_trip() {
    for op in ["INC", "DEC", "PUSH", "POP"] {
        let word = encode_clean(&format!("{op} TIME"));
        assert_eq!(field(word, 22), 0x12);
        assert_eq!(word & 0x3F_FFFF, 0);
        assert_eq!(Instruction::decode(word).unwrap().to_string(), format!("{op} TIME"));
    }
}

#[test]
fn load_register_form_round_trips_with_nonzero_source() {
    let word = encode_clean("LOAD R4, R9");
    assert_eq!(
        Instruction::decode(word),
        Some(Instruction::Pair { opcode: Opcode::Load, first: reg("R4"), second: reg("R9") })
    );
}

#[test]
fn load_from_r0_shares_the_immediate_zero_pattern() {
    assert_eq!(encode_clean("LOAD R2, R0"), encode_clean("LOAD R2, #0"));
    assert_eq!(
        Instruction::decode(encode_clean("LOAD R2, R0")),
        Some(Instruction::LoadImmediate { dest: reg("R2"), value: 0 })
    );
}

#[test]
fn load_immediate_round_trips_at_bounds() {
    let cases = [("#0", 0), ("#1", 1), ("#0xFFFF", 0xFFFF), ("#65535", 0xFFFF), ("#0b1010", 10)];
    for (literal, value) in cases {
        let word = encode_clean(&format!("LOAD R3, {literal}"));
        assert_eq!(word & 0xFFFF, value);
        assert_eq!(field(word, 22), 3);
        assert_eq!(
            Instruction::decode(word),
            Some(Instruction::LoadImmediate { dest: reg("R3"), value: value as u16 })
        );
    }
}

#[test]
fn random_immediates_round_trip() {
    let mut rng = rand::rng();
    for _ in 0..500 {
        let dest = random_register(&mut rng);
        let value: u16 = rng.random();
        let word = encode_clean(&format!("LOAD {dest}, #{value:#x}"));
        assert_eq!(
            Instruction::decode(word),
            Some(Instruction::LoadImmediate { dest, value })
        );
    }
}

#[test]
fn load_immediate_out_of_range_is_reported_and_zeroed() {
    let (word, kinds) = encode("LOAD R1, #0x10000");
    assert_eq!(word, 0);
    assert_eq!(
        kinds,
        vec![DiagnosticKind::ImmediateOutOfRange { mnemonic: "LOAD", value: 0x10000 }]
    );
}

#[test]
fn malformed_immediate_is_reported() {
    let (word, kinds) = encode("LOAD R1, #0xZZ");
    assert_eq!(word, 0);
    assert_eq!(
        kinds,
        vec![DiagnosticKind::InvalidImmediate { mnemonic: "LOAD", operand: "#0xZZ".to_string() }]
    );
}

#[test]
fn unknown_register_encodes_opcode_only() {
    let (word, kinds) = encode("ADD R1, R2, R99");
    assert_eq!(word, Opcode::Add.bare_word());
    assert_eq!(
        kinds,
        vec![DiagnosticKind::UnknownRegister { mnemonic: "ADD", operand: "R99".to_string() }]
    );
}

#[test]
fn immediate_is_only_accepted_by_load() {
    let (word, kinds) = encode("MOV R1, #5");
    assert_eq!(word, Opcode::Mov.bare_word());
    assert_eq!(
        kinds,
        vec![DiagnosticKind::UnknownRegister { mnemonic: "MOV", operand: "#5".to_string() }]
    );
}

#[test]
fn zero_operand_forms_are_opcode_only() {
    assert_eq!(encode_clean("RET"), 0x16 << 27);
    assert_eq!(encode_clean("HLT"), 0x19 << 27);
    assert_eq!(encode_clean("NOP"), 0x1A << 27);
}

#[test]
fn wrong_operand_count_is_reported() {
    let (word, kinds) = encode("RET R1");
    assert_eq!(word, Opcode::Ret.bare_word());
    assert_eq!(
        kinds,
        vec![DiagnosticKind::OperandCount { mnemonic: "RET", expected: 0, found: 1 }]
    );

    let (word, _) = encode("MOV R1");
    assert_eq!(word, Opcode::Mov.bare_word());
}

#[test]
fn unknown_mnemonic_encodes_zero() {
    let (word, kinds) = encode("MUL R1, R2, R3");
    assert_eq!(word, 0);
    assert_eq!(kinds, vec![DiagnosticKind::UnknownMnemonic { mnemonic: "MUL".to_string() }]);
}

#[test]
fn transfer_to_unknown_routine_encodes_zero_target() {
    let (word, kinds) = encode("CALL nowhere");
    assert_eq!(word, Opcode::Call.bare_word());
    assert_eq!(
        kinds,
        vec![DiagnosticKind::UnknownRoutine { mnemonic: "CALL", operand: "nowhere".to_string() }]
    );
}

#[test]
fn decode_rejects_unassigned_opcodes_and_registers() {
    assert_eq!(Instruction::decode(0x1F << 27), None);
    assert_eq!(Instruction::decode(0x01 << 27), None);
    assert_eq!(Instruction::decode((0x03 << 27) | (0x18 << 22)), None);
}
