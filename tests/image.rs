use virt16_core::assembler::assembler::{Assembler, AssemblerOptions, assemble};
use virt16_core::diagnostics::diagnostics::{DiagnosticKind, Diagnostics};
use virt16_core::image::image::Image;
use virt16_core::placement::placement::{Placement, PlacementData};

fn words(source: &str) -> Vec<u16> {
    assemble(source).unwrap().image.words().to_vec()
}

fn overlap_kinds(source: &str) -> Vec<DiagnosticKind> {
    assemble(source)
        .unwrap()
        .diagnostics()
        .kinds()
        .filter(|kind| matches!(kind, DiagnosticKind::PlacementOverlap { .. }))
        .cloned()
        .collect()
}

#[test]
fn instruction_words_are_split_high_half_first_little_endian() {
    let assembly = assemble(".main:\n LOAD R1, #0x1234\n HLT\n").unwrap();
    assert_eq!(assembly.program, vec![0x0040_1234, 0xC800_0000]);
    assert_eq!(assembly.image.words(), &[0x0040, 0x1234, 0xC800, 0x0000]);
    assert_eq!(
        assembly.image.to_bytes(),
        vec![0x40, 0x00, 0x34, 0x12, 0x00, 0xC8, 0x00, 0x00]
    );
    assert_eq!(assembly.image.code_words(), 4);
}

#[test]
fn string_placement_lands_at_its_word_address() {
    let assembly = assemble(".PLACE 0x0010 \"Hi\"\n.main:\n NOP\n HLT\n").unwrap();
    let image = &assembly.image;
    assert_eq!(image.len(), 0x12);
    assert_eq!(image.words()[0x10], u16::from(b'H'));
    assert_eq!(image.words()[0x11], u16::from(b'i'));
    assert!(image.words()[4..0x10].iter().all(|&w| w == 0));

    let bytes = image.to_bytes();
    assert_eq!(&bytes[0x20..0x24], &[b'H', 0x00, b'i', 0x00]);
}

#[test]
fn array_placement_writes_sixteen_bit_units() {
    let image = words(".main:\n HLT\n.PLACE 8 [0xBEEF, 2]\n");
    assert_eq!(&image[8..10], &[0xBEEF, 0x0002]);
}

#[test]
fn placement_over_code_is_rejected() {
    let source = ".main:\n NOP\n HLT\n.PLACE 0x0001 [0xFFFF]\n";
    let kinds = overlap_kinds(source);
    assert_eq!(kinds.len(), 1);
    assert!(matches!(kinds[0], DiagnosticKind::PlacementOverlap { address: 0x0001, .. }));
    assert_eq!(words(source)[1], 0x0000);
}

#[test]
fn placement_over_code_is_written_when_allowed() {
    let options = AssemblerOptions { check_placements: false, ..AssemblerOptions::default() };
    let assembly = Assembler::with_options(options)
        .assemble(".main:\n NOP\n HLT\n.PLACE 0x0001 [0xFFFF]\n")
        .unwrap();
    assert!(assembly.diagnostics().is_empty());
    assert_eq!(assembly.image.words()[1], 0xFFFF);
}

#[test]
fn overlapping_placements_keep_the_first() {
    let source = ".PLACE 0x20 [1, 2, 3]\n.PLACE 0x21 \"x\"\n.main:\n HLT\n";
    let kinds = overlap_kinds(source);
    assert_eq!(kinds.len(), 1);
    assert!(matches!(kinds[0], DiagnosticKind::PlacementOverlap { address: 0x21, .. }));
    assert_eq!(&words(source)[0x20..0x23], &[1, 2, 3]);
}

#[test]
fn repeated_address_replaces_the_earlier_placement() {
    let assembly = assemble(".PLACE 0x20 [1, 2]\n.PLACE 0x20 [7]\n.main:\n HLT\n").unwrap();
    assert!(assembly.diagnostics().is_empty());
    assert_eq!(assembly.context.placements.len(), 1);
    assert_eq!(assembly.image.words().len(), 0x21);
    assert_eq!(assembly.image.words()[0x20], 7);
}

#[test]
fn placement_past_the_address_space_is_rejected() {
    let mut diagnostics = Diagnostics::new();
    let placement = Placement {
        address: 0xFFFF,
        data: PlacementData::Words(vec![1, 2]),
        line: 3,
    };
    let image = Image::build(&[0x1234_5678], &[placement], true, &mut diagnostics);
    assert_eq!(image.words(), &[0x1234, 0x5678]);
    assert_eq!(
        diagnostics.kinds().cloned().collect::<Vec<_>>(),
        vec![DiagnosticKind::PlacementOutOfRange { address: 0xFFFF, len: 2 }]
    );
    assert_eq!(diagnostics.iter().next().unwrap().line, 3);
}

#[test]
fn write_to_matches_to_bytes() {
    let assembly = assemble(".main:\n CALL sub\n.sub:\n RET\n.PLACE 0x10 \"ok\"\n").unwrap();
    let mut out = Vec::new();
    assembly.image.write_to(&mut out).unwrap();
    assert_eq!(out, assembly.image.to_bytes());
    assert_eq!(out.len(), 0x12 * 2);
}
