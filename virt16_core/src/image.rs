pub mod image {
    use std::io::{self, Write};

    use crate::diagnostics::diagnostics::{DiagnosticKind, Diagnostics};
    use crate::placement::placement::Placement;

    /// Highest word address plus one.
    pub const ADDRESS_SPACE: usize = 0x10000;

    /// The binary image in 16-bit words. Word address `a` lives at byte
    /// offset `2 * a` of the serialized image.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct Image {
        words: Vec<u16>,
        code_words: usize,
    }

    impl Image {
        /// Lays out the instruction words (high half first), then writes each
        /// placement at its address. With `check_overlaps`, a placement that
        /// would cover code or an earlier placement is reported and skipped.
        pub fn build(
            program: &[u32],
            placements: &[Placement],
            check_overlaps: bool,
            diagnostics: &mut Diagnostics,
        ) -> Image {
            let mut words: Vec<u16> = program
                .iter()
                .flat_map(|&word| [(word >> 16) as u16, word as u16])
                .collect();
            let code_words = words.len();
            let mut placed = vec![false; code_words];

            for placement in placements {
                let units = placement.units();
                let start = placement.address as usize;
                let end = start + units.len();

                if end > ADDRESS_SPACE {
                    diagnostics.report(
                        placement.line,
                        DiagnosticKind::PlacementOutOfRange {
                            address: placement.address,
                            len: units.len(),
                        },
                    );
                    continue;
                }

                if check_overlaps && !units.is_empty() {
                    if start < code_words {
                        diagnostics.report(
                            placement.line,
                            DiagnosticKind::PlacementOverlap {
                                address: placement.address,
                                other: format!("encoded instructions ending at {code_words:#06x}"),
                            },
                        );
                        continue;
                    }
                    let upto = end.min(placed.len());
                    if let Some(pos) = (start..upto).find(|&pos| placed[pos]) {
                        diagnostics.report(
                            placement.line,
                            DiagnosticKind::PlacementOverlap {
                                address: placement.address,
                                other: format!("earlier placed data at {pos:#06x}"),
                            },
                        );
                        continue;
                    }
                }

                if words.len() < end {
                    words.resize(end, 0);
                    placed.resize(end, false);
                }
                words[start..end].copy_from_slice(&units);
                placed[start..end].iter_mut().for_each(|slot| *slot = true);
            }

            log::debug!(
                "image: {} word(s), {} of them code",
                words.len(),
                code_words
            );
            Image { words, code_words }
        }

        pub fn words(&self) -> &[u16] {
            &self.words
        }

        /// Number of leading words holding encoded instructions.
        pub fn code_words(&self) -> usize {
            self.code_words
        }

        pub fn len(&self) -> usize {
            self.words.len()
        }

        pub fn is_empty(&self) -> bool {
            self.words.is_empty()
        }

        /// Serializes every 16-bit unit little-endian.
        pub fn to_bytes(&self) -> Vec<u8> {
            self.words.iter().flat_map(|word| word.to_le_bytes()).collect()
        }

        pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
            writer.write_all(&self.to_bytes())?;
            writer.flush()
        }
    }
}
