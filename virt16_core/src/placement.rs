pub mod placement {
    use crate::context::context::AssemblyContext;
    use crate::diagnostics::diagnostics::DiagnosticKind;
    use crate::isa::isa::parse_number;
    use crate::preprocess::preprocess::SourceLine;
    use crate::text::text::{is_directive, split_head};

    pub const PLACE_DIRECTIVE: &str = ".PLACE";

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum PlacementData {
        Text(String),
        Words(Vec<u16>),
    }

    /// Data written into the image at a fixed word address, outside the
    /// instruction stream.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Placement {
        pub address: u16,
        pub data: PlacementData,
        pub line: usize,
    }

    impl Placement {
        /// The 16-bit units this placement writes, in order. Text is written
        /// one UTF-16 code unit per character.
        pub fn units(&self) -> Vec<u16> {
            match &self.data {
                PlacementData::Text(text) => text.encode_utf16().collect(),
                PlacementData::Words(words) => words.clone(),
            }
        }
    }

    /// Moves every `.PLACE` directive, including the continuation lines of a
    /// multi-line array, into the placement table.
    pub fn build_placement_table(
        lines: &[SourceLine],
        ctx: &mut AssemblyContext,
    ) -> Vec<SourceLine> {
        let mut out = Vec::with_capacity(lines.len());
        let mut iter = lines.iter();

        while let Some(line) = iter.next() {
            if !is_directive(&line.text, PLACE_DIRECTIVE) {
                out.push(line.clone());
                continue;
            }

            let (_, rest) = split_head(&line.text);
            let (address_text, payload) = split_head(rest);

            let data = if payload.starts_with('"') {
                parse_string(payload).map(PlacementData::Text)
            } else if let Some(first) = payload.strip_prefix('[') {
                // the array ends at the first ']'; lines read up to it are consumed
                // even if the entry turns out bad
                let mut body = String::new();
                let mut segment = first;
                let trailing = loop {
                    if let Some((values, trailing)) = segment.split_once(']') {
                        body.push_str(values);
                        break Some(trailing.trim());
                    }
                    body.push_str(segment);
                    body.push(',');
                    match iter.next() {
                        Some(next) => segment = &next.text,
                        None => break None,
                    }
                };
                match trailing {
                    Some("") => parse_array(&body).map(PlacementData::Words),
                    Some(extra) => Err(DiagnosticKind::MalformedPlacement {
                        reason: format!("unexpected '{extra}' after ']'"),
                    }),
                    None => Err(DiagnosticKind::UnterminatedPlacement {
                        address: address_text.to_string(),
                    }),
                }
            } else if payload.is_empty() {
                Err(DiagnosticKind::MalformedPlacement {
                    reason: "expected an address followed by a string or array".to_string(),
                })
            } else {
                Err(DiagnosticKind::MalformedPlacement {
                    reason: format!("expected '\"' or '[' after the address, found '{payload}'"),
                })
            };

            let entry = data.and_then(|data| {
                let address = parse_address(address_text)?;
                Ok(Placement { address, data, line: line.number })
            });

            match entry {
                Ok(entry) => insert_placement(ctx, entry),
                Err(kind) => ctx.diagnostics.report(line.number, kind),
            }
        }

        out
    }

    fn insert_placement(ctx: &mut AssemblyContext, entry: Placement) {
        log::debug!("place {} word(s) at {:#06x}", entry.units().len(), entry.address);
        match ctx.placements.iter_mut().find(|p| p.address == entry.address) {
            Some(existing) => *existing = entry,
            None => ctx.placements.push(entry),
        }
    }

    /// `0x` prefixed addresses are hex, anything else decimal.
    pub fn parse_address(text: &str) -> Result<u16, DiagnosticKind> {
        let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => u16::from_str_radix(hex, 16).ok(),
            None => text.parse::<u16>().ok(),
        };
        parsed.ok_or_else(|| DiagnosticKind::InvalidPlacementAddress { text: text.to_string() })
    }

    fn parse_array(body: &str) -> Result<Vec<u16>, DiagnosticKind> {
        body.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                parse_number(token)
                    .and_then(|value| u16::try_from(value).ok())
                    .ok_or_else(|| DiagnosticKind::InvalidPlacementValue { text: token.to_string() })
            })
            .collect()
    }

    fn parse_string(payload: &str) -> Result<String, DiagnosticKind> {
        let mut chars = payload.chars();
        chars.next();
        let mut text = String::new();

        while let Some(ch) = chars.next() {
            match ch {
                '"' => {
                    let trailing = chars.as_str().trim();
                    if !trailing.is_empty() {
                        return Err(DiagnosticKind::MalformedPlacement {
                            reason: format!("unexpected '{trailing}' after string literal"),
                        });
                    }
                    return Ok(text);
                }
                '\\' => {
                    let Some(escaped) = chars.next() else { break };
                    let mapped = match escaped {
                        'n' => '\n',
                        't' => '\t',
                        '0' => '\0',
                        '"' => '"',
                        '\\' => '\\',
                        ';' => ';',
                        other => {
                            return Err(DiagnosticKind::MalformedPlacement {
                                reason: format!("unsupported escape \\{other}"),
                            });
                        }
                    };
                    text.push(mapped);
                }
                other => text.push(other),
            }
        }

        Err(DiagnosticKind::MalformedPlacement {
            reason: "unterminated string literal".to_string(),
        })
    }
}
