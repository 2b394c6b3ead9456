// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use tacsym_primitives::{Modifiers, keys};

use crate::{Error, ErrorKind};

/// A 15-character symbol identification code.
///
/// The characters used here are:
///
/// | index | field                                    |
/// |-------|------------------------------------------|
/// | 0     | coding scheme                            |
/// | 1     | standard identity                        |
/// | 2     | battle dimension                         |
/// | 3     | status                                   |
/// | 4–9   | function id                              |
/// | 10–11 | symbol modifier; index 11 is the echelon |
/// | 12–14 | country code and order of battle         |
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SymbolCode {
    code: [u8; Self::LEN],
}

impl SymbolCode {
    /// Number of characters in a code.
    pub const LEN: usize = 15;

    /// Parses a code, upper-casing it.
    pub fn parse(code: &str) -> Result<Self, Error> {
        if code.is_empty() {
            return Err(Error::new(ErrorKind::EmptySymbolCode, None));
        }
        let bytes = code.as_bytes();
        if bytes.len() != Self::LEN || !code.is_ascii() {
            let len = u32::try_from(code.chars().count()).map_or(f64::MAX, f64::from);
            return Err(Error::new(ErrorKind::InvalidSymbolCode, Some(len)));
        }
        let mut out = [0_u8; Self::LEN];
        for (dst, src) in out.iter_mut().zip(bytes) {
            *dst = src.to_ascii_uppercase();
        }
        Ok(Self { code: out })
    }

    /// The code as a string.
    pub fn as_str(&self) -> &str {
        // Only ASCII is accepted by `parse`.
        core::str::from_utf8(&self.code).unwrap_or_default()
    }

    fn at(&self, index: usize) -> char {
        char::from(self.code[index])
    }

    /// Coding scheme, e.g. `S` for warfighting or `G` for tactical graphics.
    pub fn scheme(&self) -> char {
        self.at(0)
    }

    /// Standard identity, e.g. `F` friend or `H` hostile.
    pub fn standard_identity(&self) -> char {
        self.at(1)
    }

    /// Battle dimension, e.g. `G` ground.
    pub fn battle_dimension(&self) -> char {
        self.at(2)
    }

    /// Status, e.g. `P` present or `A` anticipated.
    pub fn status(&self) -> char {
        self.at(3)
    }

    /// Echelon letter, if the code carries one.
    pub fn echelon(&self) -> Option<char> {
        match self.at(11) {
            '-' | '*' => None,
            c => Some(c),
        }
    }

    /// Whether the symbol sits on the ground: the ground battle dimension, or the stability
    /// operations and emergency management schemes.
    pub fn is_ground(&self) -> bool {
        self.battle_dimension() == 'G' || matches!(self.scheme(), 'O' | 'E')
    }

    /// Whether the identity is one of the exercise identities.
    pub fn is_exercise(&self) -> bool {
        matches!(self.standard_identity(), 'G' | 'W' | 'D' | 'L' | 'M')
    }

    /// Whether the identity is hostile, suspect, joker or faker.
    pub fn is_hostile(&self) -> bool {
        matches!(self.standard_identity(), 'H' | 'S' | 'J' | 'K')
    }

    /// The code with identity, status and every trailing modifier field replaced by `-`.
    ///
    /// Codes that differ only in those fields share one mask, which is how per-graphic tables
    /// are keyed.
    pub fn masked(&self) -> String {
        let mut code = self.code;
        code[1] = b'-';
        code[3] = b'-';
        for c in &mut code[10..] {
            *c = b'-';
        }
        code.iter().map(|&b| char::from(b)).collect()
    }

    /// The glyph code for a graphic modifier, or `None` if `key` has nothing to show.
    ///
    /// Most values come from `modifiers`; the operational condition is derived from the status.
    pub fn modifier_code(&self, modifiers: &Modifiers, key: &str) -> Option<String> {
        match key {
            keys::ECHELON => modifiers
                .text(keys::ECHELON)
                .and_then(echelon_letter)
                .map(|e| format!("-{e}")),
            keys::TASK_FORCE => {
                if modifiers.flag(keys::TASK_FORCE) != Some(true) {
                    return None;
                }
                let echelon = modifiers.text(keys::ECHELON).and_then(echelon_letter);
                Some(format!("E{}", echelon.unwrap_or('-')))
            }
            keys::FEINT_DUMMY => {
                (modifiers.flag(keys::FEINT_DUMMY) == Some(true)).then(|| "F-".to_owned())
            }
            keys::INSTALLATION => match modifiers.get(keys::INSTALLATION) {
                Some(v) if v.as_flag() == Some(true) => Some("H-".to_owned()),
                Some(v)
                    if v
                        .as_text()
                        .is_some_and(|t| t.eq_ignore_ascii_case("H-") || t.eq_ignore_ascii_case("HB")) =>
                {
                    Some("H-".to_owned())
                }
                _ => None,
            },
            keys::MOBILITY => modifiers
                .text(keys::MOBILITY)
                .map(str::to_ascii_uppercase)
                .filter(|v| {
                    matches!(
                        v.as_str(),
                        "MO" | "MP" | "MQ" | "MR" | "MS" | "MT" | "MU" | "MV" | "MW" | "MX" | "MY"
                    )
                }),
            keys::AUXILIARY_EQUIPMENT => modifiers
                .text(keys::AUXILIARY_EQUIPMENT)
                .map(str::to_ascii_uppercase)
                .filter(|v| matches!(v.as_str(), "NS" | "NL")),
            keys::OPERATIONAL_CONDITION => match self.status() {
                'D' => Some("OD".to_owned()),
                'X' => Some("OX".to_owned()),
                _ => None,
            },
            keys::OPERATIONAL_CONDITION_ALTERNATE => match self.status() {
                'C' => Some("PC".to_owned()),
                'D' => Some("PD".to_owned()),
                'X' => Some("PX".to_owned()),
                'F' => Some("PF".to_owned()),
                _ => None,
            },
            _ => None,
        }
    }
}

fn echelon_letter(value: &str) -> Option<char> {
    let mut chars = value.chars();
    let c = chars.next()?.to_ascii_uppercase();
    (chars.next().is_none() && ('A'..='N').contains(&c)).then_some(c)
}

impl fmt::Debug for SymbolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SymbolCode").field(&self.as_str()).finish()
    }
}

impl fmt::Display for SymbolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
