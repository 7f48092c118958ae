use super::{AdminFlag, FlagBits};

const LETTER_COUNT: usize = 26;

/// Maps the letters `'a'..='z'` to admin capabilities.
///
/// The default table assigns the first twenty letters to every capability
/// except root, in bit order, and `'z'` to root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagLetters {
    table: [Option<AdminFlag>; LETTER_COUNT],
}

impl Default for FlagLetters {
    fn default() -> Self {
        let mut letters = Self::empty();
        let non_root = AdminFlag::ALL
            .iter()
            .copied()
            .filter(|flag| *flag != AdminFlag::Root);
        for (slot, flag) in letters.table.iter_mut().zip(non_root) {
            *slot = Some(flag);
        }
        letters.table[LETTER_COUNT - 1] = Some(AdminFlag::Root);
        letters
    }
}

impl FlagLetters {
    /// A table with no letters assigned.
    pub fn empty() -> Self {
        Self {
            table: [None; LETTER_COUNT],
        }
    }

    /// Assigns `letter` to `flag`. Returns false if `letter` is not `'a'..='z'`.
    pub fn assign(&mut self, letter: char, flag: AdminFlag) -> bool {
        match letter_index(letter) {
            Some(index) => {
                self.table[index] = Some(flag);
                true
            }
            None => false,
        }
    }

    pub fn find_flag_by_letter(&self, letter: char) -> Option<AdminFlag> {
        letter_index(letter).and_then(|index| self.table[index])
    }

    /// First letter mapped to `flag`, if any.
    pub fn letter_for(&self, flag: AdminFlag) -> Option<char> {
        self.table
            .iter()
            .position(|slot| *slot == Some(flag))
            .map(|index| (b'a' + index as u8) as char)
    }

    /// Reads letters until the first one that maps to no capability.
    ///
    /// Returns the accumulated bits and the number of bytes consumed.
    pub fn read_flag_string(&self, flags: &str) -> (FlagBits, usize) {
        let mut bits = FlagBits::NONE;
        let mut consumed = 0;
        for ch in flags.chars() {
            let Some(flag) = self.find_flag_by_letter(ch) else {
                break;
            };
            bits = bits.with(flag);
            consumed += ch.len_utf8();
        }
        (bits, consumed)
    }

    /// Renders `bits` as a letter string, skipping capabilities with no letter.
    pub fn to_flag_string(&self, bits: FlagBits) -> String {
        bits.iter().filter_map(|flag| self.letter_for(flag)).collect()
    }
}

fn letter_index(letter: char) -> Option<usize> {
    letter
        .is_ascii_lowercase()
        .then(|| (letter as u8 - b'a') as usize)
}
