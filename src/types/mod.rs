mod flags;
mod handle;
mod letters;
mod models;

pub use flags::{
    ADMIN_FLAG_COUNT, AdminFlag, FlagBits, array_to_bits, bit_array_to_bits, bits_to_array,
    bits_to_bit_array,
};
pub use handle::{AdminId, AuthMethodId, GroupId};
pub use letters::FlagLetters;
pub use models::*;
