//! Dispatch strategies.

use std::{mem, slice};

use union_core::union::{Dispatch, Entry, SlotFn};

use crate::config;

/// How a visit finds the code for the active alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Tests every slot in order until one matches.
    Fold,
    /// A dense `match` over every index, for unions up to 256 alternatives.
    Switch,
    /// A table of function pointers, indexed directly.
    Table,
    /// The union's own descent: a chain is stepped through, a tree is bisected.
    Descend,
}

impl Strategy {
    /// The strategy used by [`visit`](crate::visit()) for the given number of states.
    pub const fn for_states(states: usize) -> Self {
        if states > config::SWITCH_LIMIT {
            Strategy::Table
        } else if config::PREFER_SWITCH {
            Strategy::Switch
        } else {
            Strategy::Fold
        }
    }

    /// All strategies.
    pub const ALL: [Strategy; 4] = [
        Strategy::Fold,
        Strategy::Switch,
        Strategy::Table,
        Strategy::Descend,
    ];
}

impl Default for Strategy {
    #[inline]
    fn default() -> Self {
        Strategy::for_states(0)
    }
}

/// Calls `f` on the slot at `index` of the union behind `this`.
///
/// # Safety
/// `index < U::LEN`, and `this` must satisfy whatever `F` requires of that slot.
#[inline]
pub(crate) unsafe fn dispatch<U, F>(strategy: Strategy, this: *mut U, index: usize, f: F) -> F::Output
where
    U: Dispatch<F>,
    F: SlotFn,
{
    debug_assert!(index < U::LEN);

    match strategy {
        Strategy::Fold => fold(this, index, f),
        Strategy::Switch => switch(this, index, f),
        Strategy::Table => table(this, index, f),
        Strategy::Descend => U::walk(this, index, f),
    }
}

#[inline]
unsafe fn fold<U: Dispatch<F>, F: SlotFn>(this: *mut U, index: usize, f: F) -> F::Output {
    match U::fold(this, 0, index, f) {
        Ok(output) => output,
        Err(_) => unreachable!(
            "dispatch key {} out of range for {} alternatives",
            index,
            U::LEN
        ),
    }
}

#[inline]
unsafe fn switch<U: Dispatch<F>, F: SlotFn>(this: *mut U, index: usize, f: F) -> F::Output {
    if U::LEN <= 4 {
        switch4(this, index, f)
    } else if U::LEN <= 16 {
        switch16(this, index, f)
    } else if U::LEN <= 64 {
        switch64(this, index, f)
    } else if U::LEN <= 256 {
        switch256(this, index, f)
    } else {
        table(this, index, f)
    }
}

#[inline]
unsafe fn table<U: Dispatch<F>, F: SlotFn>(this: *mut U, index: usize, f: F) -> F::Output {
    // `U::TABLE` is a constant, so the copy reads from a constant global once
    // optimized; debug builds copy it to the stack.
    let table = U::TABLE;
    debug_assert_eq!(mem::size_of::<U::Table>(), U::LEN * mem::size_of::<Entry<F>>());

    let entries = slice::from_raw_parts((&table as *const U::Table).cast::<Entry<F>>(), U::LEN);
    (entries[index])(this.cast(), f)
}

stamp_switch! {
    /// Dispatches unions of up to 4 alternatives.
    switch4 => [
        0 1 2 3
    ]
}

stamp_switch! {
    /// Dispatches unions of up to 16 alternatives.
    switch16 => [
        0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15
    ]
}

stamp_switch! {
    /// Dispatches unions of up to 64 alternatives.
    switch64 => [
        0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31 32
        33 34 35 36 37 38 39 40 41 42 43 44 45 46 47 48 49 50 51 52 53 54 55 56 57 58 59 60 61
        62 63
    ]
}

stamp_switch! {
    /// Dispatches unions of up to 256 alternatives.
    switch256 => [
        0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31 32
        33 34 35 36 37 38 39 40 41 42 43 44 45 46 47 48 49 50 51 52 53 54 55 56 57 58 59 60 61
        62 63 64 65 66 67 68 69 70 71 72 73 74 75 76 77 78 79 80 81 82 83 84 85 86 87 88 89 90
        91 92 93 94 95 96 97 98 99 100 101 102 103 104 105 106 107 108 109 110 111 112 113 114
        115 116 117 118 119 120 121 122 123 124 125 126 127 128 129 130 131 132 133 134 135 136
        137 138 139 140 141 142 143 144 145 146 147 148 149 150 151 152 153 154 155 156 157 158
        159 160 161 162 163 164 165 166 167 168 169 170 171 172 173 174 175 176 177 178 179 180
        181 182 183 184 185 186 187 188 189 190 191 192 193 194 195 196 197 198 199 200 201 202
        203 204 205 206 207 208 209 210 211 212 213 214 215 216 217 218 219 220 221 222 223 224
        225 226 227 228 229 230 231 232 233 234 235 236 237 238 239 240 241 242 243 244 245 246
        247 248 249 250 251 252 253 254 255
    ]
}
