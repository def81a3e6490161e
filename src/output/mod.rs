// Output: terminal display and scan exports.

pub mod export;
pub mod terminal;
