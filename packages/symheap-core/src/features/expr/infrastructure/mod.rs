pub mod substitution;

pub use substitution::SymbolSubstitution;
