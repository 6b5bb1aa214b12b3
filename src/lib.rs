//! # participants-demographics
//!
//! Extracts participant demographics (sample size, sex breakdown, age statistics)
//! from the free-form text of scientific articles.
//!
//! File Layout
//!
//! The extraction runs as a chain of small stages, each living in its own module under
//! `src/demographics`:
//!
//! src/demographics
//!   ├── locating     Sections and snippets carved out of the raw article text
//!   ├── lexing       logos tokens and the number-word lexicon
//!   ├── parsing      Mention forest, resolver and parenthetical details
//!   ├── reading      The per-document extraction loop
//!   ├── summarizing  Reconciliation of mentions into one profile
//!   └── annotation   Flat label projection for labelling tools
//!
//! Stages only exchange span-tracked nodes from [`demographics::ast`], so every
//! extracted fact can be traced back to the characters it came from.

pub mod demographics;

pub use demographics::{
    n_participants_from_texts, Extractor, ParticipantType, ParticipantsGroupInfo,
    ParticipantsInfo,
};
