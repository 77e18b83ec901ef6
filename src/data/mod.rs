/// Data layer: core types, loading, category ordering, eligibility and filtering.
///
/// Architecture:
/// ```text
///  UK .parquet   IE .parquet   (.json / .csv)
///        │            │
///        ▼            ▼
///   ┌──────────────────────┐
///   │  loader              │  parse files → aligned, concatenated Table
///   └──────────────────────┘
///        │
///        ▼
///   ┌──────────────────────┐
///   │  categories          │  fixed category orders → Categorical columns
///   └──────────────────────┘
///        │
///        ├──────────────────────────────┐
///        ▼                              ▼
///   ┌──────────────────────┐   ┌──────────────────────┐
///   │  eligibility         │   │  filter              │
///   │  colorable columns   │   │  ranges / value sets │
///   └──────────────────────┘   │  → filtered indices  │
///                              └──────────────────────┘
/// ```

pub mod categories;
pub mod eligibility;
pub mod filter;
pub mod loader;
pub mod model;
